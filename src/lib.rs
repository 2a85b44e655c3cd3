//! # hitprobe
//!
//! Click-interception diagnostics. Drives a browser page into a known state,
//! opens a confirmation overlay, and probes which DOM element actually
//! receives a click (or a passive hit-test) at a grid of points across the
//! target control's rectangle — so "the button sometimes doesn't react"
//! becomes "the actions panel intercepts the pointer from offset 30 down".
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hitprobe::{Config, Runner};
//!
//! # #[tokio::main]
//! # async fn main() -> hitprobe::Result<()> {
//! let config = Config::load("probe.yaml")?;
//! let mut runner = Runner::new(&config.browser).await?;
//! let result = runner.run(&config).await?;
//! println!("{}", result.report);
//! runner.close().await?;
//! # Ok(())
//! # }
//! ```

mod config;
pub mod console;
mod driver;
mod geometry;
mod probe;
mod runner;

pub use config::{
    BrowserConfig, Config, Mode, PageElements, ParamDef, Params, ProbeConfig, TargetUrl, Viewport,
};
pub use driver::{CdpDriver, HitTarget, PageDriver, Visibility};
pub use geometry::{Anchor, Point, Rect};
pub use probe::{ClickSample, HitSample, Probe, Resolution, SweepReport};
pub use runner::{RunResult, Runner};

/// Result type for hitprobe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during config loading or a probe run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("browser error: {0}")]
    Browser(#[from] eoka::Error),

    /// The overlay never became visible. Setup is assumed deterministic for a
    /// correctly functioning page, so this aborts the run without retry.
    #[error("setup failed: {0}")]
    SetupTimeout(String),

    /// The control under test is missing or has a zero-area rectangle.
    #[error("control not interactable: {0}")]
    MissingControl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
name: "Test"
target:
  url: "file:///tmp/index.html"
page:
  start: "start"
  overlay: "confirmOverlay"
  control: "confirmBtn"
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.name, "Test");
        assert_eq!(config.target.url, "file:///tmp/index.html");
        assert_eq!(config.page.overlay, "confirmOverlay");
        assert_eq!(config.page.control, "confirmBtn");
        assert!(config.page.intro_overlay.is_none());
        assert!(config.browser.headless);
    }

    #[test]
    fn test_probe_defaults() {
        let yaml = r#"
name: "Test"
target:
  url: "file:///tmp/index.html"
page:
  start: "start"
  overlay: "o"
  control: "c"
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.probe.mode, Mode::Passive);
        assert_eq!(
            config.probe.offsets,
            vec![0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 35.0, 40.0, 45.0, 50.0]
        );
        assert_eq!(config.probe.anchors, vec![Anchor::Center]);
        assert_eq!(config.probe.edge_margin, 5.0);
        assert_eq!(config.probe.settle_ms, 200);
        assert_eq!(config.probe.load_ms, 1000);
        assert_eq!(config.probe.overlay_timeout_ms, 5000);
        assert!(!config.probe.capture_console);
    }

    #[test]
    fn test_parse_probe_config() {
        let yaml = r#"
name: "Test"
target:
  url: "file:///tmp/index.html"
page:
  start: "start"
  overlay: "o"
  control: "c"
probe:
  mode: active
  offsets: [0, 2, 45]
  anchors: [left, center, right]
  edge_margin: 3
  settle_ms: 50
  capture_console: true
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.probe.mode, Mode::Active);
        assert_eq!(config.probe.offsets, vec![0.0, 2.0, 45.0]);
        assert_eq!(
            config.probe.anchors,
            vec![Anchor::Left, Anchor::Center, Anchor::Right]
        );
        assert_eq!(config.probe.edge_margin, 3.0);
        assert_eq!(config.probe.settle_ms, 50);
        assert!(config.probe.capture_console);
    }

    #[test]
    fn test_parse_browser_config() {
        let yaml = r#"
name: "Test"
browser:
  headless: false
  viewport:
    width: 390
    height: 844
target:
  url: "file:///tmp/index.html"
page:
  start: "start"
  overlay: "o"
  control: "c"
"#;
        let config = Config::parse(yaml).unwrap();
        assert!(!config.browser.headless);
        let viewport = config.browser.viewport.unwrap();
        assert_eq!(viewport.width, 390);
        assert_eq!(viewport.height, 844);
    }

    #[test]
    fn test_parse_start_request() {
        let yaml = r#"
name: "Test"
target:
  url: "file:///tmp/index.html"
page:
  overlay: "o"
  control: "c"
  start_request: "retry"
"#;
        let config = Config::parse(yaml).unwrap();
        assert!(config.page.start.is_none());
        assert_eq!(config.page.start_request.as_deref(), Some("retry"));
    }

    #[test]
    fn test_validation_missing_name() {
        let yaml = r#"
target:
  url: "file:///tmp/index.html"
page:
  start: "start"
  overlay: "o"
  control: "c"
"#;
        assert!(Config::parse(yaml).is_err());
    }

    #[test]
    fn test_validation_empty_url() {
        let yaml = r#"
name: "Test"
target:
  url: ""
page:
  start: "start"
  overlay: "o"
  control: "c"
"#;
        assert!(Config::parse(yaml).is_err());
    }

    #[test]
    fn test_validation_no_start_path() {
        let yaml = r#"
name: "Test"
target:
  url: "file:///tmp/index.html"
page:
  overlay: "o"
  control: "c"
"#;
        let result = Config::parse(yaml);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("start or page.start_request"));
    }

    #[test]
    fn test_validation_offsets_not_ascending() {
        let yaml = r#"
name: "Test"
target:
  url: "file:///tmp/index.html"
page:
  start: "start"
  overlay: "o"
  control: "c"
probe:
  offsets: [0, 10, 5]
"#;
        let result = Config::parse(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("ascending"));
    }

    #[test]
    fn test_validation_empty_offsets() {
        let yaml = r#"
name: "Test"
target:
  url: "file:///tmp/index.html"
page:
  start: "start"
  overlay: "o"
  control: "c"
probe:
  offsets: []
"#;
        assert!(Config::parse(yaml).is_err());
    }

    #[test]
    fn test_params_in_target_url() {
        let yaml = r#"
name: "Test"
params:
  page_url:
    required: true
target:
  url: "${page_url}"
page:
  start: "start"
  overlay: "o"
  control: "c"
"#;
        // Missing required param fails.
        assert!(Config::parse(yaml).is_err());

        let params = Params::new().set("page_url", "file:///srv/app/index.html");
        let config = Config::parse_with_params(yaml, &params).unwrap();
        assert_eq!(config.target.url, "file:///srv/app/index.html");
    }

    #[test]
    fn test_params_default_value() {
        let yaml = r#"
name: "Test"
params:
  start_id:
    default: "start"
target:
  url: "file:///tmp/index.html"
page:
  start: "${start_id}"
  overlay: "o"
  control: "c"
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.page.start.as_deref(), Some("start"));
    }

    #[test]
    fn test_load_example_config() {
        // The shipped example requires page_url, so a bare load must fail...
        assert!(Config::load("configs/retry-button.yaml").is_err());

        // ...and succeed once the parameter is supplied.
        let params = Params::new().set("page_url", "file:///srv/game/index.html");
        let config = Config::load_with_params("configs/retry-button.yaml", &params).unwrap();
        assert_eq!(config.page.control, "preGameStart");
        assert_eq!(config.target.url, "file:///srv/game/index.html");
    }
}
