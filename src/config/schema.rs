use super::params::{self, ParamDef, Params};
use crate::geometry::Anchor;
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Top-level config structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Name of this diagnostic config.
    pub name: String,

    /// Parameter definitions (optional).
    #[serde(default)]
    pub params: HashMap<String, ParamDef>,

    /// Browser configuration.
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Page under test.
    pub target: TargetUrl,

    /// Element ids of the page contract.
    pub page: PageElements,

    /// Probe sweep configuration.
    #[serde(default)]
    pub probe: ProbeConfig,
}

impl Config {
    /// Load config from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse_with_params(&content, &Params::new())
    }

    /// Load config from a YAML file with runtime parameters.
    pub fn load_with_params<P: AsRef<Path>>(path: P, params: &Params) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse_with_params(&content, params)
    }

    /// Parse config from a YAML string (no params).
    pub fn parse(yaml: &str) -> Result<Self> {
        Self::parse_with_params(yaml, &Params::new())
    }

    /// Parse config from a YAML string with `${var}` substitution.
    pub fn parse_with_params(yaml: &str, params: &Params) -> Result<Self> {
        // First pass: parse as Value so param definitions can be applied to
        // every string in the document before deserializing.
        let mut value: serde_yaml::Value = serde_yaml::from_str(yaml)?;

        let defs: HashMap<String, ParamDef> = value
            .get("params")
            .and_then(|v| serde_yaml::from_value(v.clone()).ok())
            .unwrap_or_default();

        params::apply(&mut value, params, &defs)?;

        let config: Config = serde_yaml::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Config("name is required".into()));
        }
        if self.target.url.is_empty() {
            return Err(Error::Config("target.url is required".into()));
        }
        if self.page.overlay.is_empty() {
            return Err(Error::Config("page.overlay is required".into()));
        }
        if self.page.control.is_empty() {
            return Err(Error::Config("page.control is required".into()));
        }
        if self.page.start.is_none() && self.page.start_request.is_none() {
            return Err(Error::Config(
                "page.start or page.start_request is required".into(),
            ));
        }
        if self.probe.offsets.is_empty() {
            return Err(Error::Config("probe.offsets must not be empty".into()));
        }
        if self.probe.offsets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::Config(
                "probe.offsets must be strictly ascending".into(),
            ));
        }
        if self.probe.anchors.is_empty() {
            return Err(Error::Config("probe.anchors must not be empty".into()));
        }
        if self.probe.edge_margin < 0.0 {
            return Err(Error::Config("probe.edge_margin must not be negative".into()));
        }
        Ok(())
    }
}

/// Browser launch configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Run in headless mode.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Viewport size. Defaults to 390×844 when unset.
    pub viewport: Option<Viewport>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: None,
        }
    }
}

/// Viewport dimensions.
#[derive(Debug, Clone, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Target URL configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetUrl {
    /// URL of the page under test.
    pub url: String,
}

/// Element ids the page under test is expected to expose. All ids are bare
/// (no `#` prefix).
#[derive(Debug, Clone, Deserialize)]
pub struct PageElements {
    /// Introductory overlay to suppress before starting, if present on the
    /// page. Skipped silently when absent.
    pub intro_overlay: Option<String>,

    /// Affordance whose click opens the confirmation overlay.
    pub start: Option<String>,

    /// The confirmation overlay container. Its computed `display` style is
    /// the overlay-state observable.
    pub overlay: String,

    /// The control under test inside the overlay.
    pub control: String,

    /// Argument for the page's programmatic start entry point
    /// (`window.requestStart(arg)`). When set, it is preferred over clicking
    /// `start`; if the entry point is absent, `start` is the fallback.
    pub start_request: Option<String>,
}

/// Sweep mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Hit-test only — no events dispatched, safe to repeat.
    Passive,
    /// Real synthetic clicks — may close the overlay, triggering recovery.
    Active,
}

/// Probe sweep configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_mode")]
    pub mode: Mode,

    /// Vertical offsets (px down from the control's top edge), strictly
    /// ascending. The default covers the control's height plus a margin
    /// beyond it, to localize exactly where interception begins.
    #[serde(default = "default_offsets")]
    pub offsets: Vec<f64>,

    /// Horizontal anchors probed at each offset.
    #[serde(default = "default_anchors")]
    pub anchors: Vec<Anchor>,

    /// Inset from the left/right edges for edge anchors.
    #[serde(default = "default_edge_margin")]
    pub edge_margin: f64,

    /// Fixed wait after each active click before reading overlay state.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Fixed wait after navigation to let rendering settle.
    #[serde(default = "default_load_ms")]
    pub load_ms: u64,

    /// Bound on waiting for the overlay to become visible during setup.
    #[serde(default = "default_overlay_timeout_ms")]
    pub overlay_timeout_ms: u64,

    /// Install a page console hook and re-emit captured lines after the run.
    #[serde(default)]
    pub capture_console: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            offsets: default_offsets(),
            anchors: default_anchors(),
            edge_margin: default_edge_margin(),
            settle_ms: default_settle_ms(),
            load_ms: default_load_ms(),
            overlay_timeout_ms: default_overlay_timeout_ms(),
            capture_console: false,
        }
    }
}

fn default_headless() -> bool {
    true
}

fn default_mode() -> Mode {
    Mode::Passive
}

fn default_offsets() -> Vec<f64> {
    (0..=50u32).step_by(5).map(f64::from).collect()
}

fn default_anchors() -> Vec<Anchor> {
    vec![Anchor::Center]
}

fn default_edge_margin() -> f64 {
    5.0
}

fn default_settle_ms() -> u64 {
    200
}

fn default_load_ms() -> u64 {
    1000
}

fn default_overlay_timeout_ms() -> u64 {
    5000
}
