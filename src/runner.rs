//! Browser lifecycle and the run loop: launch, navigate, sweep, report.

use eoka::{Browser, Page};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{BrowserConfig, Config, Mode};
use crate::console::{self, ConsoleLine};
use crate::driver::CdpDriver;
use crate::probe::{Probe, SweepReport};
use crate::Result;

/// Result of running a config.
#[derive(Debug)]
pub struct RunResult {
    /// Whether the run's defining property held (see [`SweepReport`]).
    pub success: bool,
    /// All samples gathered by the sweep.
    pub report: SweepReport,
    /// Console lines captured from the page, if enabled.
    pub console: Vec<ConsoleLine>,
    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

/// Owns the browser and page for the duration of a run.
pub struct Runner {
    browser: Browser,
    page: Page,
}

impl Runner {
    /// Launch a browser from the config.
    pub async fn new(config: &BrowserConfig) -> Result<Self> {
        let stealth = eoka::StealthConfig {
            headless: config.headless,
            viewport_width: config.viewport.as_ref().map(|v| v.width).unwrap_or(390),
            viewport_height: config.viewport.as_ref().map(|v| v.height).unwrap_or(844),
            ..Default::default()
        };

        debug!("launching browser (headless: {})", config.headless);
        let browser = Browser::launch_with_config(stealth).await?;
        let page = browser.new_page("about:blank").await?;

        Ok(Self { browser, page })
    }

    /// Get a reference to the page.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Navigate to the target and run the configured sweep.
    pub async fn run(&mut self, config: &Config) -> Result<RunResult> {
        let start = Instant::now();

        info!("navigating to {}", config.target.url);
        self.page.goto(&config.target.url).await?;
        self.page.wait(config.probe.load_ms).await;

        if config.probe.capture_console {
            console::install(&self.page).await?;
        }

        let driver = CdpDriver::new(&self.page);
        let probe = Probe::new(&driver, &config.page, &config.probe);
        let report = probe.run().await?;

        let console = if config.probe.capture_console {
            match console::drain(&self.page).await {
                Ok(lines) => {
                    for line in &lines {
                        debug!("console[{}] {}", line.level, line.text);
                    }
                    lines
                }
                Err(e) => {
                    warn!("console drain failed: {}", e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let success = match config.probe.mode {
            Mode::Passive => report.center_hits_control(),
            Mode::Active => report.center_clicks_dismiss(),
        };

        Ok(RunResult {
            success,
            report,
            console,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Close the browser. Call on every exit path.
    pub async fn close(self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}
