//! The hit-test diagnostic protocol: state setup, geometry sampling, and
//! resolution classification, with recovery from mid-sweep overlay
//! dismissal.

mod report;

pub use report::{ClickSample, HitSample, Resolution, SweepReport};

use tracing::{debug, info};

use crate::config::{Mode, PageElements, ProbeConfig};
use crate::driver::PageDriver;
use crate::geometry::{self, Anchor, Rect};
use crate::{Error, Result};

/// Runs sweeps of one control through a [`PageDriver`].
///
/// One sweep walks the configured offsets strictly in ascending order. In
/// active mode a click that closes the overlay early triggers the recovery
/// loop: setup again, re-measure, continue with the next unprocessed offset.
pub struct Probe<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
    page: &'a PageElements,
    cfg: &'a ProbeConfig,
}

impl<'a, D: PageDriver + ?Sized> Probe<'a, D> {
    pub fn new(driver: &'a D, page: &'a PageElements, cfg: &'a ProbeConfig) -> Self {
        Self { driver, page, cfg }
    }

    /// Run the configured sweep: setup, then passive or active probing.
    pub async fn run(&self) -> Result<SweepReport> {
        self.setup().await?;
        match self.cfg.mode {
            Mode::Passive => self.passive_sweep().await,
            Mode::Active => self.active_sweep().await,
        }
    }

    /// Bring the page to a state where the overlay is open and the control
    /// present. Idempotent, safe to repeat.
    pub async fn setup(&self) -> Result<()> {
        if let Some(ref intro) = self.page.intro_overlay {
            debug!("suppressing intro overlay #{}", intro);
            self.driver.suppress(intro).await?;
        }
        self.open_overlay().await?;
        self.driver
            .wait_for_visible(&self.page.overlay, self.cfg.overlay_timeout_ms)
            .await
            .map_err(|e| {
                Error::SetupTimeout(format!(
                    "overlay #{} did not become visible within {}ms: {}",
                    self.page.overlay, self.cfg.overlay_timeout_ms, e
                ))
            })?;
        Ok(())
    }

    async fn open_overlay(&self) -> Result<()> {
        if let Some(ref arg) = self.page.start_request {
            if self.driver.request_start(arg).await? {
                debug!("requested start via entry point ({})", arg);
                return Ok(());
            }
            debug!("start entry point absent, falling back to start affordance");
        }
        match self.page.start {
            Some(ref id) => self.driver.press(id).await,
            None => Err(Error::MissingControl(
                "page exposes no start entry point and no start affordance is configured".into(),
            )),
        }
    }

    /// Measure the control's current rectangle. Never cached: must be called
    /// again after anything that can change layout.
    pub async fn measure(&self) -> Result<Rect> {
        let rect = self
            .driver
            .rect_of(&self.page.control)
            .await?
            .ok_or_else(|| Error::MissingControl(format!("#{} not found", self.page.control)))?;
        if !rect.is_rendered() {
            return Err(Error::MissingControl(format!(
                "#{} has a zero-area rectangle",
                self.page.control
            )));
        }
        debug!("{}", rect);
        Ok(rect)
    }

    /// Map which element is the hit-test target at each probe point, without
    /// dispatching any event. Non-destructive and repeatable.
    pub async fn passive_sweep(&self) -> Result<SweepReport> {
        let rect = self.measure().await?;
        let mut report = SweepReport::new(self.page.control.clone(), rect);

        for (offset, anchor) in self.plan() {
            let point = geometry::probe_point(&rect, offset, anchor, self.cfg.edge_margin);
            let hit = self.driver.hit_test_at(point).await?;
            let sample = HitSample {
                offset,
                anchor,
                hit,
            };
            debug!("{}", sample);
            report.hits.push(sample);
        }
        Ok(report)
    }

    /// Dispatch a real click at each probe point and observe the overlay
    /// state afterwards. A click that closes the overlay with offsets still
    /// remaining is an unintended early dismissal: reopen, re-measure, and
    /// continue.
    pub async fn active_sweep(&self) -> Result<SweepReport> {
        let mut rect = self.measure().await?;
        let mut report = SweepReport::new(self.page.control.clone(), rect);
        let plan = self.plan();

        for (i, &(offset, anchor)) in plan.iter().enumerate() {
            let point = geometry::probe_point(&rect, offset, anchor, self.cfg.edge_margin);
            self.driver.click_at(point).await?;
            self.driver.settle(self.cfg.settle_ms).await;

            let overlay_after = self.driver.visibility_of(&self.page.overlay).await?;
            let remaining = i + 1 < plan.len();
            let mut reopened = false;
            if overlay_after.is_hidden() && remaining {
                info!("overlay closed after click at offset {}, reopening", offset);
                self.setup().await?;
                rect = self.measure().await?;
                reopened = true;
            }

            let sample = ClickSample {
                offset,
                anchor,
                overlay_after,
                reopened,
            };
            debug!("{}", sample);
            report.clicks.push(sample);
        }
        Ok(report)
    }

    /// Probe order: offsets strictly ascending, anchors in configured order
    /// within each offset.
    fn plan(&self) -> Vec<(f64, Anchor)> {
        self.cfg
            .offsets
            .iter()
            .flat_map(|&o| self.cfg.anchors.iter().map(move |&a| (o, a)))
            .collect()
    }
}
