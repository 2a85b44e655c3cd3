//! Sweep samples, their classification against the intended control, and the
//! aggregated report.

use std::fmt;

use crate::driver::{HitTarget, Visibility};
use crate::geometry::{Anchor, Rect};

/// One passive probe: which element was the hit-test target at
/// (offset, anchor).
#[derive(Debug, Clone, PartialEq)]
pub struct HitSample {
    pub offset: f64,
    pub anchor: Anchor,
    pub hit: Option<HitTarget>,
}

impl HitSample {
    /// Classify this sample against the intended control's id.
    pub fn resolution(&self, control: &str) -> Resolution {
        match &self.hit {
            Some(hit) if hit.is(control) => Resolution::Control,
            Some(hit) => Resolution::Intercepted(hit.clone()),
            None => Resolution::Missing,
        }
    }
}

impl fmt::Display for HitSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hit {
            Some(hit) => write!(f, "offset {} ({}): {}", self.offset, self.anchor, hit),
            None => write!(f, "offset {} ({}): none", self.offset, self.anchor),
        }
    }
}

/// What a probe point resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The intended control receives the interaction.
    Control,
    /// Another element intercepts the pointer.
    Intercepted(HitTarget),
    /// No element is rendered at the point.
    Missing,
}

/// One active probe: overlay state observed after a real click at
/// (offset, anchor), and whether the recovery loop had to reopen it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickSample {
    pub offset: f64,
    pub anchor: Anchor,
    pub overlay_after: Visibility,
    pub reopened: bool,
}

impl fmt::Display for ClickSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "after click offset {} ({}): overlay display {}",
            self.offset, self.anchor, self.overlay_after
        )?;
        if self.reopened {
            f.write_str(" (reopened)")?;
        }
        Ok(())
    }
}

/// All samples from one sweep. Left/right/center samples at the same offset
/// are kept separate throughout — merging them would hide asymmetric
/// interceptors.
#[derive(Debug, Clone)]
pub struct SweepReport {
    /// Id of the intended control.
    pub control: String,
    /// Rectangle measured at the start of the sweep.
    pub rect: Rect,
    /// Passive samples (empty for active sweeps).
    pub hits: Vec<HitSample>,
    /// Active samples (empty for passive sweeps).
    pub clicks: Vec<ClickSample>,
}

impl SweepReport {
    pub fn new(control: String, rect: Rect) -> Self {
        Self {
            control,
            rect,
            hits: Vec::new(),
            clicks: Vec::new(),
        }
    }

    /// Passive samples inside the control's vertical extent that did not
    /// resolve to the control.
    pub fn interceptions(&self) -> Vec<&HitSample> {
        self.hits
            .iter()
            .filter(|s| {
                self.rect.contains_offset(s.offset)
                    && s.resolution(&self.control) != Resolution::Control
            })
            .collect()
    }

    /// First intercepted in-extent sample, in probe order.
    pub fn first_interception(&self) -> Option<&HitSample> {
        self.interceptions().first().copied()
    }

    /// How many clicks forced the overlay to be reopened mid-sweep.
    pub fn reopens(&self) -> usize {
        self.clicks.iter().filter(|c| c.reopened).count()
    }

    /// The property the diagnostic exists to check: every center-anchor
    /// probe inside the control's vertical extent resolves to the control.
    pub fn center_hits_control(&self) -> bool {
        self.hits
            .iter()
            .filter(|s| s.anchor == Anchor::Center && self.rect.contains_offset(s.offset))
            .all(|s| s.resolution(&self.control) == Resolution::Control)
    }

    /// Active-mode counterpart: every in-extent center click actually
    /// dismissed the overlay. A click swallowed by an interceptor leaves it
    /// visible.
    pub fn center_clicks_dismiss(&self) -> bool {
        self.clicks
            .iter()
            .filter(|c| c.anchor == Anchor::Center && self.rect.contains_offset(c.offset))
            .all(|c| c.overlay_after.is_hidden())
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.rect)?;
        for sample in &self.hits {
            writeln!(f, "{}", sample)?;
        }
        for sample in &self.clicks {
            writeln!(f, "{}", sample)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rect {
        Rect {
            x: 20.0,
            y: 500.0,
            width: 350.0,
            height: 50.0,
        }
    }

    fn control_hit() -> HitTarget {
        HitTarget {
            tag: "BUTTON".into(),
            id: "preGameStart".into(),
            classes: "btn".into(),
        }
    }

    fn panel_hit() -> HitTarget {
        HitTarget {
            tag: "DIV".into(),
            id: String::new(),
            classes: "preGameActions".into(),
        }
    }

    #[test]
    fn test_resolution() {
        let sample = HitSample {
            offset: 5.0,
            anchor: Anchor::Center,
            hit: Some(control_hit()),
        };
        assert_eq!(sample.resolution("preGameStart"), Resolution::Control);

        let sample = HitSample {
            offset: 45.0,
            anchor: Anchor::Center,
            hit: Some(panel_hit()),
        };
        assert_eq!(
            sample.resolution("preGameStart"),
            Resolution::Intercepted(panel_hit())
        );

        let sample = HitSample {
            offset: 60.0,
            anchor: Anchor::Center,
            hit: None,
        };
        assert_eq!(sample.resolution("preGameStart"), Resolution::Missing);
    }

    #[test]
    fn test_interceptions_ignore_out_of_extent() {
        let mut report = SweepReport::new("preGameStart".into(), rect());
        report.hits.push(HitSample {
            offset: 5.0,
            anchor: Anchor::Center,
            hit: Some(control_hit()),
        });
        report.hits.push(HitSample {
            offset: 45.0,
            anchor: Anchor::Center,
            hit: Some(panel_hit()),
        });
        // Below the bottom edge: expected to differ, not an interception.
        report.hits.push(HitSample {
            offset: 55.0,
            anchor: Anchor::Center,
            hit: Some(panel_hit()),
        });

        let intercepted = report.interceptions();
        assert_eq!(intercepted.len(), 1);
        assert_eq!(intercepted[0].offset, 45.0);
        assert_eq!(report.first_interception().unwrap().offset, 45.0);
        assert!(!report.center_hits_control());
    }

    #[test]
    fn test_center_hits_control_ignores_edge_anchors() {
        let mut report = SweepReport::new("preGameStart".into(), rect());
        report.hits.push(HitSample {
            offset: 5.0,
            anchor: Anchor::Center,
            hit: Some(control_hit()),
        });
        // A left-side interceptor does not fail the center property.
        report.hits.push(HitSample {
            offset: 5.0,
            anchor: Anchor::Left,
            hit: Some(panel_hit()),
        });
        assert!(report.center_hits_control());
        assert_eq!(report.interceptions().len(), 1);
    }

    #[test]
    fn test_center_clicks_dismiss() {
        let mut report = SweepReport::new("preGameStart".into(), rect());
        report.clicks.push(ClickSample {
            offset: 5.0,
            anchor: Anchor::Center,
            overlay_after: Visibility::Hidden,
            reopened: true,
        });
        report.clicks.push(ClickSample {
            offset: 45.0,
            anchor: Anchor::Center,
            overlay_after: Visibility::Visible,
            reopened: false,
        });
        assert!(!report.center_clicks_dismiss());
        assert_eq!(report.reopens(), 1);
    }

    #[test]
    fn test_sample_display() {
        let sample = HitSample {
            offset: 45.0,
            anchor: Anchor::Center,
            hit: Some(panel_hit()),
        };
        assert_eq!(
            sample.to_string(),
            "offset 45 (center): {tag: DIV, id: , classes: preGameActions}"
        );

        let click = ClickSample {
            offset: 5.0,
            anchor: Anchor::Center,
            overlay_after: Visibility::Hidden,
            reopened: true,
        };
        assert_eq!(
            click.to_string(),
            "after click offset 5 (center): overlay display none (reopened)"
        );
    }
}
