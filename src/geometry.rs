//! Viewport geometry: rectangles, probe points, and horizontal anchors.

use serde::Deserialize;
use std::fmt;

/// Bounding rectangle in page viewport coordinates, as reported by
/// `getBoundingClientRect()`. Captured fresh before each sweep — the same
/// logical control may be re-measured at a different position after the
/// overlay reopens.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// A visible, interactable control has a positive area. A zero-area
    /// rectangle signals the control is not rendered.
    pub fn is_rendered(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Whether a vertical offset from the top edge lands inside the
    /// rectangle's vertical extent.
    pub fn contains_offset(&self, offset: f64) -> bool {
        offset >= 0.0 && offset < self.height
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rect {{x: {}, y: {}, width: {}, height: {}}}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// A single probe coordinate in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Horizontal position of a probe point within a rectangle. Left and right
/// probes at the same offset are recorded independently — a difference
/// between them indicates an element covering only one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Left,
    Center,
    Right,
}

impl Anchor {
    fn x_in(&self, rect: &Rect, margin: f64) -> f64 {
        match self {
            Anchor::Left => rect.x + margin,
            Anchor::Center => rect.x + rect.width / 2.0,
            Anchor::Right => rect.x + rect.width - margin,
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Anchor::Left => "left",
            Anchor::Center => "center",
            Anchor::Right => "right",
        })
    }
}

/// Compute the probe point for a vertical offset below the rectangle's top
/// edge at the given horizontal anchor. Offsets beyond the rectangle's
/// height are valid by design: the hit result changing there is the
/// diagnostic signal.
pub fn probe_point(rect: &Rect, offset: f64, anchor: Anchor, margin: f64) -> Point {
    Point {
        x: anchor.x_in(rect, margin),
        y: rect.y + offset,
    }
}
