//! The narrow page-query capability set the diagnostic runs against, and its
//! CDP-backed implementation. The probe logic never builds ad hoc script
//! strings — everything it needs from the page goes through [`PageDriver`].

use async_trait::async_trait;
use eoka::Page;
use serde::Deserialize;
use std::fmt;
use tracing::debug;

use crate::geometry::{Point, Rect};
use crate::Result;

/// The topmost element at a probe point: tag name, element id, class list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HitTarget {
    pub tag: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub classes: String,
}

impl HitTarget {
    /// Whether this hit resolves to the element with the given id.
    pub fn is(&self, id: &str) -> bool {
        self.id == id
    }
}

impl fmt::Display for HitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{tag: {}, id: {}, classes: {}}}",
            self.tag, self.id, self.classes
        )
    }
}

/// The overlay-state observable, read from the overlay's computed `display`
/// style. A missing overlay element reads as hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    pub fn is_hidden(&self) -> bool {
        matches!(self, Visibility::Hidden)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Visibility::Visible => "visible",
            Visibility::Hidden => "none",
        })
    }
}

/// Fixed query capability set over a live page. Element arguments are bare
/// ids. Every call is a blocking round trip to the page; callers rely on
/// strict read-after-write ordering.
#[async_trait]
pub trait PageDriver {
    /// Current bounding rectangle of an element, or None if it does not
    /// exist.
    async fn rect_of(&self, id: &str) -> Result<Option<Rect>>;

    /// Topmost element at a viewport coordinate, without dispatching any
    /// event. None means nothing is rendered there.
    async fn hit_test_at(&self, point: Point) -> Result<Option<HitTarget>>;

    /// Dispatch a real synthetic pointer click at a viewport coordinate.
    async fn click_at(&self, point: Point) -> Result<()>;

    /// Overlay-state observable for an element.
    async fn visibility_of(&self, id: &str) -> Result<Visibility>;

    /// Hide an element if it is present; no-op otherwise.
    async fn suppress(&self, id: &str) -> Result<()>;

    /// Invoke an element's own click handler (`element.click()`).
    async fn press(&self, id: &str) -> Result<()>;

    /// Invoke the page's programmatic start entry point. Returns false when
    /// the page does not expose one.
    async fn request_start(&self, arg: &str) -> Result<bool>;

    /// Wait, bounded, for an element to become visible.
    async fn wait_for_visible(&self, id: &str, timeout_ms: u64) -> Result<()>;

    /// Fixed wait to let rendering settle.
    async fn settle(&self, ms: u64);
}

/// [`PageDriver`] implementation over an eoka CDP page.
pub struct CdpDriver<'a> {
    page: &'a Page,
}

impl<'a> CdpDriver<'a> {
    pub fn new(page: &'a Page) -> Self {
        Self { page }
    }
}

#[async_trait]
impl PageDriver for CdpDriver<'_> {
    async fn rect_of(&self, id: &str) -> Result<Option<Rect>> {
        let js = format!(
            r#"(() => {{
                const el = document.getElementById({id});
                if (!el) return null;
                const r = el.getBoundingClientRect();
                return JSON.stringify({{x: r.x, y: r.y, width: r.width, height: r.height}});
            }})()"#,
            id = serde_json::to_string(id).unwrap()
        );
        let raw: Option<String> = self.page.evaluate(&js).await?;
        match raw {
            None => Ok(None),
            Some(json) => {
                let rect: Rect = serde_json::from_str(&json)
                    .map_err(|e| eoka::Error::CdpSimple(format!("rect parse error: {}", e)))?;
                Ok(Some(rect))
            }
        }
    }

    async fn hit_test_at(&self, point: Point) -> Result<Option<HitTarget>> {
        let js = format!(
            r#"(() => {{
                const el = document.elementFromPoint({x}, {y});
                if (!el) return null;
                return JSON.stringify({{
                    tag: el.tagName,
                    id: el.id,
                    classes: typeof el.className === 'string' ? el.className : ''
                }});
            }})()"#,
            x = point.x,
            y = point.y
        );
        let raw: Option<String> = self.page.evaluate(&js).await?;
        match raw {
            None => Ok(None),
            Some(json) => {
                let hit: HitTarget = serde_json::from_str(&json)
                    .map_err(|e| eoka::Error::CdpSimple(format!("hit parse error: {}", e)))?;
                Ok(Some(hit))
            }
        }
    }

    async fn click_at(&self, point: Point) -> Result<()> {
        // Move the pointer first so hover state matches a real interaction.
        self.page
            .session()
            .dispatch_mouse_event(
                eoka::cdp::MouseEventType::MouseMoved,
                point.x,
                point.y,
                None,
                None,
            )
            .await?;
        let js = format!(
            r#"(() => {{
                const el = document.elementFromPoint({x}, {y});
                if (!el) return false;
                const opts = {{bubbles: true, cancelable: true, view: window, clientX: {x}, clientY: {y}}};
                for (const type of ['pointerdown', 'mousedown', 'pointerup', 'mouseup', 'click']) {{
                    el.dispatchEvent(new MouseEvent(type, opts));
                }}
                return true;
            }})()"#,
            x = point.x,
            y = point.y
        );
        let landed: bool = self.page.evaluate(&js).await?;
        if !landed {
            // A click into empty space is a valid outcome, not an error.
            debug!("click at ({}, {}) hit no element", point.x, point.y);
        }
        Ok(())
    }

    async fn visibility_of(&self, id: &str) -> Result<Visibility> {
        let js = format!(
            r#"(() => {{
                const el = document.getElementById({id});
                if (!el) return 'none';
                return getComputedStyle(el).display;
            }})()"#,
            id = serde_json::to_string(id).unwrap()
        );
        let display: String = self.page.evaluate(&js).await?;
        if display == "none" {
            Ok(Visibility::Hidden)
        } else {
            Ok(Visibility::Visible)
        }
    }

    async fn suppress(&self, id: &str) -> Result<()> {
        let js = format!(
            "const el = document.getElementById({}); if (el) el.style.display = 'none';",
            serde_json::to_string(id).unwrap()
        );
        self.page.execute(&js).await?;
        Ok(())
    }

    async fn press(&self, id: &str) -> Result<()> {
        let js = format!(
            r#"(() => {{
                const el = document.getElementById({id});
                if (!el) return false;
                el.click();
                return true;
            }})()"#,
            id = serde_json::to_string(id).unwrap()
        );
        let found: bool = self.page.evaluate(&js).await?;
        if !found {
            return Err(crate::Error::MissingControl(format!("#{} not found", id)));
        }
        Ok(())
    }

    async fn request_start(&self, arg: &str) -> Result<bool> {
        let js = format!(
            r#"(() => {{
                if (typeof window.requestStart !== 'function') return false;
                window.requestStart({arg});
                return true;
            }})()"#,
            arg = serde_json::to_string(arg).unwrap()
        );
        let invoked: bool = self.page.evaluate(&js).await?;
        Ok(invoked)
    }

    async fn wait_for_visible(&self, id: &str, timeout_ms: u64) -> Result<()> {
        self.page
            .wait_for_visible(&format!("#{}", id), timeout_ms)
            .await?;
        Ok(())
    }

    async fn settle(&self, ms: u64) {
        self.page.wait(ms).await;
    }
}
