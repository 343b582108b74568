//! `scroll`/`hover`/`drag`/`key` tools (§6).
//!
//! Grounded on `tools/browser_hover.rs` (`locator.hover()`), `tools/browser_drag.rs`
//! (`locator.drag_to(&other)`), `tools/browser_press_key.rs` (`page.keyboard().press(key)`,
//! supporting combo syntax like `"Control+a"`), and `tools/browser_scroll_into_view.rs`
//! (`locator.scroll_into_view_if_needed()`, reused here for the element-scoped `scroll` case).
//! Whole-page scrolling has no confirmed dedicated API in this crate, so it goes through
//! `page.evaluate("window.scrollBy(...)")`, the same evaluate-to-drive-the-page pattern the
//! Renderer Pipeline already uses for viewport size.

use crate::error::{EngineError, Result};
use crate::render::{PageRepresentation, RenderOptions};
use crate::resolve::resolve_element;
use crate::Engine;

/// Scroll direction for `scroll` (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Scroll up.
    Up,
    /// Scroll down.
    Down,
    /// Scroll left.
    Left,
    /// Scroll right.
    Right,
}

/// Default scroll amount in CSS pixels when `amount` is omitted.
const DEFAULT_SCROLL_AMOUNT: f64 = 400.0;

impl ScrollDirection {
    fn delta(self, amount: f64) -> (f64, f64) {
        match self {
            Self::Up => (0.0, -amount),
            Self::Down => (0.0, amount),
            Self::Left => (-amount, 0.0),
            Self::Right => (amount, 0.0),
        }
    }
}

impl Engine {
    /// Scroll the page, or a specific container element, in `direction` by `amount` CSS pixels
    /// (defaulting to 400) (§6 `scroll`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ElementNotFound`] if `element_id` is given but does not resolve, or
    /// a session error if the scroll itself fails.
    pub async fn scroll(
        &mut self,
        direction: ScrollDirection,
        amount: Option<f64>,
        element_id: Option<&str>,
        options: RenderOptions,
    ) -> Result<PageRepresentation> {
        let (page, target_id) = self.active_page().await?;
        let (dx, dy) = direction.delta(amount.unwrap_or(DEFAULT_SCROLL_AMOUNT));

        if let Some(element_id) = element_id {
            let backend_ref = resolve_element(&page, &target_id, &self.sessions, &mut self.id_gen, element_id).await?;
            let locator = page.locator_from_ref(&backend_ref);
            let js = format!("(el) => el.scrollBy({{left: {dx}, top: {dy}, behavior: 'instant'}})");
            locator.evaluate(&js).await.map_err(|e| EngineError::session_error(format!("scroll {element_id}: {e}")))?;
        } else {
            let js = format!("window.scrollBy({{left: {dx}, top: {dy}, behavior: 'instant'}})");
            page.evaluate(&js).await.map_err(|e| EngineError::session_error(format!("scroll page: {e}")))?;
        }

        self.action_render(options).await
    }

    /// Hover the pointer over an element (§6 `hover`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ElementNotFound`] if `element_id` does not resolve, or a session
    /// error if the hover itself fails.
    pub async fn hover(&mut self, element_id: &str, options: RenderOptions) -> Result<PageRepresentation> {
        let (page, target_id) = self.active_page().await?;
        let backend_ref = resolve_element(&page, &target_id, &self.sessions, &mut self.id_gen, element_id).await?;
        page.locator_from_ref(&backend_ref)
            .hover()
            .await
            .map_err(|e| EngineError::session_error(format!("hover {element_id}: {e}")))?;

        self.action_render(options).await
    }

    /// Drag `from_element_id` onto `to_element_id` (§6 `drag`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ElementNotFound`] if either id does not resolve, or a session error
    /// if the drag itself fails.
    pub async fn drag(&mut self, from_element_id: &str, to_element_id: &str, options: RenderOptions) -> Result<PageRepresentation> {
        let (page, target_id) = self.active_page().await?;
        let from_ref = resolve_element(&page, &target_id, &self.sessions, &mut self.id_gen, from_element_id).await?;
        let to_ref = resolve_element(&page, &target_id, &self.sessions, &mut self.id_gen, to_element_id).await?;

        let source = page.locator_from_ref(&from_ref);
        let target = page.locator_from_ref(&to_ref);
        source
            .drag_to(&target)
            .await
            .map_err(|e| EngineError::session_error(format!("drag {from_element_id} to {to_element_id}: {e}")))?;

        self.action_render(options).await
    }

    /// Press a key or key combination on the active tab (§6 `key`). Supports combo syntax like
    /// `"Control+a"`.
    ///
    /// # Errors
    ///
    /// Returns a session error if the key press fails.
    pub async fn key(&mut self, key: &str, options: RenderOptions) -> Result<PageRepresentation> {
        let (page, _target_id) = self.active_page().await?;
        page.keyboard().press(key).await.map_err(|e| EngineError::session_error(format!("press {key}: {e}")))?;
        self.action_render(options).await
    }
}
