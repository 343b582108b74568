//! `click`/`type`/`select`/`toggle`/`submit` tools (§6).
//!
//! Grounded on `tools/browser_click.rs` (button/modifier handling), `tools/browser_type.rs`
//! (`fill` vs `type_text`, `page.keyboard().press("Enter")` after typing), and
//! `tools/browser_select_option.rs` (`locator.select_option().value(...)`). The element-scoped
//! JS fallback for `select`'s text-match and `submit`'s no-button case is grounded on
//! `tools/browser_evaluate.rs`'s `locator.evaluate(js)` (element passed as the function's first
//! argument).

use viewpoint_core::MouseButton;
use viewpoint_cdp::protocol::input::modifiers;

use crate::error::{EngineError, Result};
use crate::render::{self, DetailLevel, DetailLevelOrDefault, PageErrors, PageRepresentation, RenderOptions};
use crate::resolve::resolve_element;
use crate::Engine;

/// Mouse button for `click` (§6 `click_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickType {
    /// Left click (default).
    Left,
    /// Right click.
    Right,
    /// Double left-click.
    Double,
}

/// A held modifier key for `click`/`key` (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// Alt/Option.
    Alt,
    /// Control.
    Control,
    /// Meta/Command.
    Meta,
    /// Shift.
    Shift,
}

/// Combine modifiers into the CDP bitmask `click`/`key` builders accept.
#[must_use]
pub fn modifiers_bitmask(mods: &[Modifier]) -> i32 {
    mods.iter().fold(0, |acc, m| {
        acc | match m {
            Modifier::Alt => modifiers::ALT,
            Modifier::Control => modifiers::CTRL,
            Modifier::Meta => modifiers::META,
            Modifier::Shift => modifiers::SHIFT,
        }
    })
}

impl Engine {
    /// Click an element: scroll it into view, then synthesize the requested click (§6 `click`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ElementNotFound`] if `element_id` cannot be resolved, or a session
    /// error if the click itself fails.
    pub async fn click(
        &mut self,
        element_id: &str,
        click_type: ClickType,
        mods: &[Modifier],
        options: RenderOptions,
    ) -> Result<PageRepresentation> {
        let (page, target_id) = self.active_page().await?;
        let backend_ref = resolve_element(&page, &target_id, &self.sessions, &mut self.id_gen, element_id).await?;
        let locator = page.locator_from_ref(&backend_ref);

        locator
            .scroll_into_view_if_needed()
            .await
            .map_err(|e| EngineError::session_error(format!("scroll_into_view: {e}")))?;

        let bitmask = modifiers_bitmask(mods);
        let result = match click_type {
            ClickType::Double => {
                let mut builder = locator.dblclick();
                if bitmask != 0 {
                    builder = builder.modifiers(bitmask);
                }
                builder.await
            }
            ClickType::Left | ClickType::Right => {
                let mut builder = locator.click();
                if matches!(click_type, ClickType::Right) {
                    builder = builder.button(MouseButton::Right);
                }
                if bitmask != 0 {
                    builder = builder.modifiers(bitmask);
                }
                builder.await
            }
        };
        result.map_err(|e| EngineError::session_error(format!("click {element_id}: {e}")))?;

        self.action_render(options).await
    }

    /// Type `text` into an element, optionally clearing it first and pressing Enter afterward
    /// (§6 `type`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ElementNotFound`] if `element_id` cannot be resolved, or a session
    /// error if typing fails.
    pub async fn type_text(
        &mut self,
        element_id: &str,
        text: &str,
        clear_first: bool,
        press_enter: bool,
        options: RenderOptions,
    ) -> Result<PageRepresentation> {
        let (page, target_id) = self.active_page().await?;
        let backend_ref = resolve_element(&page, &target_id, &self.sessions, &mut self.id_gen, element_id).await?;
        let locator = page.locator_from_ref(&backend_ref);

        if clear_first {
            locator.fill("").await.map_err(|e| EngineError::session_error(format!("clear before type: {e}")))?;
        }

        locator.type_text(text).await.map_err(|e| EngineError::session_error(format!("type into {element_id}: {e}")))?;

        if press_enter {
            page.keyboard().press("Enter").await.map_err(|e| EngineError::session_error(format!("press Enter: {e}")))?;
        }

        self.action_render(options).await
    }

    /// Select an option in a `<select>`-like element, matching by value then by trimmed visible
    /// text (§6 `select`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ElementNotFound`] if `element_id` cannot be resolved, or a session
    /// error if no option matches `value` either way.
    pub async fn select(&mut self, element_id: &str, value: &str, options: RenderOptions) -> Result<PageRepresentation> {
        let (page, target_id) = self.active_page().await?;
        let backend_ref = resolve_element(&page, &target_id, &self.sessions, &mut self.id_gen, element_id).await?;
        let locator = page.locator_from_ref(&backend_ref);

        if locator.select_option().value(value).await.is_err() {
            let js = format!(
                "(select) => {{
                    const wanted = {value:?}.trim();
                    const match = Array.from(select.options).find(o => o.textContent.trim() === wanted);
                    if (!match) throw new Error('no option matches ' + wanted);
                    select.value = match.value;
                    select.dispatchEvent(new Event('input', {{ bubbles: true }}));
                    select.dispatchEvent(new Event('change', {{ bubbles: true }}));
                }}"
            );
            locator
                .evaluate(&js)
                .await
                .map_err(|e| EngineError::session_error(format!("select {element_id} by text {value:?}: {e}")))?;
        }

        self.action_render(options).await
    }

    /// Toggle a checkbox/radio/switch-like element by clicking it (§6 `toggle`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ElementNotFound`] if `element_id` cannot be resolved, or a session
    /// error if the click fails.
    pub async fn toggle(&mut self, element_id: &str, options: RenderOptions) -> Result<PageRepresentation> {
        self.click(element_id, ClickType::Left, &[], options).await
    }

    /// Submit a form: click its submit child if one was detected, else dispatch a `submit` event
    /// on the form element directly (§6 `submit`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ElementNotFound`] if `form_id` cannot be resolved, or a session
    /// error if the submit action fails.
    pub async fn submit(&mut self, form_id: &str, options: RenderOptions) -> Result<PageRepresentation> {
        let (page, target_id) = self.active_page().await?;
        let lookup_options = RenderOptions { detail: DetailLevelOrDefault(DetailLevel::Summary), selector: None };
        let representation =
            render::render(&page, &target_id, &self.sessions, &mut self.id_gen, None, PageErrors::default(), None, &lookup_options).await?;
        let form = representation
            .forms
            .iter()
            .find(|f| f.id == form_id)
            .ok_or_else(|| EngineError::element_not_found(format!("no form with id {form_id}"), None))?;

        if let Some(submit_id) = form.submit.clone() {
            return self.click(&submit_id, ClickType::Left, &[], options).await;
        }

        let backend_ref = resolve_element(&page, &target_id, &self.sessions, &mut self.id_gen, form_id).await?;
        let locator = page.locator_from_ref(&backend_ref);
        locator
            .evaluate(
                "(form) => {
                    if (form.requestSubmit) { form.requestSubmit(); }
                    else { form.dispatchEvent(new Event('submit', { bubbles: true, cancelable: true })); }
                }",
            )
            .await
            .map_err(|e| EngineError::session_error(format!("submit {form_id}: {e}")))?;

        self.action_render(options).await
    }
}
