//! Navigation tools (§6 `navigate`/`navigate_back`/`navigate_forward`/`reload`).
//!
//! Grounded on `tools/browser_navigate.rs` (`page.goto(url).goto()`) and
//! `tools/browser_navigate_back.rs` (`page.go_back()`, the only history-traversal method the
//! teacher's code confirms is real). `go_forward` is inferred by symmetry with `go_back` — no
//! teacher call site exercises it, so it is grounded on the shape of the confirmed method rather
//! than an observed usage; see `DESIGN.md`.

use crate::error::{EngineError, Result};
use crate::render::{PageRepresentation, RenderOptions};
use crate::Engine;

impl Engine {
    /// Navigate the active tab to `url` and render the result (§6 `navigate`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NavigationFailed`] if the load fails, or a session error if no tab
    /// is active.
    pub async fn navigate(&mut self, url: &str, options: RenderOptions) -> Result<PageRepresentation> {
        let (page, _target_id) = self.active_page().await?;
        page.goto(url)
            .goto()
            .await
            .map_err(|e| EngineError::navigation_failed(format!("goto {url}: {e}")))?;
        self.action_render(options).await
    }

    /// Navigate back in the active tab's history (§6 `navigate_back`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NavigationFailed`] if there is no history entry to go back to.
    pub async fn navigate_back(&mut self, options: RenderOptions) -> Result<PageRepresentation> {
        let (page, _target_id) = self.active_page().await?;
        page.go_back().await.map_err(|e| EngineError::navigation_failed(format!("go_back: {e}")))?;
        self.action_render(options).await
    }

    /// Navigate forward in the active tab's history (§6 `navigate_forward`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NavigationFailed`] if there is no forward history entry.
    pub async fn navigate_forward(&mut self, options: RenderOptions) -> Result<PageRepresentation> {
        let (page, _target_id) = self.active_page().await?;
        page.go_forward().await.map_err(|e| EngineError::navigation_failed(format!("go_forward: {e}")))?;
        self.action_render(options).await
    }

    /// Reload the active tab (§6 `reload`). `hard` is accepted for API symmetry with common
    /// browser-automation surfaces, but viewpoint-core's confirmed `reload()` takes no cache-mode
    /// argument, so a hard reload degrades to the same soft reload (noted in `DESIGN.md`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NavigationFailed`] if the reload fails.
    pub async fn reload(&mut self, _hard: bool, options: RenderOptions) -> Result<PageRepresentation> {
        let (page, _target_id) = self.active_page().await?;
        page.reload().await.map_err(|e| EngineError::navigation_failed(format!("reload: {e}")))?;
        self.action_render(options).await
    }
}
