//! Tab management tools (§6 `tabs`/`tab_open`/`tab_switch`/`tab_close`, §4.8 Page Manager).
//!
//! The teacher's `browser_tabs.rs` addresses tabs by integer index into `BrowserContext::pages()`.
//! This crate's own [`crate::page::PageManager`] addresses tabs by CDP target id instead — the
//! same id `openTab`/`switchTab`/`closeTab` use throughout the wire contract (§4.8) — so these
//! handlers pass target ids straight through rather than resolving an index, keeping one
//! addressing scheme end to end instead of bridging two.

use serde::Serialize;

use crate::error::{EngineError, Result};
use crate::render::{PageRepresentation, RenderOptions};
use crate::Engine;

/// One open tab, as reported by `tabs` (§6).
#[derive(Debug, Clone, Serialize)]
pub struct TabInfo {
    /// The tab's CDP target id — the same id accepted by `tab_switch`/`tab_close`.
    pub id: String,
    /// The tab's current URL.
    pub url: String,
    /// `true` if this is the active tab.
    pub active: bool,
}

impl Engine {
    /// List every open tab in open order (§6 `tabs`).
    ///
    /// # Errors
    ///
    /// Returns a session error if tabs cannot be enumerated.
    pub async fn tabs(&mut self) -> Result<Vec<TabInfo>> {
        let pages = self.browser.pages_mut().await?;
        let active = pages.active_target_id().await;
        let open = pages.list_tabs().await?;

        Ok(open
            .into_iter()
            .map(|(id, url)| {
                let is_active = active.as_deref() == Some(id.as_str());
                TabInfo { id, url, active: is_active }
            })
            .collect())
    }

    /// Open a new tab, making it active, and optionally navigate it to `url` (§6 `tab_open`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionError`] if the tab cannot be created, or
    /// [`EngineError::NavigationFailed`] if `url` is given but fails to load.
    pub async fn tab_open(&mut self, url: Option<&str>, options: RenderOptions) -> Result<PageRepresentation> {
        self.browser.pages_mut().await?.open_tab().await?;

        if let Some(url) = url {
            return self.navigate(url, options).await;
        }

        self.action_render(options).await
    }

    /// Switch the active tab to `tab_id` (§6 `tab_switch`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionError`] if `tab_id` does not name an open tab.
    pub async fn tab_switch(&mut self, tab_id: &str, options: RenderOptions) -> Result<PageRepresentation> {
        self.browser.pages_mut().await?.switch_tab(tab_id).await?;
        self.action_render(options).await
    }

    /// Close `tab_id`. If it was the active tab, the next remaining tab in open order becomes
    /// active (§6 `tab_close`, §4.8 `PageManager::close_tab`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionError`] if the tab cannot be closed, or if no tab remains
    /// active afterward to render.
    pub async fn tab_close(&mut self, tab_id: &str, options: RenderOptions) -> Result<PageRepresentation> {
        self.browser.pages_mut().await?.close_tab(tab_id).await?;

        if self.browser.pages_mut().await?.active_target_id().await.is_none() {
            return Err(EngineError::session_error("closed the last open tab"));
        }

        self.action_render(options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_info_serializes_with_active_flag() {
        let info = TabInfo { id: "T1".to_string(), url: "https://example.com".to_string(), active: true };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["id"], "T1");
        assert_eq!(json["active"], true);
    }
}
