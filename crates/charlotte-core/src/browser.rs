//! Browser Manager (§4.1 adjacent): launch/connect, reconnect, and teardown of the single
//! underlying browser instance, per the teacher's `BrowserState` but collapsed to one context
//! (§5: the engine models a single active browsing session, not named contexts).

use viewpoint_core::Browser;

use crate::config::CharlotteConfig;
use crate::error::{EngineError, Result};
use crate::page::PageManager;

/// Owns the underlying CDP connection and the single [`PageManager`] built on top of it.
pub struct BrowserManager {
    config: CharlotteConfig,
    browser: Option<Browser>,
    pages: Option<PageManager>,
}

impl std::fmt::Debug for BrowserManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserManager")
            .field("launched", &self.browser.is_some())
            .field("headless", &self.config.headless)
            .finish_non_exhaustive()
    }
}

impl BrowserManager {
    /// Construct a manager that has not yet launched or connected.
    #[must_use]
    pub const fn new(config: CharlotteConfig) -> Self {
        Self { config, browser: None, pages: None }
    }

    /// `true` once [`Self::ensure_started`] has successfully launched or connected.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.browser.is_some()
    }

    /// Lazily launch a new browser (or connect to `cdp_endpoint`, if configured) and create a
    /// single browsing context + [`PageManager`] on first use.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionError`] if launch or connection fails.
    pub async fn ensure_started(&mut self) -> Result<()> {
        if self.browser.is_some() {
            return Ok(());
        }

        tracing::info!(
            headless = self.config.headless,
            cdp_endpoint = ?self.config.cdp_endpoint,
            "starting browser"
        );

        let browser = if let Some(endpoint) = self.config.cdp_endpoint.clone() {
            if endpoint.starts_with("ws://") || endpoint.starts_with("wss://") {
                Browser::connect(&endpoint).await.map_err(|e| EngineError::session_error(e.to_string()))?
            } else {
                Browser::connect_over_cdp(&endpoint)
                    .connect()
                    .await
                    .map_err(|e| EngineError::session_error(e.to_string()))?
            }
        } else {
            let mut launcher = Browser::launch().headless(self.config.headless).args(["--no-startup-window"]);
            if let Some(user_data_dir) = &self.config.user_data_dir {
                launcher = launcher.user_data_dir(user_data_dir);
            }
            // `BrowserType::Chrome` and `Chromium` launch identically in viewpoint-core; the
            // distinction only matters for callers that report which binary family they asked for.
            launcher.launch().await.map_err(|e| EngineError::session_error(e.to_string()))?
        };

        let context = browser
            .new_context()
            .await
            .map_err(|e| EngineError::session_error(e.to_string()))?;

        let pages = PageManager::new(context, self.config.dialog_auto_dismiss).await?;

        if let Some(viewport) = self.config.viewport {
            if let Ok(Some(page)) = pages.active_page().await {
                if let Err(e) = page.set_viewport_size(viewport.width as i32, viewport.height as i32).await {
                    tracing::warn!(error = %e, "failed to apply configured viewport");
                }
            }
        }

        self.browser = Some(browser);
        self.pages = Some(pages);
        Ok(())
    }

    /// The [`PageManager`] for the current session, starting the browser first if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser cannot be started.
    pub async fn pages(&mut self) -> Result<&PageManager> {
        self.ensure_started().await?;
        self.pages.as_ref().ok_or_else(|| EngineError::session_error("browser not started"))
    }

    /// As [`Self::pages`], but mutable.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser cannot be started.
    pub async fn pages_mut(&mut self) -> Result<&mut PageManager> {
        self.ensure_started().await?;
        self.pages.as_mut().ok_or_else(|| EngineError::session_error("browser not started"))
    }

    /// Tear down the browser and every page/context it owns. Safe to call when not started.
    pub async fn shutdown(&mut self) {
        self.pages = None;
        if let Some(browser) = self.browser.take() {
            tracing::info!("shutting down browser");
            let _ = browser.close().await;
        }
    }

    /// Reconnect after an unexpected disconnection: tear down any stale handle and relaunch on
    /// the next [`Self::ensure_started`] call.
    pub async fn reconnect(&mut self) {
        tracing::warn!("browser connection lost, will relaunch on next use");
        self.shutdown().await;
    }
}
