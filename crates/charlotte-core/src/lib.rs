//! Page rendering and interaction engine: turns a live CDP session into structured
//! [`render::PageRepresentation`]s for an autonomous agent, and drives interaction back through
//! the same stable element ids.
//!
//! [`Engine`] is the crate's single entry point, wiring together the Browser Manager, Renderer
//! Pipeline, Snapshot Store, Element ID Generator, and Artifact Store. Tool-handler modules under
//! [`tools`] are thin async methods on `Engine`; the outer transport (MCP server, CLI REPL, ...)
//! is out of scope for this crate.

pub mod actions;
pub mod artifact;
pub mod ax;
pub mod browser;
pub mod config;
pub mod devmode;
pub mod domsig;
pub mod error;
pub mod identity;
pub mod interactive;
pub mod layout;
pub mod page;
pub mod render;
pub mod resolve;
pub mod session;
pub mod snapshot;
pub mod tools;

use artifact::ArtifactStore;
use browser::BrowserManager;
use config::{AutoSnapshot, CharlotteConfig};
use devmode::{DevModeState, ReloadEvent};
use error::{EngineError, Result};
use identity::IdGenerator;
use page::ConsoleLevel;
use render::{PageErrors, PageRepresentation, RenderOptions};
use session::SessionManager;
use snapshot::SnapshotStore;
use viewpoint_core::Page;

/// Owns every piece of engine state for one browsing session: the browser connection, the
/// reconciled element-id map, the snapshot ring, and the screenshot artifact index. Tool handlers
/// in [`tools`] are written as `impl Engine` methods grouped by verb family.
pub struct Engine {
    pub(crate) config: CharlotteConfig,
    pub(crate) browser: BrowserManager,
    pub(crate) id_gen: IdGenerator,
    pub(crate) snapshots: SnapshotStore,
    pub(crate) artifacts: ArtifactStore,
    pub(crate) dev_mode: Option<DevModeState>,
    pub(crate) sessions: SessionManager,
}

impl Engine {
    /// Construct an engine from `config`. The browser itself is not launched until first use
    /// (see [`browser::BrowserManager::ensure_started`]); the Artifact Store's on-disk index is
    /// loaded eagerly since it is just a directory read.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured screenshot directory cannot be created or read.
    pub async fn new(config: CharlotteConfig) -> Result<Self> {
        let artifacts = ArtifactStore::load(config.screenshot_dir.clone()).await?;
        Ok(Self {
            snapshots: SnapshotStore::new(config.snapshot_depth),
            browser: BrowserManager::new(config.clone()),
            id_gen: IdGenerator::new(),
            artifacts,
            dev_mode: None,
            sessions: SessionManager::new(),
            config,
        })
    }

    /// The engine's current configuration.
    #[must_use]
    pub const fn config(&self) -> &CharlotteConfig {
        &self.config
    }

    /// Tear down the browser connection. Safe to call repeatedly.
    pub async fn shutdown(&mut self) {
        self.browser.shutdown().await;
    }

    /// The active tab's page handle and target id, starting the browser first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionError`] if the browser cannot be started or every tab has
    /// been closed.
    pub(crate) async fn active_page(&mut self) -> Result<(Page, String)> {
        let pages = self.browser.pages_mut().await?;
        let target_id = pages.active_target_id().await.ok_or_else(|| EngineError::session_error("no active tab"))?;
        let page = pages
            .active_page()
            .await?
            .ok_or_else(|| EngineError::session_error("no active tab"))?;
        Ok((page, target_id))
    }

    /// Console warnings/errors and failed-or-4xx/5xx network requests buffered for `target_id`
    /// (§4.8 legacy `console_errors`/`network` views, folded into [`PageErrors`] on every render).
    pub(crate) async fn gather_errors(&mut self, target_id: &str) -> Result<PageErrors> {
        let pages = self.browser.pages_mut().await?;
        let console = pages.console_messages(target_id, ConsoleLevel::Warning).await;
        let network = pages
            .network_requests(target_id, None)
            .await
            .into_iter()
            .filter(|r| matches!(r.status, page::RequestStatus::Failed) || r.status_code.is_some_and(|c| c >= 400))
            .collect();
        self.sessions.note_touch(target_id, session::Domain::Network).await;
        Ok(PageErrors { console, network })
    }

    /// The pending dev-mode reload event for the active tab, if one is bound and has fired.
    /// Actually reloads `page` when a change is pending, guarded by `begin_reload`/`end_reload`
    /// so a reload that is still in flight is never started twice (§4.16).
    pub(crate) async fn take_reload_event(&self, page: &Page) -> Option<ReloadEvent> {
        let dev = self.dev_mode.as_ref()?;
        let event = dev.take_pending_reload(&now_iso8601()).await?;
        if dev.begin_reload().await {
            if let Err(e) = page.reload().await {
                tracing::warn!(error = %e, "dev-mode reload failed");
            }
            dev.end_reload().await;
        }
        Some(event)
    }

    /// Render the active tab for an `observe`-style call: refreshes network capture, attaches any
    /// pending dialog/errors/reload event, and pushes a snapshot per the configured
    /// [`AutoSnapshot`] policy (`EveryAction` and `ObserveOnly` both push for observe renders).
    ///
    /// # Errors
    ///
    /// Returns an error if no tab is active or the renderer pipeline fails.
    pub async fn observe_render(&mut self, options: RenderOptions) -> Result<PageRepresentation> {
        let (page, target_id) = self.active_page().await?;
        let _ = self.browser.pages_mut().await?.refresh_network(&target_id, &page).await;
        let dialog = self.browser.pages_mut().await?.pending_dialog(&target_id).await;
        let errors = self.gather_errors(&target_id).await?;
        let reload_event = self.take_reload_event(&page).await;

        let mut representation =
            render::render(&page, &target_id, &self.sessions, &mut self.id_gen, dialog, errors, reload_event, &options)
                .await?;

        if matches!(self.config.auto_snapshot, AutoSnapshot::EveryAction | AutoSnapshot::ObserveOnly) {
            let timestamp = now_iso8601();
            let id = self.snapshots.push(representation.clone(), timestamp.clone());
            representation.snapshot_id = Some(id);
            representation.timestamp = Some(timestamp);
        }

        Ok(representation)
    }

    /// Render the active tab after a mutating action, attaching a diff against the prior
    /// snapshot, pushing a new one only when [`AutoSnapshot::EveryAction`] is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if no tab is active or the renderer pipeline fails.
    pub async fn action_render(&mut self, options: RenderOptions) -> Result<PageRepresentation> {
        let (page, target_id) = self.active_page().await?;
        let _ = self.browser.pages_mut().await?.refresh_network(&target_id, &page).await;
        let dialog = self.browser.pages_mut().await?.pending_dialog(&target_id).await;
        let errors = self.gather_errors(&target_id).await?;
        let reload_event = self.take_reload_event(&page).await;
        let push = matches!(self.config.auto_snapshot, AutoSnapshot::EveryAction);

        actions::render_after_action(
            &page,
            &target_id,
            &self.sessions,
            &mut self.id_gen,
            &mut self.snapshots,
            dialog,
            errors,
            reload_event,
            &options,
            push,
            now_iso8601,
        )
        .await
    }
}

/// An ISO-8601 UTC timestamp for the current instant, used to stamp snapshots and artifacts.
///
/// Centralized here (rather than called ad hoc with `chrono::Utc::now()`) so every timestamp in
/// the engine goes through one call site.
#[must_use]
pub fn now_iso8601() -> String {
    chrono::Utc::now().to_rfc3339()
}
