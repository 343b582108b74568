//! Dev Mode State (§4.16): a static file server plus debounced file watcher bound to one tab.
//!
//! The outer dev-server/watcher is an external collaborator per §1's Non-goals; this module owns
//! only the piece the core is responsible for — binding a server to a directory, watching it, and
//! merging changed paths into a pending [`ReloadEvent`]. The actual page reload happens from
//! [`crate::Engine::take_reload_event`] on the next render (the watcher callback has no `Page`
//! handle of its own to reload with), guarded by `begin_reload`/`end_reload` so a reload already
//! in flight is never started twice. The HTTP server reuses the teacher's axum/`tower-http` stack
//! (`SseTransport::run`'s `Router`/`axum::serve` idiom); the watcher is new, grounded on
//! `notify-debouncer-full`'s documented debounced-events API.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_full::{new_debouncer, DebounceEventResult, Debouncer, FileIdMap};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::services::ServeDir;

use crate::error::{EngineError, Result};

/// Debounce window for coalescing rapid successive file-system events (§4.16).
const DEBOUNCE_MS: u64 = 300;

/// A reload triggered by a watched file change (§4.16).
#[derive(Debug, Clone, Serialize)]
pub struct ReloadEvent {
    /// Always `"file_change"` for this version of the engine.
    pub trigger: &'static str,
    /// Paths (relative to the served root) that changed since the last reload.
    pub files_changed: Vec<String>,
    /// ISO-8601 timestamp of the triggering batch.
    pub timestamp: String,
}

/// Dev Mode State: owns a `tower-http` static server over `allowed_workspace_root` and a
/// debounced `notify` watcher, merging changed paths into a pending [`ReloadEvent`].
pub struct DevModeState {
    root: PathBuf,
    pending: Arc<Mutex<Option<ReloadEvent>>>,
    reload_in_flight: Arc<Mutex<bool>>,
    _watcher: Debouncer<notify::RecommendedWatcher, FileIdMap>,
}

impl DevModeState {
    /// Start watching `root` (which must be within `allowed_workspace_root`) for changes and
    /// serve it statically on `bind_addr`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionError`] if `root` escapes the sandbox, the watcher cannot be
    /// installed, or the HTTP listener cannot bind.
    pub async fn start(root: PathBuf, allowed_workspace_root: &Path, bind_addr: &str) -> Result<Self> {
        let canonical_root = root
            .canonicalize()
            .map_err(|e| EngineError::session_error(format!("dev-mode root {root:?}: {e}")))?;
        let canonical_allowed = allowed_workspace_root
            .canonicalize()
            .map_err(|e| EngineError::session_error(format!("workspace root {allowed_workspace_root:?}: {e}")))?;
        if !canonical_root.starts_with(&canonical_allowed) {
            return Err(EngineError::session_error(format!(
                "{root:?} is outside the allowed workspace root {allowed_workspace_root:?}"
            )));
        }

        let pending: Arc<Mutex<Option<ReloadEvent>>> = Arc::new(Mutex::new(None));
        let reload_in_flight = Arc::new(Mutex::new(false));

        let pending_for_watcher = pending.clone();
        let watch_root = canonical_root.clone();
        let mut debouncer = new_debouncer(
            Duration::from_millis(DEBOUNCE_MS),
            None,
            move |result: DebounceEventResult| {
                let Ok(events) = result else { return };
                let files_changed: Vec<String> = events
                    .iter()
                    .flat_map(|e| e.paths.iter())
                    .filter_map(|p| p.strip_prefix(&watch_root).ok())
                    .map(|p| p.display().to_string())
                    .collect();
                if files_changed.is_empty() {
                    return;
                }

                let pending = pending_for_watcher.clone();
                tokio::spawn(async move {
                    let mut guard = pending.lock().await;
                    let merged = match guard.take() {
                        Some(mut existing) => {
                            existing.files_changed.extend(files_changed);
                            existing.files_changed.sort_unstable();
                            existing.files_changed.dedup();
                            existing
                        }
                        None => ReloadEvent {
                            trigger: "file_change",
                            files_changed,
                            timestamp: String::new(),
                        },
                    };
                    *guard = Some(merged);
                });
            },
        )
        .map_err(|e| EngineError::session_error(format!("failed to start file watcher: {e}")))?;

        debouncer
            .watch(&canonical_root, RecursiveMode::Recursive)
            .map_err(|e| EngineError::session_error(format!("failed to watch {canonical_root:?}: {e}")))?;

        let serve_root = canonical_root.clone();
        let bind_addr = bind_addr.to_string();
        tokio::spawn(async move {
            let app = axum::Router::new().fallback_service(ServeDir::new(&serve_root));
            let Ok(listener) = tokio::net::TcpListener::bind(&bind_addr).await else {
                tracing::error!(addr = %bind_addr, "dev-mode static server failed to bind");
                return;
            };
            tracing::info!(addr = %bind_addr, root = ?serve_root, "dev-mode static server listening");
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "dev-mode static server exited");
            }
        });

        Ok(Self { root: canonical_root, pending, reload_in_flight, _watcher: debouncer })
    }

    /// The directory being served/watched.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Consume and clear the pending reload event, stamping `timestamp` if one is present
    /// (§4.16: "the renderer pipeline consumes and clears the pending event each render").
    pub async fn take_pending_reload(&self, timestamp: &str) -> Option<ReloadEvent> {
        let mut guard = self.pending.lock().await;
        guard.take().map(|mut event| {
            event.timestamp = timestamp.to_string();
            event
        })
    }

    /// Mark a reload as started; returns `false` without marking anything if one was already
    /// running, so the caller ([`crate::Engine::take_reload_event`]) can skip issuing a second
    /// navigation (§4.16: "at most one reload in flight").
    pub async fn begin_reload(&self) -> bool {
        let mut guard = self.reload_in_flight.lock().await;
        if *guard {
            return false;
        }
        *guard = true;
        true
    }

    /// Mark the in-flight reload as finished.
    pub async fn end_reload(&self) {
        *self.reload_in_flight.lock().await = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_root_outside_workspace() {
        let workspace = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let result = DevModeState::start(outside.path().to_path_buf(), workspace.path(), "127.0.0.1:0").await;
        assert!(result.is_err());
    }
}
