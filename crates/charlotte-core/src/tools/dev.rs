//! `dev_serve`/`dev_inject`/`dev_audit` tools (§6, §4.16): dev-mode collaborators.
//!
//! `dev_serve` and `dev_inject` are thin wrappers over [`crate::devmode::DevModeState`], already
//! built from the pack's `notify`/`tower-http` stack rather than the teacher (which has no
//! dev-mode equivalent). `dev_audit` is an explicit boundary stub: a real accessibility/performance
//! auditor is out of scope for this crate, so the handler reports that directly instead of
//! pretending to run one.

use crate::devmode::{DevModeState, ReloadEvent};
use crate::error::{EngineError, Result};
use crate::render::{PageRepresentation, RenderOptions};
use crate::Engine;

impl Engine {
    /// Bind a static file server + debounced watcher over `root` to the active tab and navigate
    /// it to the served root (§6 `dev_serve`, §4.16).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionError`] if `root` escapes `allowed_workspace_root`, the
    /// watcher/listener cannot start, or a dev-mode session is already bound.
    pub async fn dev_serve(&mut self, root: std::path::PathBuf, bind_addr: &str, options: RenderOptions) -> Result<PageRepresentation> {
        if self.dev_mode.is_some() {
            return Err(EngineError::session_error("dev mode is already serving a directory; stop it first"));
        }

        let state = DevModeState::start(root, &self.config.allowed_workspace_root, bind_addr).await?;
        let url = format!("http://{bind_addr}/");
        self.dev_mode = Some(state);

        self.navigate(&url, options).await
    }

    /// Report (and clear) the pending reload event for the active tab without forcing a fresh
    /// navigation (§6 `dev_inject`): useful for agents polling dev-mode state between renders.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionError`] if dev mode is not active.
    pub async fn dev_inject(&mut self) -> Result<Option<ReloadEvent>> {
        let dev = self.dev_mode.as_ref().ok_or_else(|| EngineError::session_error("dev mode is not active"))?;
        Ok(dev.take_pending_reload(&crate::now_iso8601()).await)
    }

    /// Run an external accessibility/performance audit against the active tab (§6 `dev_audit`).
    ///
    /// This crate does not implement an auditor; it is a named external collaborator out of
    /// scope here (§1 Non-goals).
    ///
    /// # Errors
    ///
    /// Always returns [`EngineError::SessionError`] with a recommendation pointing at an external
    /// auditor.
    pub async fn dev_audit(&mut self) -> Result<()> {
        Err(EngineError::SessionError {
            message: "dev_audit has no built-in auditor".to_string(),
            recommendation: Some("run an external accessibility/performance auditor against the active tab's URL".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CharlotteConfig;

    #[tokio::test]
    async fn dev_audit_is_a_documented_stub() {
        let mut engine = Engine::new(CharlotteConfig::default()).await.unwrap();
        let err = engine.dev_audit().await.unwrap_err();
        assert_eq!(err.kind(), "SESSION_ERROR");
        assert!(err.to_string().contains("auditor") || matches!(err, EngineError::SessionError { .. }));
    }
}
