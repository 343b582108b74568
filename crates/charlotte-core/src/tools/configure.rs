//! `configure` tool (§6): adjust snapshot depth, auto-snapshot policy, screenshot directory, and
//! dialog auto-dismiss policy at runtime, without restarting the engine.
//!
//! Each knob is backed by an already-existing setter: [`SnapshotStore::set_depth`] (clamped via
//! [`CharlotteConfig::clamp_depth`]), [`ArtifactStore::set_screenshot_dir`], and a direct write to
//! the engine's own `config.dialog_auto_dismiss`/`config.auto_snapshot` — the same fields
//! `CharlotteConfig`'s constructors populate (§4.1 global config, kept as explicit engine state per
//! §9's "no singletons" note rather than a process-wide global).

use std::path::PathBuf;

use serde::Serialize;

use crate::config::{AutoSnapshot, CharlotteConfig, DialogAutoDismiss};
use crate::error::Result;
use crate::Engine;

/// Requested configuration changes for `configure` (§6); every field is optional, leaving
/// unspecified knobs untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigureRequest {
    /// New snapshot ring depth, clamped to `[5, 500]`.
    pub snapshot_depth: Option<u32>,
    /// New auto-snapshot policy.
    pub auto_snapshot: Option<AutoSnapshot>,
    /// New screenshot artifact directory.
    pub screenshot_dir: Option<PathBuf>,
    /// New dialog auto-dismiss policy.
    pub dialog_auto_dismiss: Option<DialogAutoDismiss>,
}

/// The engine's configuration after applying a `configure` request.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigureResult {
    /// The resulting configuration.
    pub config: CharlotteConfig,
}

impl Engine {
    /// Apply `request` to the running engine's configuration (§6 `configure`).
    ///
    /// # Errors
    ///
    /// Returns an error if the new screenshot directory cannot be created or read.
    pub async fn configure(&mut self, request: ConfigureRequest) -> Result<ConfigureResult> {
        if let Some(depth) = request.snapshot_depth {
            let depth = CharlotteConfig::clamp_depth(depth);
            self.snapshots.set_depth(depth);
            self.config.snapshot_depth = depth;
        }

        if let Some(policy) = request.auto_snapshot {
            self.config.auto_snapshot = policy;
        }

        if let Some(dir) = request.screenshot_dir {
            self.artifacts = crate::artifact::ArtifactStore::load(dir.clone()).await?;
            self.config.screenshot_dir = dir;
        }

        if let Some(policy) = request.dialog_auto_dismiss {
            self.config.dialog_auto_dismiss = policy;
        }

        Ok(ConfigureResult { config: self.config.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn snapshot_depth_is_clamped() {
        let mut engine = Engine::new(CharlotteConfig::default()).await.unwrap();
        let request = ConfigureRequest { snapshot_depth: Some(1), ..Default::default() };
        let result = engine.configure(request).await.unwrap();
        assert_eq!(result.config.snapshot_depth, crate::config::MIN_SNAPSHOT_DEPTH);
    }
}
