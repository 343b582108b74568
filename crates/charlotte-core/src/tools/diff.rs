//! `diff` tool (§6, §4.10).

use crate::error::{EngineError, Result};
use crate::snapshot::{diff as compute_diff, DiffScope, SnapshotDiff};
use crate::Engine;

impl Engine {
    /// Diff the current page against a named snapshot, or the previous one if `snapshot_id` is
    /// omitted (§6 `diff`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SnapshotExpired`] if `snapshot_id` names an evicted id, or a
    /// session error if there is no current/previous snapshot to compare against.
    pub fn diff(&mut self, snapshot_id: Option<u64>, scope: DiffScope) -> Result<SnapshotDiff> {
        let latest = self.snapshots.latest().ok_or_else(|| EngineError::session_error("no snapshot to diff from"))?;
        let (to_id, to_representation) = (latest.id, latest.representation.clone());

        let from = match snapshot_id {
            Some(id) => self.snapshots.get(id).ok_or_else(|| {
                let oldest = self.snapshots.oldest_id().unwrap_or(id);
                EngineError::snapshot_expired(id, oldest)
            })?,
            None => self
                .snapshots
                .previous()
                .ok_or_else(|| EngineError::session_error("only one snapshot retained, nothing to diff against"))?,
        };

        Ok(compute_diff(from.id, to_id, &from.representation, &to_representation, scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CharlotteConfig;

    #[tokio::test]
    async fn diff_against_named_snapshot_reports_url_change() {
        let mut engine = Engine::new(CharlotteConfig::default()).await.unwrap();
        // No browser session in a unit test; exercise the error path instead.
        let err = engine.diff(Some(1), DiffScope::All).unwrap_err();
        assert_eq!(err.kind(), "SESSION_ERROR");
    }
}
