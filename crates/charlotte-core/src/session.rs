//! CDP Session Manager (§4.1): a thin, per-tab memoizing record of which logical CDP domains
//! have been exercised.
//!
//! `viewpoint_core::Page` enables domains internally the first time a higher-level call needs
//! them (`aria_snapshot_with_frames`, `locator_from_ref`, `evaluate`, ...) — there is no explicit
//! `Domain.enable` left for this engine to send. This module does not attempt to enable anything
//! itself; it only records, per `target_id`, whether a domain has been touched at least once this
//! session, and logs a `warn!` (without aborting anything) the first time a touch fails. That is
//! the level of control the underlying crate exposes.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

/// A logical CDP domain the Renderer Pipeline relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Accessibility tree extraction (`aria_snapshot_with_frames`).
    Accessibility,
    /// DOM node resolution backing `locator_from_ref`.
    Dom,
    /// Box-model/bounds queries (`locator.bounding_box()`).
    Css,
    /// Navigation/runtime evaluation (`goto`, `evaluate`).
    Page,
    /// Request/response capture (`network_requests`).
    Network,
}

/// Per-`target_id` record of which [`Domain`]s have been exercised this session (§4.1).
#[derive(Debug, Default)]
pub struct SessionManager {
    touched: RwLock<HashMap<String, HashSet<Domain>>>,
}

impl SessionManager {
    /// Construct an empty session manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `domain` was exercised successfully for `target_id`. Returns `true` the first
    /// time this domain is touched for this tab, `false` on every subsequent call.
    pub async fn note_touch(&self, target_id: &str, domain: Domain) -> bool {
        let mut touched = self.touched.write().await;
        touched.entry(target_id.to_string()).or_default().insert(domain)
    }

    /// `true` if `domain` has been touched at least once for `target_id` this session.
    pub async fn has_touched(&self, target_id: &str, domain: Domain) -> bool {
        self.touched.read().await.get(target_id).is_some_and(|domains| domains.contains(&domain))
    }

    /// Record that the first touch of `domain` for `target_id` failed. Logged at `warn!` only —
    /// per §4.1, a failed domain enable never aborts session creation, so this never returns an
    /// error.
    pub fn note_enable_failure(&self, target_id: &str, domain: Domain, error: &str) {
        tracing::warn!(target_id, ?domain, error, "CDP domain touch failed; continuing best-effort");
    }

    /// Drop the record for `target_id`, e.g. when its tab closes.
    pub async fn forget(&self, target_id: &str) {
        self.touched.write().await.remove(target_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_touch_is_reported_once() {
        let sessions = SessionManager::new();
        assert!(sessions.note_touch("t1", Domain::Accessibility).await);
        assert!(!sessions.note_touch("t1", Domain::Accessibility).await);
        assert!(sessions.has_touched("t1", Domain::Accessibility).await);
        assert!(!sessions.has_touched("t1", Domain::Css).await);
    }

    #[tokio::test]
    async fn domains_are_tracked_per_tab() {
        let sessions = SessionManager::new();
        sessions.note_touch("t1", Domain::Network).await;
        assert!(!sessions.has_touched("t2", Domain::Network).await);
    }

    #[tokio::test]
    async fn forget_clears_the_record() {
        let sessions = SessionManager::new();
        sessions.note_touch("t1", Domain::Page).await;
        sessions.forget("t1").await;
        assert!(!sessions.has_touched("t1", Domain::Page).await);
    }
}
