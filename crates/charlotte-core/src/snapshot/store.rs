//! Snapshot Store (§4.9): a bounded, monotonically-id'd ring buffer of [`PageRepresentation`]s.

use std::collections::VecDeque;

use crate::config::{CharlotteConfig, MAX_SNAPSHOT_DEPTH, MIN_SNAPSHOT_DEPTH};
use crate::render::PageRepresentation;

/// One entry in the ring (§3 `Snapshot`).
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Monotonic snapshot id.
    pub id: u64,
    /// ISO-8601 capture timestamp.
    pub timestamp: String,
    /// The stamped representation.
    pub representation: PageRepresentation,
}

/// Bounded ring buffer of [`Snapshot`]s, indexed by monotonically increasing id.
pub struct SnapshotStore {
    depth: u32,
    next_id: u64,
    entries: VecDeque<Snapshot>,
}

impl SnapshotStore {
    /// Construct a store with `depth` clamped into `[5, 500]`.
    #[must_use]
    pub fn new(depth: u32) -> Self {
        Self { depth: CharlotteConfig::clamp_depth(depth), next_id: 1, entries: VecDeque::new() }
    }

    /// Push `representation`, stamping it with a fresh id and `timestamp`, evicting the oldest
    /// entry if the ring is full. Returns the assigned id.
    pub fn push(&mut self, mut representation: PageRepresentation, timestamp: String) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        representation.snapshot_id = Some(id);
        representation.timestamp = Some(timestamp.clone());

        if self.entries.len() >= self.depth as usize {
            self.entries.pop_front();
        }
        self.entries.push_back(Snapshot { id, timestamp, representation });
        id
    }

    /// Look up a snapshot by id; `None` if evicted or never issued.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&Snapshot> {
        self.entries.iter().find(|s| s.id == id)
    }

    /// The most recently pushed snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<&Snapshot> {
        self.entries.back()
    }

    /// The second-most-recently pushed snapshot.
    #[must_use]
    pub fn previous(&self) -> Option<&Snapshot> {
        let len = self.entries.len();
        if len < 2 {
            return None;
        }
        self.entries.get(len - 2)
    }

    /// The oldest retained id, for citing in "snapshot expired" recommendations.
    #[must_use]
    pub fn oldest_id(&self) -> Option<u64> {
        self.entries.front().map(|s| s.id)
    }

    /// Change the ring depth, clamped to `[5, 500]`, evicting overflow immediately.
    pub fn set_depth(&mut self, depth: u32) {
        self.depth = CharlotteConfig::clamp_depth(depth);
        while self.entries.len() > self.depth as usize {
            self.entries.pop_front();
        }
    }

    /// The current configured depth.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Drop every retained snapshot and reset the id counter to 1.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_id = 1;
    }
}

const _: () = assert!(MIN_SNAPSHOT_DEPTH <= MAX_SNAPSHOT_DEPTH);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Bounds2d, PageErrors, Structure};

    fn blank() -> PageRepresentation {
        PageRepresentation {
            url: "https://example.com".to_string(),
            title: "t".to_string(),
            viewport: Bounds2d { width: 0, height: 0 },
            snapshot_id: None,
            timestamp: None,
            structure: Structure::default(),
            interactive: Some(Vec::new()),
            interactive_summary: None,
            forms: Vec::new(),
            errors: PageErrors::default(),
            pending_dialog: None,
            reload_event: None,
            delta: None,
        }
    }

    #[test]
    fn ids_never_reused_across_eviction() {
        let mut store = SnapshotStore::new(5);
        for _ in 0..8 {
            store.push(blank(), "ts".to_string());
        }
        assert_eq!(store.oldest_id(), Some(4));
        assert!(store.get(1).is_none());
        assert_eq!(store.latest().unwrap().id, 8);
    }

    #[test]
    fn depth_clamped_on_construction() {
        let store = SnapshotStore::new(1);
        assert_eq!(store.depth(), MIN_SNAPSHOT_DEPTH);
    }

    #[test]
    fn clear_resets_id_counter() {
        let mut store = SnapshotStore::new(5);
        store.push(blank(), "ts".to_string());
        store.push(blank(), "ts".to_string());
        store.clear();
        let id = store.push(blank(), "ts".to_string());
        assert_eq!(id, 1);
    }

    #[test]
    fn previous_is_second_most_recent() {
        let mut store = SnapshotStore::new(5);
        store.push(blank(), "ts".to_string());
        store.push(blank(), "ts".to_string());
        assert_eq!(store.previous().unwrap().id, 1);
        assert_eq!(store.latest().unwrap().id, 2);
    }
}
