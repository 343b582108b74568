//! Snapshot Store and Differ (§4.9, §4.10).

pub mod diff;
pub mod store;

pub use diff::{diff, Change, ChangeKind, DiffScope, SnapshotDiff};
pub use store::{Snapshot, SnapshotStore};
