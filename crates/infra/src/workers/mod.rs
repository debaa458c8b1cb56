//! Long-running background tasks.

pub mod snapshot_worker;

pub use snapshot_worker::{SnapshotStats, SnapshotWorker, SnapshotWorkerHandle};
