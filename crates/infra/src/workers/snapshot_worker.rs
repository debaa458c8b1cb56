//! Background worker that periodically writes a full ledger snapshot.
//!
//! Mutations already persist themselves; the timer is a second line that
//! also retries durability after a failed mutation write.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::ledger_store::{LedgerStore, LedgerStoreError};

/// Counters exposed by a running worker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotStats {
    pub snapshots_written: u64,
    pub snapshots_failed: u64,
    pub last_saved_at: Option<DateTime<Utc>>,
}

/// Handle to stop a running worker.
#[derive(Debug)]
pub struct SnapshotWorkerHandle {
    shutdown: Arc<Notify>,
    join: JoinHandle<()>,
    stats: Arc<Mutex<SnapshotStats>>,
}

impl SnapshotWorkerHandle {
    /// Request shutdown, wait for the worker task to finish and return its
    /// final counters.
    pub async fn shutdown(self) -> SnapshotStats {
        self.shutdown.notify_one();
        if let Err(err) = self.join.await {
            tracing::warn!(error = %err, "snapshot worker task did not exit cleanly");
        }
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

/// Periodic full-snapshot writer.
pub struct SnapshotWorker {
    store: Arc<LedgerStore>,
    interval: Duration,
}

impl SnapshotWorker {
    pub fn new(store: Arc<LedgerStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Spawn the worker on the current Tokio runtime.
    ///
    /// The first snapshot is taken one full interval after start.
    pub fn start(self) -> SnapshotWorkerHandle {
        let shutdown = Arc::new(Notify::new());
        let stats = Arc::new(Mutex::new(SnapshotStats::default()));

        let join = tokio::spawn(run(self.store, self.interval, shutdown.clone(), stats.clone()));

        SnapshotWorkerHandle {
            shutdown,
            join,
            stats,
        }
    }
}

async fn run(
    store: Arc<LedgerStore>,
    period: Duration,
    shutdown: Arc<Notify>,
    stats: Arc<Mutex<SnapshotStats>>,
) {
    tracing::info!(interval_secs = period.as_secs(), "snapshot worker started");

    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                tracing::info!("snapshot worker received shutdown signal");
                break;
            }
            _ = ticker.tick() => record(&stats, store.save()),
        }
    }
}

fn record(stats: &Mutex<SnapshotStats>, outcome: Result<(), LedgerStoreError>) {
    let Ok(mut s) = stats.lock() else { return };
    match outcome {
        Ok(()) => {
            s.snapshots_written += 1;
            s.last_saved_at = Some(Utc::now());
            tracing::debug!("periodic snapshot written");
        }
        Err(err) => {
            s.snapshots_failed += 1;
            tracing::error!(error = %err, "periodic snapshot failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::InMemorySnapshotStore;

    fn store() -> (Arc<InMemorySnapshotStore>, Arc<LedgerStore>) {
        let snapshots = Arc::new(InMemorySnapshotStore::new());
        let store = Arc::new(LedgerStore::load(snapshots.clone()));
        (snapshots, store)
    }

    #[tokio::test]
    async fn writes_snapshots_on_each_tick() {
        let (snapshots, store) = store();
        let handle = SnapshotWorker::new(store, Duration::from_millis(20)).start();

        tokio::time::sleep(Duration::from_millis(130)).await;
        let stats = handle.shutdown().await;

        assert!(stats.snapshots_written >= 2, "stats: {stats:?}");
        assert!(stats.last_saved_at.is_some());
        assert_eq!(snapshots.saves() as u64, stats.snapshots_written);
        assert_eq!(snapshots.raw().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn first_tick_waits_a_full_interval() {
        let (snapshots, store) = store();
        let handle = SnapshotWorker::new(store, Duration::from_secs(3600)).start();

        tokio::time::sleep(Duration::from_millis(30)).await;
        handle.shutdown().await;

        assert_eq!(snapshots.saves(), 0);
    }

    #[tokio::test]
    async fn failures_are_counted_and_do_not_stop_the_worker() {
        let (snapshots, store) = store();
        snapshots.set_fail_writes(true);
        let handle = SnapshotWorker::new(store, Duration::from_millis(20)).start();

        tokio::time::sleep(Duration::from_millis(70)).await;
        snapshots.set_fail_writes(false);
        tokio::time::sleep(Duration::from_millis(70)).await;

        let stats = handle.shutdown().await;

        assert!(stats.snapshots_failed >= 1, "stats: {stats:?}");
        assert!(stats.snapshots_written >= 1, "stats: {stats:?}");
    }
}
