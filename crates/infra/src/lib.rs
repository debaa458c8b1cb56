//! Infrastructure layer: ledger persistence, configuration, background workers.

pub mod config;
pub mod ledger_store;
pub mod snapshot;
pub mod workers;

pub use config::{BotConfig, ConfigError};
pub use ledger_store::{DebitOutcome, LedgerStore, LedgerStoreError};
pub use snapshot::{InMemorySnapshotStore, JsonFileStore, SnapshotError, SnapshotStore};
pub use workers::{SnapshotWorker, SnapshotWorkerHandle};
