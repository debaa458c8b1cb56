//! Durable ledger snapshots.
//!
//! The whole balance map is the unit of persistence: every save rewrites the
//! full mapping and every load reads it back in one piece. The on-disk format
//! is a single JSON object (`{"<user id>": <balance>, ...}`) pretty-printed
//! with two-space indentation.

pub mod in_memory;
pub mod json_file;

use std::path::PathBuf;

use thiserror::Error;

use ledgerbot_ledger::Balances;

pub use in_memory::InMemorySnapshotStore;
pub use json_file::JsonFileStore;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot is not a valid balance map: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("snapshot backend unavailable: {0}")]
    Unavailable(String),
}

/// Storage backend for full-ledger snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Read the last snapshot. `Ok(None)` means nothing was ever saved.
    fn load(&self) -> Result<Option<Balances>, SnapshotError>;

    /// Replace the stored snapshot with `balances`.
    fn save(&self, balances: &Balances) -> Result<(), SnapshotError>;

    /// Short human-readable location, used in log fields.
    fn describe(&self) -> String;
}

/// Serialize balances in the durable format.
pub fn encode_balances(balances: &Balances) -> Result<String, SnapshotError> {
    serde_json::to_string_pretty(balances).map_err(SnapshotError::Encode)
}

/// Parse the durable format. Negative, fractional or non-numeric balances are
/// rejected as a whole; there is no partial recovery.
pub fn decode_balances(raw: &str) -> Result<Balances, SnapshotError> {
    serde_json::from_str(raw).map_err(SnapshotError::Decode)
}
