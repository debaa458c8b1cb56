use std::sync::{Mutex, MutexGuard};

use ledgerbot_ledger::Balances;

use super::{SnapshotError, SnapshotStore, decode_balances, encode_balances};

#[derive(Debug, Default)]
struct State {
    raw: Option<String>,
    saves: usize,
    fail_writes: bool,
}

/// In-memory snapshot store for tests/dev.
///
/// Holds the encoded snapshot exactly as the file store would write it, so a
/// corrupt payload can be primed with [`InMemorySnapshotStore::with_raw`].
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    inner: Mutex<State>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an arbitrary stored payload (valid or not).
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(State {
                raw: Some(raw.into()),
                ..State::default()
            }),
        }
    }

    pub fn with_balances(balances: &Balances) -> Result<Self, SnapshotError> {
        Ok(Self::with_raw(encode_balances(balances)?))
    }

    /// Make subsequent saves fail (simulates a full disk).
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut state) = self.inner.lock() {
            state.fail_writes = fail;
        }
    }

    /// Number of successful saves so far.
    pub fn saves(&self) -> usize {
        self.inner.lock().map(|s| s.saves).unwrap_or(0)
    }

    pub fn raw(&self) -> Option<String> {
        self.inner.lock().ok().and_then(|s| s.raw.clone())
    }

    /// Decoded view of the last stored payload.
    pub fn stored(&self) -> Option<Balances> {
        self.raw().and_then(|raw| decode_balances(&raw).ok())
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, SnapshotError> {
        self.inner
            .lock()
            .map_err(|_| SnapshotError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load(&self) -> Result<Option<Balances>, SnapshotError> {
        let state = self.state()?;
        state.raw.as_deref().map(decode_balances).transpose()
    }

    fn save(&self, balances: &Balances) -> Result<(), SnapshotError> {
        let mut state = self.state()?;
        if state.fail_writes {
            return Err(SnapshotError::Unavailable("writes disabled".to_string()));
        }
        state.raw = Some(encode_balances(balances)?);
        state.saves += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}
