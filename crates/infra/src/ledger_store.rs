//! The ledger service: in-memory balances plus best-effort durability.
//!
//! `LedgerStore` owns the [`BalanceLedger`] and the [`SnapshotStore`] it is
//! persisted to. Every mutation (including the zero-initialisation on first
//! read) is followed by a full snapshot write while the ledger lock is still
//! held, so mutations and the periodic snapshot never interleave.
//!
//! ## Durability contract
//!
//! Writes are best effort. A failed write is logged and swallowed: the
//! in-memory change stands and the operation reports success. A process crash
//! after such a failure loses every change since the last good write.

use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, error, info};

use ledgerbot_core::{Amount, DomainError, UserId};
use ledgerbot_ledger::{BalanceChange, BalanceLedger, Balances};

use crate::snapshot::{SnapshotError, SnapshotStore};

#[derive(Debug, Error)]
pub enum LedgerStoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("ledger lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Result of [`LedgerStore::try_debit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    Debited { new_balance: u64 },
    /// Nothing was removed; `available` is the balance at the time of the check.
    Insufficient { available: u64 },
}

pub struct LedgerStore {
    ledger: Mutex<BalanceLedger>,
    snapshots: Arc<dyn SnapshotStore>,
}

impl core::fmt::Debug for LedgerStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LedgerStore")
            .field("snapshots", &self.snapshots.describe())
            .finish_non_exhaustive()
    }
}

impl LedgerStore {
    /// Load the ledger from `snapshots`. Never fails.
    ///
    /// A missing snapshot starts an empty ledger. An unreadable or corrupt one
    /// is logged and also starts an empty ledger; the bad data is overwritten
    /// by the next write.
    pub fn load(snapshots: Arc<dyn SnapshotStore>) -> Self {
        let location = snapshots.describe();
        let ledger = match snapshots.load() {
            Ok(Some(balances)) => {
                info!(store = %location, accounts = balances.len(), "ledger loaded");
                BalanceLedger::from_balances(balances)
            }
            Ok(None) => {
                info!(store = %location, "no existing ledger found, starting empty");
                BalanceLedger::new()
            }
            Err(err) => {
                error!(store = %location, error = %err, "failed to load ledger, starting empty");
                BalanceLedger::new()
            }
        };

        Self {
            ledger: Mutex::new(ledger),
            snapshots,
        }
    }

    /// Current balance of `user_id`; unknown users are opened at zero and the
    /// new account is persisted before returning.
    pub fn get_balance(&self, user_id: &UserId) -> Result<u64, LedgerStoreError> {
        let mut ledger = self.lock()?;
        let (balance, opened) = ledger.balance_or_init(user_id);
        if opened {
            debug!(user_id = %user_id, "account opened");
            self.persist(&ledger);
        }
        Ok(balance)
    }

    /// Add `amount` and persist. Returns the new balance.
    pub fn credit(&self, user_id: &UserId, amount: Amount) -> Result<u64, LedgerStoreError> {
        let mut ledger = self.lock()?;
        let change = ledger.credit(user_id, amount)?;
        log_change(&change);
        self.persist(&ledger);
        Ok(change.current)
    }

    /// Subtract `amount`, clamping at zero, and persist. Returns the new
    /// balance.
    ///
    /// Callers that must not silently zero an account check funds first; the
    /// clamp here holds regardless.
    pub fn debit(&self, user_id: &UserId, amount: Amount) -> Result<u64, LedgerStoreError> {
        let mut ledger = self.lock()?;
        Ok(self.apply_debit(&mut ledger, user_id, amount))
    }

    /// Debit only if the balance covers `amount`.
    ///
    /// The funds check and the debit happen under one lock, so two concurrent
    /// debits can never both be paid out of the same balance. Unknown users are
    /// opened at zero (and persisted) before the check, as with
    /// [`get_balance`](Self::get_balance).
    pub fn try_debit(&self, user_id: &UserId, amount: Amount) -> Result<DebitOutcome, LedgerStoreError> {
        let mut ledger = self.lock()?;
        let (available, opened) = ledger.balance_or_init(user_id);
        if available < amount.get() {
            if opened {
                debug!(user_id = %user_id, "account opened");
                self.persist(&ledger);
            }
            return Ok(DebitOutcome::Insufficient { available });
        }

        let new_balance = self.apply_debit(&mut ledger, user_id, amount);
        Ok(DebitOutcome::Debited { new_balance })
    }

    /// Write a full snapshot now, reporting failure to the caller.
    pub fn save(&self) -> Result<(), LedgerStoreError> {
        let ledger = self.lock()?;
        self.snapshots.save(ledger.balances())?;
        Ok(())
    }

    /// Copy of the current balances.
    pub fn snapshot(&self) -> Result<Balances, LedgerStoreError> {
        Ok(self.lock()?.balances().clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BalanceLedger>, LedgerStoreError> {
        self.ledger.lock().map_err(|_| LedgerStoreError::Poisoned)
    }

    fn apply_debit(&self, ledger: &mut BalanceLedger, user_id: &UserId, amount: Amount) -> u64 {
        let change = ledger.debit(user_id, amount);
        log_change(&change);
        self.persist(ledger);
        change.current
    }

    fn persist(&self, ledger: &BalanceLedger) {
        if let Err(err) = self.snapshots.save(ledger.balances()) {
            error!(
                store = %self.snapshots.describe(),
                error = %err,
                "failed to save ledger, keeping in-memory state"
            );
        }
    }
}

fn log_change(change: &BalanceChange) {
    info!(
        user_id = %change.user_id,
        kind = change.kind.as_str(),
        previous = change.previous,
        current = change.current,
        "balance changed"
    );
}
