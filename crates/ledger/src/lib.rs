//! Balance ledger (one non-negative balance per user).
//!
//! Pure domain logic only: no IO, no chat platform, no persistence concerns.

pub mod ledger;

pub use ledger::{BalanceChange, BalanceLedger, Balances, ChangeKind};
