use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ledgerbot_core::{Amount, DomainError, DomainResult, UserId};

/// Full ledger contents, ordered by user id so snapshots are deterministic.
pub type Balances = BTreeMap<UserId, u64>;

/// What kind of mutation produced a [`BalanceChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Credit,
    Debit,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Credit => "credit",
            ChangeKind::Debit => "debit",
        }
    }
}

/// Outcome of one mutation, kept for logging and for the caller's reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChange {
    pub user_id: UserId,
    pub kind: ChangeKind,
    pub previous: u64,
    pub current: u64,
}

/// In-memory balance ledger.
///
/// Balances are unsigned, so "never negative" holds by construction; debits
/// clamp at zero rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceLedger {
    balances: Balances,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_balances(balances: Balances) -> Self {
        Self { balances }
    }

    pub fn balances(&self) -> &Balances {
        &self.balances
    }

    /// Current balance, opening the account at zero on first sight.
    ///
    /// Returns `(balance, opened)`; `opened == true` means the ledger changed
    /// and the caller owes a persistence write.
    pub fn balance_or_init(&mut self, user_id: &UserId) -> (u64, bool) {
        match self.balances.get(user_id) {
            Some(b) => (*b, false),
            None => {
                self.balances.insert(user_id.clone(), 0);
                (0, true)
            }
        }
    }

    /// Add `amount` to the user's balance.
    ///
    /// The only failure is exceeding `u64::MAX`, in which case nothing changes
    /// (not even the zero-initialisation of a new account).
    pub fn credit(&mut self, user_id: &UserId, amount: Amount) -> DomainResult<BalanceChange> {
        let previous = self.balances.get(user_id).copied().unwrap_or(0);
        let current = previous
            .checked_add(amount.get())
            .ok_or_else(|| DomainError::invariant("balance overflow"))?;

        self.balances.insert(user_id.clone(), current);
        Ok(BalanceChange {
            user_id: user_id.clone(),
            kind: ChangeKind::Credit,
            previous,
            current,
        })
    }

    /// Subtract `amount` from the user's balance, clamping at zero.
    pub fn debit(&mut self, user_id: &UserId, amount: Amount) -> BalanceChange {
        let previous = self.balances.get(user_id).copied().unwrap_or(0);
        let current = previous.saturating_sub(amount.get());

        self.balances.insert(user_id.clone(), current);
        BalanceChange {
            user_id: user_id.clone(),
            kind: ChangeKind::Debit,
            previous,
            current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn amount(n: i64) -> Amount {
        Amount::new(n).unwrap()
    }

    #[test]
    fn first_read_opens_account_at_zero() {
        let mut ledger = BalanceLedger::new();
        assert_eq!(ledger.balance_or_init(&uid("u1")), (0, true));
        assert!(ledger.balances().contains_key(&uid("u1")));
        assert_eq!(ledger.balance_or_init(&uid("u1")), (0, false));
    }

    #[test]
    fn credit_then_debit_to_exactly_zero() {
        let mut ledger = BalanceLedger::new();
        let c = ledger.credit(&uid("u1"), amount(500)).unwrap();
        assert_eq!((c.previous, c.current, c.kind), (0, 500, ChangeKind::Credit));

        let d = ledger.debit(&uid("u1"), amount(500));
        assert_eq!((d.previous, d.current, d.kind), (500, 0, ChangeKind::Debit));
        assert_eq!(ledger.balances().get(&uid("u1")), Some(&0));
    }

    #[test]
    fn debit_beyond_balance_clamps_to_zero() {
        let mut ledger = BalanceLedger::from_balances(Balances::from([(uid("u1"), 500)]));
        let d = ledger.debit(&uid("u1"), amount(600));
        assert_eq!(d.current, 0);
    }

    #[test]
    fn overflowing_credit_leaves_ledger_untouched() {
        let mut ledger = BalanceLedger::from_balances(Balances::from([(uid("rich"), u64::MAX - 1)]));
        let err = ledger.credit(&uid("rich"), amount(2)).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(msg) if msg.contains("overflow")));
        assert_eq!(ledger.balances().get(&uid("rich")), Some(&(u64::MAX - 1)));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: credit yields `b + a` exactly.
        #[test]
        fn credit_adds_exactly(b in 0u64..=(u32::MAX as u64), a in 1i64..=(u32::MAX as i64)) {
            let mut ledger = BalanceLedger::from_balances(Balances::from([(uid("u"), b)]));
            let change = ledger.credit(&uid("u"), amount(a)).unwrap();
            prop_assert_eq!(change.current, b + a as u64);
        }

        /// Property: debit yields `max(0, b - a)`.
        #[test]
        fn debit_clamps_at_zero(b in 0u64..1_000_000u64, a in 1i64..2_000_000i64) {
            let mut ledger = BalanceLedger::from_balances(Balances::from([(uid("u"), b)]));
            let change = ledger.debit(&uid("u"), amount(a));
            let expected = (b as i128 - a as i128).max(0) as u64;
            prop_assert_eq!(change.current, expected);
        }

        /// Property: any interleaving of operations keeps every balance
        /// consistent with a signed reference model clamped at zero.
        #[test]
        fn mixed_sequences_match_reference(ops in prop::collection::vec((any::<bool>(), 1i64..10_000i64), 1..40)) {
            let mut ledger = BalanceLedger::new();
            let mut model: i128 = 0;
            for (is_credit, a) in ops {
                if is_credit {
                    ledger.credit(&uid("u"), amount(a)).unwrap();
                    model += a as i128;
                } else {
                    ledger.debit(&uid("u"), amount(a));
                    model = (model - a as i128).max(0);
                }
            }
            prop_assert_eq!(ledger.balances().get(&uid("u")).copied(), Some(model as u64));
        }
    }
}
