//! Value objects: equality by value, not identity.

use core::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A strictly positive quantity of currency moved by a credit or debit.
///
/// The chat platform delivers integer options as signed 64-bit values; the
/// only way in from there is [`Amount::new`], which rejects zero and negatives.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Amount(NonZeroU64);

impl Amount {
    pub fn new(raw: i64) -> Result<Self, DomainError> {
        u64::try_from(raw)
            .ok()
            .and_then(NonZeroU64::new)
            .map(Self)
            .ok_or_else(|| DomainError::validation("amount must be a positive integer"))
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<u64> for Amount {
    type Error = DomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        NonZeroU64::new(value)
            .map(Self)
            .ok_or_else(|| DomainError::validation("amount must be a positive integer"))
    }
}

impl From<Amount> for u64 {
    fn from(value: Amount) -> Self {
        value.get()
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_and_negative_amounts_are_rejected() {
        assert!(matches!(Amount::new(0), Err(DomainError::Validation(_))));
        assert!(matches!(Amount::new(-5), Err(DomainError::Validation(_))));
        assert!(matches!(Amount::new(i64::MIN), Err(DomainError::Validation(_))));
    }

    proptest! {
        #[test]
        fn positive_amounts_keep_their_value(raw in 1i64..=i64::MAX) {
            let amount = Amount::new(raw).unwrap();
            prop_assert_eq!(amount.get(), raw as u64);
        }
    }
}
