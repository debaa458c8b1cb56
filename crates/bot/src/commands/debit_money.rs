use std::sync::Arc;

use tracing::{debug, error};

use ledgerbot_auth::{Role, authorize};
use ledgerbot_core::Amount;
use ledgerbot_infra::{DebitOutcome, LedgerStore};

use super::{AMOUNT_OPTION, CommandDefinition, CommandHandler, USER_OPTION, target_and_amount_options};
use crate::context::Invocation;
use crate::messages;
use crate::reply::Reply;

pub const NAME: &str = "debitmoney";

/// Removes from a user's balance. Requires the staff role.
///
/// Refuses debits larger than the current balance instead of relying on the
/// ledger's clamp to zero. The check and the debit are one ledger operation.
pub struct DebitMoney {
    ledger: Arc<LedgerStore>,
    staff_role: Role,
}

impl DebitMoney {
    pub fn new(ledger: Arc<LedgerStore>, staff_role: Role) -> Self {
        Self { ledger, staff_role }
    }

    fn try_handle(&self, invocation: &Invocation) -> anyhow::Result<Reply> {
        if let Err(denied) = authorize(Some(&invocation.caller), &self.staff_role) {
            debug!(command = NAME, reason = %denied, "debit rejected");
            return Ok(Reply::private(messages::access_denied(&self.staff_role)));
        }

        let target = invocation.options.user(USER_OPTION)?;
        let Ok(amount) = Amount::new(invocation.options.integer(AMOUNT_OPTION)?) else {
            return Ok(Reply::private(messages::INVALID_AMOUNT));
        };

        let new_balance = match self.ledger.try_debit(&target.id, amount)? {
            DebitOutcome::Debited { new_balance } => new_balance,
            DebitOutcome::Insufficient { available } => {
                debug!(command = NAME, available, requested = amount.get(), "insufficient funds");
                return Ok(Reply::private(messages::insufficient_funds(
                    &target.display_name,
                    available,
                    amount.get(),
                )));
            }
        };

        Ok(Reply::public(messages::debited(
            &target.display_name,
            amount.get(),
            new_balance,
            &invocation.caller.user.display_name,
        )))
    }
}

impl CommandHandler for DebitMoney {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition {
            name: NAME,
            description: "Remove money from a user's account (Staff only)",
            options: target_and_amount_options(
                "The user to remove money from",
                "Amount of money to remove",
            ),
        }
    }

    fn handle(&self, invocation: &Invocation) -> Reply {
        self.try_handle(invocation).unwrap_or_else(|err| {
            error!(command = NAME, error = ?err, "error processing debit");
            Reply::private(messages::TRANSACTION_FAILED)
        })
    }
}
