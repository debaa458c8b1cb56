use std::sync::Arc;

use tracing::{debug, error};

use ledgerbot_auth::{Role, authorize};
use ledgerbot_core::Amount;
use ledgerbot_infra::LedgerStore;

use super::{AMOUNT_OPTION, CommandDefinition, CommandHandler, USER_OPTION, target_and_amount_options};
use crate::context::Invocation;
use crate::messages;
use crate::reply::Reply;

pub const NAME: &str = "creditmoney";

/// Adds to a user's balance. Requires the staff role.
pub struct CreditMoney {
    ledger: Arc<LedgerStore>,
    staff_role: Role,
}

impl CreditMoney {
    pub fn new(ledger: Arc<LedgerStore>, staff_role: Role) -> Self {
        Self { ledger, staff_role }
    }

    fn try_handle(&self, invocation: &Invocation) -> anyhow::Result<Reply> {
        if let Err(denied) = authorize(Some(&invocation.caller), &self.staff_role) {
            debug!(command = NAME, reason = %denied, "credit rejected");
            return Ok(Reply::private(messages::access_denied(&self.staff_role)));
        }

        let target = invocation.options.user(USER_OPTION)?;
        let Ok(amount) = Amount::new(invocation.options.integer(AMOUNT_OPTION)?) else {
            return Ok(Reply::private(messages::INVALID_AMOUNT));
        };

        let new_balance = self.ledger.credit(&target.id, amount)?;

        Ok(Reply::public(messages::credited(
            &target.display_name,
            amount.get(),
            new_balance,
            &invocation.caller.user.display_name,
        )))
    }
}

impl CommandHandler for CreditMoney {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition {
            name: NAME,
            description: "Add money to a user's account (Staff only)",
            options: target_and_amount_options("The user to add money to", "Amount of money to add"),
        }
    }

    fn handle(&self, invocation: &Invocation) -> Reply {
        self.try_handle(invocation).unwrap_or_else(|err| {
            error!(command = NAME, error = ?err, "error processing credit");
            Reply::private(messages::TRANSACTION_FAILED)
        })
    }
}
