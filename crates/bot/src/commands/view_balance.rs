use std::sync::Arc;

use tracing::error;

use ledgerbot_infra::LedgerStore;

use super::{CommandDefinition, CommandHandler};
use crate::context::Invocation;
use crate::messages;
use crate::reply::Reply;

pub const NAME: &str = "viewbalance";

/// Shows the caller their own balance. Open to everyone.
pub struct ViewBalance {
    ledger: Arc<LedgerStore>,
}

impl ViewBalance {
    pub fn new(ledger: Arc<LedgerStore>) -> Self {
        Self { ledger }
    }
}

impl CommandHandler for ViewBalance {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition {
            name: NAME,
            description: "Check your current balance",
            options: Vec::new(),
        }
    }

    fn handle(&self, invocation: &Invocation) -> Reply {
        match self.ledger.get_balance(&invocation.caller.user.id) {
            Ok(balance) => Reply::private(messages::balance(balance)),
            Err(err) => {
                error!(command = NAME, error = %err, "error retrieving balance");
                Reply::private(messages::BALANCE_LOOKUP_FAILED)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerbot_auth::{Principal, UserRef};
    use ledgerbot_core::UserId;
    use ledgerbot_infra::InMemorySnapshotStore;

    use crate::context::CommandOptions;

    #[test]
    fn replies_privately_with_formatted_balance() {
        let snapshots = Arc::new(InMemorySnapshotStore::with_raw(r#"{"42": 12345}"#));
        let handler = ViewBalance::new(Arc::new(LedgerStore::load(snapshots)));
        let caller = Principal::new(UserRef::new(UserId::from(42u64), "Ann"), None);

        let reply = handler.handle(&Invocation::new(NAME, caller, CommandOptions::new()));

        assert_eq!(reply, Reply::private("💰 **Your Balance:** $12,345"));
    }
}
