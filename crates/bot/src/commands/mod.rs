//! Slash-command handlers.
//!
//! Each handler decides its reply synchronously ([`CommandHandler::handle`])
//! and sends it exactly once ([`CommandHandler::respond`]). `handle` touches the
//! ledger and its file, so the dispatcher runs it on the blocking pool.
//! Rejections and internal failures are turned into replies inside `handle`;
//! only a failure to deliver the reply escapes to the dispatcher.

pub mod credit_money;
pub mod debit_money;
pub mod view_balance;

use async_trait::async_trait;

use crate::context::Invocation;
use crate::reply::{Reply, Responder};

pub use credit_money::CreditMoney;
pub use debit_money::DebitMoney;
pub use view_balance::ViewBalance;

/// Name of the target-user option on privileged commands.
pub const USER_OPTION: &str = "user";
/// Name of the amount option on privileged commands.
pub const AMOUNT_OPTION: &str = "amount";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    User,
    Integer,
}

/// Declared option of a command, as registered with the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: OptionKind,
    pub required: bool,
    /// Lower bound enforced by the platform UI; handlers re-validate anyway.
    pub min_value: Option<u64>,
}

/// Declared shape of a command, as registered with the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub options: Vec<OptionDefinition>,
}

/// Options shared by the credit and debit commands.
fn target_and_amount_options(user_help: &'static str, amount_help: &'static str) -> Vec<OptionDefinition> {
    vec![
        OptionDefinition {
            name: USER_OPTION,
            description: user_help,
            kind: OptionKind::User,
            required: true,
            min_value: None,
        },
        OptionDefinition {
            name: AMOUNT_OPTION,
            description: amount_help,
            kind: OptionKind::Integer,
            required: true,
            min_value: Some(1),
        },
    ]
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    fn definition(&self) -> CommandDefinition;

    /// Decide the reply for `invocation`. Never fails.
    fn handle(&self, invocation: &Invocation) -> Reply;

    /// Send the reply decided by [`handle`](Self::handle).
    async fn respond(&self, reply: Reply, responder: &dyn Responder) -> anyhow::Result<()> {
        responder.reply(reply).await
    }
}
