//! Routes invocations to handlers by command name.
//!
//! The dispatcher is the last-resort error boundary: anything a handler lets
//! escape is logged and answered with a generic private message, as a
//! follow-up when the handler already replied.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context as _;
use tracing::{Instrument, Span, error, info_span, warn};

use ledgerbot_auth::Role;
use ledgerbot_infra::LedgerStore;

use crate::commands::{CommandDefinition, CommandHandler, CreditMoney, DebitMoney, ViewBalance};
use crate::context::Invocation;
use crate::messages;
use crate::reply::{Reply, Responder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler ran and its reply was delivered.
    Handled,
    /// No handler is registered under the invocation's name; nothing was sent.
    UnknownCommand,
    /// The handler failed; the fallback message was attempted.
    Failed,
}

#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<&'static str, Arc<dyn CommandHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher with the three ledger commands registered.
    pub fn with_ledger_commands(ledger: Arc<LedgerStore>, staff_role: Role) -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(ViewBalance::new(ledger.clone()));
        dispatcher.register(CreditMoney::new(ledger.clone(), staff_role.clone()));
        dispatcher.register(DebitMoney::new(ledger, staff_role));
        dispatcher
    }

    /// Register `handler` under its definition's name, replacing any previous
    /// handler of that name.
    pub fn register<H>(&mut self, handler: H)
    where
        H: CommandHandler + 'static,
    {
        let name = handler.definition().name;
        self.handlers.insert(name, Arc::new(handler));
    }

    /// Definitions of every registered command, sorted by name.
    pub fn definitions(&self) -> Vec<CommandDefinition> {
        let mut defs: Vec<_> = self.handlers.values().map(|h| h.definition()).collect();
        defs.sort_by_key(|d| d.name);
        defs
    }

    pub async fn dispatch(&self, invocation: &Invocation, responder: &dyn Responder) -> DispatchOutcome {
        let Some(handler) = self.handlers.get(invocation.command.as_str()) else {
            error!(command = %invocation.command, "no command matching name was found");
            return DispatchOutcome::UnknownCommand;
        };

        let span = info_span!(
            "command",
            invocation_id = %invocation.id,
            command = %invocation.command,
            user_id = %invocation.caller.user.id,
        );

        async {
            let Err(err) = execute(handler.clone(), invocation, responder).await else {
                return DispatchOutcome::Handled;
            };

            error!(error = ?err, "error executing command");

            let fallback = Reply::private(messages::COMMAND_FAILED);
            let sent = if responder.has_replied() {
                responder.follow_up(fallback).await
            } else {
                responder.reply(fallback).await
            };
            if let Err(err) = sent {
                warn!(error = ?err, "failed to deliver error message");
            }

            DispatchOutcome::Failed
        }
        .instrument(span)
        .await
    }
}

/// Decide the reply off the async workers, then send it.
async fn execute(
    handler: Arc<dyn CommandHandler>,
    invocation: &Invocation,
    responder: &dyn Responder,
) -> anyhow::Result<()> {
    let span = Span::current();
    let decider = handler.clone();
    let owned = invocation.clone();
    let reply = tokio::task::spawn_blocking(move || span.in_scope(|| decider.handle(&owned)))
        .await
        .context("command handler panicked")?;

    handler.respond(reply, responder).await
}
