//! Discord adapter: turns gateway interactions into [`Invocation`]s and sends
//! [`Reply`]s back through the interaction API.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context as _;
use async_trait::async_trait;
use serenity::all::{
    Command, CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    CreateInteractionResponse, CreateInteractionResponseFollowup, CreateInteractionResponseMessage,
    EventHandler, GuildId, Interaction, Ready, ResolvedValue, Role as GuildRole, RoleId, User,
};
use tracing::{error, info, warn};

use ledgerbot_auth::{Principal, Role, UserRef};
use ledgerbot_core::UserId;

use crate::commands::{CommandDefinition, OptionDefinition, OptionKind};
use crate::context::{CommandOptions, Invocation, OptionValue};
use crate::dispatcher::Dispatcher;
use crate::reply::{Reply, Responder};

/// Gateway event handler.
pub struct Gateway {
    dispatcher: Arc<Dispatcher>,
}

impl Gateway {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[serenity::async_trait]
impl EventHandler for Gateway {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "logged in");

        let commands = self
            .dispatcher
            .definitions()
            .iter()
            .map(create_command)
            .collect::<Vec<_>>();

        match Command::set_global_commands(&ctx.http, commands).await {
            Ok(registered) => info!(count = registered.len(), "slash commands deployed"),
            Err(err) => error!(error = %err, "error deploying slash commands"),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };

        let invocation = invocation_from(&ctx, &command).await;
        let responder = InteractionResponder::new(ctx, command);
        self.dispatcher.dispatch(&invocation, &responder).await;
    }
}

fn create_command(def: &CommandDefinition) -> CreateCommand {
    def.options
        .iter()
        .map(create_option)
        .fold(CreateCommand::new(def.name).description(def.description), |cmd, opt| {
            cmd.add_option(opt)
        })
}

fn create_option(def: &OptionDefinition) -> CreateCommandOption {
    let kind = match def.kind {
        OptionKind::User => CommandOptionType::User,
        OptionKind::Integer => CommandOptionType::Integer,
    };
    let option = CreateCommandOption::new(kind, def.name, def.description).required(def.required);
    match def.min_value {
        Some(min) => option.min_int_value(min),
        None => option,
    }
}

fn user_ref(user: &User) -> UserRef {
    UserRef::from_names(UserId::from(user.id.get()), user.global_name.as_deref(), &user.name)
}

async fn invocation_from(ctx: &Context, command: &CommandInteraction) -> Invocation {
    let roles = match (&command.member, command.guild_id) {
        (Some(member), Some(guild_id)) => role_names(ctx, guild_id, &member.roles).await,
        _ => None,
    };

    let mut options = CommandOptions::new();
    for option in command.data.options() {
        let value = match option.value {
            ResolvedValue::User(user, _) => OptionValue::User(user_ref(user)),
            ResolvedValue::Integer(n) => OptionValue::Integer(n),
            _ => continue,
        };
        options.insert(option.name, value);
    }

    Invocation::new(
        command.data.name.clone(),
        Principal::new(user_ref(&command.user), roles),
        options,
    )
}

/// Resolve the member's role ids to display names, from the gateway cache when
/// the guild is cached and over HTTP otherwise. `None` on lookup failure,
/// which the permission check treats as "no roles".
async fn role_names(ctx: &Context, guild_id: GuildId, role_ids: &[RoleId]) -> Option<Vec<Role>> {
    let cached = guild_id
        .to_guild_cached(&ctx.cache)
        .map(|guild| names_of(&guild.roles, role_ids));
    if cached.is_some() {
        return cached;
    }

    match guild_id.roles(&ctx.http).await {
        Ok(guild_roles) => Some(names_of(&guild_roles, role_ids)),
        Err(err) => {
            warn!(guild_id = %guild_id, error = %err, "failed to resolve member roles");
            None
        }
    }
}

fn names_of(guild_roles: &HashMap<RoleId, GuildRole>, role_ids: &[RoleId]) -> Vec<Role> {
    role_ids
        .iter()
        .filter_map(|id| guild_roles.get(id))
        .map(|r| Role::new(r.name.clone()))
        .collect()
}

/// [`Responder`] over one command interaction.
pub struct InteractionResponder {
    ctx: Context,
    interaction: CommandInteraction,
    replied: AtomicBool,
}

impl InteractionResponder {
    pub fn new(ctx: Context, interaction: CommandInteraction) -> Self {
        Self {
            ctx,
            interaction,
            replied: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Responder for InteractionResponder {
    async fn reply(&self, reply: Reply) -> anyhow::Result<()> {
        let private = reply.is_private();
        let message = CreateInteractionResponseMessage::new()
            .content(reply.content)
            .ephemeral(private);

        self.interaction
            .create_response(&self.ctx.http, CreateInteractionResponse::Message(message))
            .await
            .context("failed to send interaction response")?;
        self.replied.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn follow_up(&self, reply: Reply) -> anyhow::Result<()> {
        let private = reply.is_private();
        let message = CreateInteractionResponseFollowup::new()
            .content(reply.content)
            .ephemeral(private);

        self.interaction
            .create_followup(&self.ctx.http, message)
            .await
            .context("failed to send follow-up message")?;
        Ok(())
    }

    fn has_replied(&self) -> bool {
        self.replied.load(Ordering::SeqCst)
    }
}
