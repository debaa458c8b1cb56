//! Process wiring: ledger, autosave, dispatcher and gateway client.

use std::sync::Arc;

use anyhow::Context as _;
use serenity::all::{Client, GatewayIntents};
use tracing::{error, info};

use ledgerbot_auth::Role;
use ledgerbot_infra::{BotConfig, JsonFileStore, LedgerStore, SnapshotWorker};

use crate::dispatcher::Dispatcher;
use crate::gateway::Gateway;

/// Run the bot until the gateway stops (Ctrl-C or a fatal client error).
///
/// On the way out the autosave worker is stopped and one last snapshot is
/// written.
pub async fn run(config: BotConfig) -> anyhow::Result<()> {
    let ledger = Arc::new(LedgerStore::load(Arc::new(JsonFileStore::new(&config.ledger_path))));

    let dispatcher = Arc::new(Dispatcher::with_ledger_commands(
        ledger.clone(),
        Role::new(config.staff_role_name.clone()),
    ));

    let autosave = SnapshotWorker::new(ledger.clone(), config.autosave_interval).start();

    let mut client = Client::builder(&config.discord_token, GatewayIntents::GUILDS)
        .event_handler(Gateway::new(dispatcher))
        .await
        .context("failed to build gateway client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            shard_manager.shutdown_all().await;
        }
    });

    let outcome = client.start().await.context("gateway client stopped");

    let stats = autosave.shutdown().await;
    info!(
        written = stats.snapshots_written,
        failed = stats.snapshots_failed,
        "autosave stopped"
    );
    if let Err(err) = ledger.save() {
        error!(error = %err, "final ledger save failed");
    }

    outcome
}
