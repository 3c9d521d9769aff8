//! Cascade LFG Server
//!
//! Watches the world-state feed for cascade missions and runs a
//! cross-server squad board for them through signed chat interactions.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

#[cfg(test)]
mod tests;

use cascade_core::entities::ServerRegistration;
use cascade_core::events::command_channel;
use cascade_core::framework::{StateStore, StoreError};
use cascade_core::processors::{Coordinator, CoordinatorHandle, Poller};
use cascade_core::store::JsonFileStore;
use cascade_sdk::client::{DiscordClient, WorldStateClient};
use cascade_sdk::objects::GuildId;
use clap::Parser;
use config::{ConfigLoader, get_bot_token};
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Cascade LFG - cross-server squad finder for cascade missions
#[derive(Parser, Debug)]
#[command(name = "cascade-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "CASCADE_CONFIG", default_value = "./cascade-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting cascade-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // The token is required before anything touches the network
    let token = get_bot_token().map_err(|e| {
        tracing::error!("DISCORD_TOKEN environment variable not set");
        e
    })?;

    let listen_addr = loaded_config.listen;
    let seeds = loaded_config.seeds.clone();
    let api_base = loaded_config.discord.api_base.clone();

    // Open the state document
    tracing::info!("Opening state file {:?}", loaded_config.storage_path);
    let store = Arc::new(JsonFileStore::open(&loaded_config.storage_path).await.map_err(|e| {
        tracing::error!("Failed to open state file: {}", e);
        e
    })?);
    seed_servers(store.as_ref(), seeds).await?;

    let shared_config = loaded_config.into_shared();

    // Spawn the coordinator and the poller
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (commands_tx, commands_rx) = command_channel();
    let coordinator = CoordinatorHandle::new(commands_tx);

    let platform = Arc::new(DiscordClient::new(api_base, token));
    let coordinator_task = tokio::spawn(
        Coordinator::new(store.clone(), platform).run(shutdown_rx.clone(), commands_rx),
    );

    let poller = Poller::new(
        Arc::new(WorldStateClient::new()),
        store.clone(),
        coordinator.clone(),
    );
    let poller_task = tokio::spawn(poller.run(
        shutdown_rx,
        shared_config.poller.clone(),
        shared_config.poller.subscribe(),
    ));

    // Create application state
    let state = AppState::new(shared_config, store.clone(), coordinator);

    // Spawn config reload handler (listens for SIGHUP)
    let reload_notify = spawn_config_reload_handler(state.clone(), config_loader);

    // Build the router and run the server
    let router = build_router(state);
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Stop background work; the poller lets an in-flight fetch finish
    reload_notify.notify_one();
    let _ = shutdown_tx.send(true);
    if let Err(e) = poller_task.await {
        tracing::error!("Poller task failed: {}", e);
    }
    if let Err(e) = coordinator_task.await {
        tracing::error!("Coordinator task failed: {}", e);
    }

    // Final flush of the state document
    tracing::info!("Flushing state file...");
    if let Err(e) = store.close().await {
        tracing::error!("Failed to flush state file: {}", e);
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Register configured board channels that the state document does not
/// know yet. Runs before the coordinator starts, so it is the only writer.
async fn seed_servers(
    store: &dyn StateStore,
    seeds: Vec<(GuildId, ServerRegistration)>,
) -> Result<(), StoreError> {
    if seeds.is_empty() {
        return Ok(());
    }
    let mut document = store.load().await?;
    let mut added = 0usize;
    for (guild_id, registration) in seeds {
        if !document.servers.contains_key(&guild_id) {
            document.servers.insert(guild_id, registration);
            added += 1;
        }
    }
    if added > 0 {
        tracing::info!("Seeded {} server registrations from config", added);
        store.save(document).await?;
    }
    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cascade_core=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
