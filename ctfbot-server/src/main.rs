//! ctfbot server
//!
//! Serves CTFtime lookups and reaction polls to a chat gateway relay.

mod announcer;
mod api;
mod config;
mod render;
mod server;
mod shutdown;
mod state;

use announcer::DiscordAnnouncer;
use clap::Parser;
use config::ConfigLoader;
use ctfbot_core::poll::PollManager;
use ctfbot_core::votes::VoteStore;
use ctfbot_sdk::client::CtftimeClient;
use server::{build_router, run_server};
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// ctfbot - CTFtime lookups and participation polls
#[derive(Parser, Debug)]
#[command(name = "ctfbot-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "CTFBOT_CONFIG", default_value = "./ctfbot.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting ctfbot-server v{}", env!("CARGO_PKG_VERSION"));

    let config = ConfigLoader::new(&args.config, args.listen)
        .load()
        .inspect_err(|e| tracing::error!("Failed to load configuration: {}", e))?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let credentials = config
        .read_credentials()
        .inspect_err(|e| tracing::error!("Failed to read credentials: {}", e))?;

    let client = CtftimeClient::new(
        config.upstream_base_url.clone(),
        &config.user_agent,
        config.upstream_timeout,
    )?;
    let announcer = DiscordAnnouncer::new(
        credentials.webhook_url,
        config.discord_api_base.clone(),
        credentials.bot_token,
        config.upstream_timeout,
    )?;

    tracing::info!(path = ?config.votes_path, "Using vote file");
    let votes = Arc::new(VoteStore::new(config.votes_path.clone()));
    let polls = Arc::new(PollManager::new(votes.clone(), config.emojis.clone()));

    let state = AppState::new(Arc::new(client), votes, polls.clone(), Arc::new(announcer));
    let router = build_router(state);

    tracing::info!("Starting HTTP server on {}", config.listen);
    let result = run_server(router, config.listen).await;

    // Open polls stop collecting votes once the server is gone.
    polls.shutdown().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ctfbot_core=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
