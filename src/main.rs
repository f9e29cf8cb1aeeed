//! dicecream - dice pool rolling service

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dicecream::dice::RollMode;
use dicecream::{Config, Server};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Dice pool rolling service
#[derive(Parser, Debug)]
#[command(name = "dicecream", version, about = "Serve a dice pool over HTTP and WebSocket")]
struct Args {
    /// Config file (defaults to ./dicecream.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Seed for reproducible rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Starting pool, e.g. "1d6+2d10"
    #[arg(long)]
    pool: Option<String>,

    /// Most dice a single heap may hold
    #[arg(long)]
    max_dice: Option<u32>,

    /// Never roll the highest face, like the old dice widget
    #[arg(long)]
    legacy_rolls: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dicecream=info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Load config, CLI flags win
    let mut config = Config::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(pool) = args.pool {
        config.default_pool = pool;
    }
    if let Some(max_dice) = args.max_dice {
        config.max_dice_per_heap = max_dice;
    }
    if args.legacy_rolls {
        config.roll_mode = RollMode::Legacy;
    }

    // Create and run server
    let server = Arc::new(Server::new(config)?);

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            signal_server.shutdown();
        }
    });

    server.run().await?;

    Ok(())
}
