// src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

use contentbot::api::http_router;
use contentbot::bot::console;
use contentbot::config::CONFIG;
use contentbot::state::create_app_state;
use contentbot::tasks::{TaskManager, metrics::TaskMetrics, run_eviction};

#[derive(Parser)]
#[command(name = "contentbot")]
#[command(about = "Meme rotation and no-repeat joke bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server and the eviction sweep (default)
    Serve,
    /// Chat with the bot on stdin/stdout
    Console {
        /// User id the console session acts as
        #[arg(short, long, default_value = "console")]
        user: String,
    },
    /// Run one eviction sweep against the configured store and exit
    Evict,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(CONFIG.log_level())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Console { user } => run_console(&user).await,
        Command::Evict => evict_once().await,
    }
}

async fn serve() -> Result<()> {
    info!("Starting contentbot");
    if !CONFIG.admin_enabled() {
        info!("ADMIN_KEY not set - uploads will be rejected");
    }

    let app_state = Arc::new(create_app_state(&CONFIG).await?);

    let mut tasks = TaskManager::new(app_state.rotator.clone(), app_state.engine.eviction_interval);
    tasks.start();

    let app = http_router(app_state);

    let bind_address = CONFIG.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Server running on http://{}", bind_address);

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    tasks.shutdown().await;
    Ok(())
}

async fn run_console(user: &str) -> Result<()> {
    let app_state = create_app_state(&CONFIG).await?;
    info!("Console session as user '{}' - type /quit to leave", user);

    let stdin = BufReader::new(tokio::io::stdin());
    console::run(&app_state.commands, user, stdin, tokio::io::stdout()).await
}

async fn evict_once() -> Result<()> {
    if !CONFIG.durable() {
        warn!("STATE_BACKEND is not durable; a one-shot sweep would only see an empty pool");
        anyhow::bail!("`evict` requires STATE_BACKEND=sqlite");
    }

    let app_state = create_app_state(&CONFIG).await?;
    let removed = run_eviction(&app_state.rotator, &TaskMetrics::new()).await;
    info!("Evicted {} expired items", removed);
    Ok(())
}
