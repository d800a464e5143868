//! Tài/Xỉu Round Prediction Bot
//!
//! Polls a round-history feed, predicts the next session's outcome,
//! and tracks daily accuracy over an HTTP API.

use clap::{Parser, Subcommand};
use std::sync::Arc;
use taixiu_bot::{
    client::{HistoryClient, HistorySource},
    config::Config,
    engine::PredictionEngine,
    server::{start_server, AppState},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "taixiu-bot")]
#[command(about = "Prediction service for the Tài/Xỉu round feed")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the prediction API
    Run,
    /// Run a single lookup-and-predict cycle and print the payload
    Predict,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Run => run(config).await,
        Commands::Predict => predict_once(config).await,
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    tracing::info!("starting Tài/Xỉu prediction bot");

    let engine = Arc::new(PredictionEngine::new(config.engine)?);
    let source = Arc::new(HistoryClient::new(&config.upstream)?);

    // eager midnight reset; the lazy per-request check is the backstop
    let _reset = engine.clone().spawn_daily_reset();

    let state = Arc::new(AppState { engine, source });
    start_server(state, &config.server.host, config.server.port).await?;
    Ok(())
}

async fn predict_once(config: Config) -> anyhow::Result<()> {
    let engine = PredictionEngine::new(config.engine)?;
    let client = HistoryClient::new(&config.upstream)?;

    let history = client.fetch().await?;
    let response = engine.run_cycle(&history);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
