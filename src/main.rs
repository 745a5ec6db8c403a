use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod boosts;
mod config;
mod discord;
mod embed;
mod error;
mod history;
mod nitrado;
mod reconcile;
mod runner;
mod summary;

#[cfg(test)]
mod testing;

use discord::DiscordClient;
use history::SqliteHistoryStore;
use nitrado::NitradoClient;
use runner::{RunMode, Runner};

#[derive(Debug, Parser)]
#[command(name = "boostbot", version, about = "Announces game server boosts in a Discord channel")]
struct Cli {
    /// Path of the TOML configuration file.
    #[arg(long, env = "BOOSTBOT_CONFIG", default_value = "./config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Announce boosts that have not been announced yet.
    Notify {
        /// Stop after the first server with new boosts.
        #[arg(long)]
        slow_mode: bool,
    },
    /// Rewrite the summary message with every server's boosts.
    Summary,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("boostbot=info,reqwest=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

async fn notify(cfg: &config::Config, mode: RunMode) -> Result<Value> {
    let source = NitradoClient::new(&cfg.nitrado)
        .context("Failed to create NITRAPI client")?;
    let notifier = DiscordClient::new(&cfg.discord)
        .context("Failed to create Discord client")?;
    let history = SqliteHistoryStore::open(Path::new(&cfg.database_path))
        .context("Unable to open boost history")?;

    let summary = Runner::new(&source, &notifier, &history)
        .run(&cfg.targets(), mode)
        .await;

    Ok(serde_json::to_value(summary)?)
}

async fn publish_summary(cfg: &config::Config) -> Result<Value> {
    let source = NitradoClient::new(&cfg.nitrado)
        .context("Failed to create NITRAPI client")?;
    let notifier = DiscordClient::new(&cfg.discord)
        .context("Failed to create Discord client")?;

    let report = summary::publish_summary(&source, &notifier, &cfg.targets())
        .await
        .context("Failed to publish boost summary")?;

    Ok(serde_json::to_value(report)?)
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let cfg = config::load_config(&cli.config)
        .context("Unable to load configuration")?;

    tracing::info!(servers = cfg.targets().len(), "Starting BoostBot");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let output = runtime.block_on(async {
        match cli.command {
            Command::Notify { slow_mode: true } => notify(&cfg, RunMode::SlowMode).await,
            Command::Notify { slow_mode: false } => notify(&cfg, RunMode::Normal).await,
            Command::Summary => publish_summary(&cfg).await,
        }
    })?;

    println!("{}", output);

    Ok(())
}
