//! Tally daemon: entry point for running the vote recorder.

mod config;
mod project;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tally_oracle::HttpBalanceOracle;
use tally_rpc::{RpcServer, RpcState};
use tally_store_lmdb::{check_data_dir, check_integrity, LmdbEnvironment};
use tally_types::{SystemClock, TokenAmount};
use tally_utils::{init_logging, LogFormat};
use tally_voting::VoteService;

use crate::config::ServiceConfig;

/// Named LMDB databases the environment may hold.
const MAX_DBS: u32 = 4;

#[derive(Parser)]
#[command(name = "tally-daemon", about = "Weighted single-ballot vote recorder")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "TALLY_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for project storage.
    #[arg(long, env = "TALLY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "TALLY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "TALLY_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Serve the vote API.
    Serve {
        /// Address to bind the HTTP API to.
        #[arg(long, env = "TALLY_LISTEN_ADDR")]
        listen: Option<SocketAddr>,

        /// Base URL of the balance oracle.
        #[arg(long, env = "TALLY_ORACLE_URL")]
        oracle_url: Option<String>,

        /// Minimum token balance needed to vote.
        #[arg(long, env = "TALLY_MIN_VOTE_TOKENS")]
        min_vote_tokens: Option<TokenAmount>,
    },

    /// Print the effective configuration as TOML.
    Config,

    /// Manage project definitions.
    Project {
        #[command(subcommand)]
        action: project::ProjectAction,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<ServiceConfig> {
    let mut config = match &cli.config {
        Some(path) => ServiceConfig::from_toml_file(path)?,
        None => ServiceConfig::default(),
    };
    config.apply_legacy_env(|key| std::env::var(key).ok())?;

    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Command::Serve {
        listen,
        oracle_url,
        min_vote_tokens,
    } = &cli.command
    {
        if let Some(addr) = listen {
            config.listen_addr = *addr;
        }
        if let Some(url) = oracle_url {
            config.oracle_base_url = url.clone();
        }
        if let Some(min) = min_vote_tokens {
            config.min_vote_tokens = Some(min.clone());
        }
    }
    config.validate()?;
    Ok(config)
}

fn open_store(config: &ServiceConfig) -> anyhow::Result<LmdbEnvironment> {
    check_data_dir(&config.data_dir).map_err(anyhow::Error::msg)?;
    let env = LmdbEnvironment::open(&config.data_dir, MAX_DBS, config.map_size)
        .with_context(|| format!("opening LMDB at {}", config.data_dir.display()))?;

    let report = check_integrity(env.env())?;
    if !report.is_healthy() {
        for err in &report.errors {
            tracing::error!("integrity: {err}");
        }
        anyhow::bail!(
            "project store failed integrity check ({} problems)",
            report.errors.len()
        );
    }
    tracing::info!(
        projects = report.projects_checked,
        votes = report.votes_checked,
        "project store checked"
    );
    Ok(env)
}

async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    let env = open_store(&config)?;
    let oracle = HttpBalanceOracle::new(config.oracle_config())?;

    match &config.min_vote_tokens {
        Some(min) => tracing::info!("minimum balance to vote: {min}"),
        None => tracing::info!("no minimum balance to vote"),
    }

    let service = VoteService::new(
        config.vote_service_config(),
        Arc::new(oracle),
        Arc::new(env.project_store()),
        Arc::new(SystemClock),
    );
    let state = Arc::new(RpcState::new(Arc::new(service)));
    let server = RpcServer::with_state(config.listen_addr, state);

    tracing::info!(
        "starting tally daemon (API:{}, oracle:{}, data:{})",
        config.listen_addr,
        config.oracle_base_url,
        config.data_dir.display()
    );
    server.start(shutdown_signal()).await?;
    tracing::info!("tally daemon exited cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl-C: {e}");
        return;
    }
    tracing::info!("shutdown signal received, stopping");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format, &config.log_level);

    match cli.command {
        Command::Serve { .. } => serve(config).await,
        Command::Config => {
            print!("{}", config.to_toml_string());
            Ok(())
        }
        Command::Project { action } => {
            let env = open_store(&config)?;
            project::run(action, &env.project_store())
        }
    }
}
