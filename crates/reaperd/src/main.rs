//! reaperd — the Reaper daemon.
//!
//! Wires configuration, a fleet backend and the terminator together:
//! - `run` performs one invocation and prints the outcomes as JSON
//! - `daemon` repeats the invocation on a fixed interval until Ctrl-C
//! - `check-config` validates `reaper.toml` and prints the effective config
//!
//! # Usage
//!
//! ```text
//! reaperd run --config /etc/reaper/reaper.toml
//! reaperd daemon --interval 24h
//! reaperd run --snapshot fleet.json --dry-run
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use reaper_core::{parse_duration, Backend, ReaperConfig};
use reaper_fleet::{DryRunMutator, FleetInventory, FleetMutator, StaticFleet};
use reaper_terminator::Terminator;
use tokio::sync::watch;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "reaperd",
    about = "Reaper: terminates the oldest healthy instance of tagged autoscaling groups",
    version
)]
struct Cli {
    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Args)]
struct FleetArgs {
    /// Path to reaper.toml. Built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read the fleet from a JSON snapshot instead of the configured backend.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Choose instances but do not terminate them.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single invocation and print its outcomes.
    Run {
        #[command(flatten)]
        fleet: FleetArgs,
    },
    /// Run invocations periodically until interrupted.
    Daemon {
        #[command(flatten)]
        fleet: FleetArgs,

        /// Time between invocations, overriding schedule.interval (e.g. "30m").
        #[arg(long)]
        interval: Option<String>,
    },
    /// Validate configuration and print the effective settings.
    CheckConfig {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Command::Run { fleet } => {
            let config = load_config(&fleet)?;
            run_once(&config).await
        }
        Command::Daemon { fleet, interval } => {
            let mut config = load_config(&fleet)?;
            if let Some(interval) = interval {
                config.schedule.interval = interval;
                config.validate()?;
            }
            run_daemon(&config).await
        }
        Command::CheckConfig { config } => {
            let config = read_config(config.as_deref())?;
            config.validate()?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,reaper=debug"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<ReaperConfig> {
    match path {
        Some(path) => ReaperConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(ReaperConfig::default()),
    }
}

/// Read the config file and apply command-line overrides.
fn load_config(args: &FleetArgs) -> anyhow::Result<ReaperConfig> {
    let mut config = read_config(args.config.as_deref())?;
    if let Some(snapshot) = &args.snapshot {
        config.fleet.backend = Backend::Snapshot;
        config.fleet.snapshot = Some(snapshot.clone());
    }
    if args.dry_run {
        config.fleet.dry_run = true;
    }
    config.validate()?;
    Ok(config)
}

async fn build_terminator(config: &ReaperConfig) -> anyhow::Result<Terminator> {
    let (inventory, mutator): (Arc<dyn FleetInventory>, Arc<dyn FleetMutator>) =
        match config.fleet.backend {
            Backend::Snapshot => {
                let path = config
                    .fleet
                    .snapshot
                    .as_deref()
                    .context("fleet.snapshot is required for the snapshot backend")?;
                let fleet = StaticFleet::from_snapshot_file(path).await?;
                info!(path = %path.display(), "using snapshot fleet");
                (Arc::new(fleet.clone()), Arc::new(fleet))
            }
            Backend::Aws => aws_backend(config).await?,
        };

    let mutator: Arc<dyn FleetMutator> = if config.fleet.dry_run {
        info!("dry run enabled, no instances will be terminated");
        Arc::new(DryRunMutator)
    } else {
        mutator
    };

    Ok(Terminator::new(inventory, mutator, config.tags.clone()))
}

#[cfg(feature = "aws")]
async fn aws_backend(
    config: &ReaperConfig,
) -> anyhow::Result<(Arc<dyn FleetInventory>, Arc<dyn FleetMutator>)> {
    let fleet = reaper_fleet::AwsFleet::from_env(config.fleet.region.clone()).await;
    info!(region = ?config.fleet.region, "using AWS fleet");
    Ok((Arc::new(fleet.clone()), Arc::new(fleet)))
}

#[cfg(not(feature = "aws"))]
async fn aws_backend(
    _config: &ReaperConfig,
) -> anyhow::Result<(Arc<dyn FleetInventory>, Arc<dyn FleetMutator>)> {
    anyhow::bail!(
        "reaperd was built without the \"aws\" feature; rebuild with --features aws \
         or set fleet.backend = \"snapshot\""
    )
}

async fn run_once(config: &ReaperConfig) -> anyhow::Result<()> {
    let terminator = build_terminator(config).await?;
    let outcomes = terminator.run().await?;
    println!("{}", serde_json::to_string_pretty(&outcomes)?);
    Ok(())
}

async fn run_daemon(config: &ReaperConfig) -> anyhow::Result<()> {
    let interval = parse_duration(&config.schedule.interval)?;
    let terminator = build_terminator(config).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move {
        terminator.run_every(interval, shutdown_rx).await;
    });

    tokio::signal::ctrl_c()
        .await
        .context("failed to install Ctrl-C handler")?;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);
    handle.await?;

    info!("reaperd stopped");
    Ok(())
}
