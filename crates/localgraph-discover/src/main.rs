//! CLI entry point for localgraph-discover.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use localgraph_core::{DataMatrix, Radius, TargetSet};

use localgraph_discover::config::DiscoverConfig;
use localgraph_discover::oracle::ConfiguredOracle;
use localgraph_discover::{AdmissionPolicy, DiscoverError, Discovery, FrontierEngine};

#[derive(Parser)]
#[command(name = "localgraph-discover")]
#[command(about = "Radius-bounded local graph discovery around target variables")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: localgraph).
    #[arg(short, long, default_value = "localgraph", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Start a discovery run and print the result as JSON.
    Run {
        /// CSV data matrix with a header row of variable names.
        #[arg(short, long)]
        data: PathBuf,

        /// Target variable, by name or column index. Repeatable.
        #[arg(short, long = "target", required = true)]
        targets: Vec<String>,

        /// Number of BFS layers to explore (overrides config).
        #[arg(short, long, allow_negative_numbers = true)]
        radius: Option<i64>,

        /// Edge-admission policy (overrides config).
        #[arg(short, long, value_enum)]
        policy: Option<AdmissionPolicy>,

        /// Where to write the checkpoint if the run fails or times out.
        #[arg(long)]
        checkpoint: Option<PathBuf>,

        /// Wall-clock bound for this run in seconds (overrides config).
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Continue a run from a checkpoint.
    Resume {
        #[arg(short, long)]
        data: PathBuf,

        /// Checkpoint written by a failed or interrupted run. Rewritten if
        /// this run stops early again.
        #[arg(long)]
        checkpoint: PathBuf,

        /// Radius to continue to (default: the checkpoint's radius).
        #[arg(short, long, allow_negative_numbers = true)]
        radius: Option<i64>,

        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = DiscoverConfig::load(&cli.config)?;

    match cli.command {
        Command::Run {
            data,
            targets,
            radius,
            policy,
            checkpoint,
            timeout_secs,
        } => {
            if let Some(r) = radius {
                config.radius = r;
            }
            if let Some(p) = policy {
                config.policy = p;
            }
            if timeout_secs.is_some() {
                config.run_timeout_secs = timeout_secs;
            }

            let radius = config.radius()?;
            let matrix = Arc::new(DataMatrix::from_csv_path(&data)?);
            let targets = resolve_targets(&matrix, &targets)?;
            let engine = build_engine(&config, &data)?;

            tracing::info!(
                data = %data.display(),
                variables = matrix.n_variables(),
                observations = matrix.n_observations(),
                targets = ?targets.as_set(),
                radius = %radius,
                policy = %config.policy,
                "Starting discovery"
            );

            let result = engine
                .discover(matrix, &targets, radius, config.policy)
                .await;
            report(result, checkpoint.as_deref())
        }
        Command::Resume {
            data,
            checkpoint,
            radius,
            timeout_secs,
        } => {
            if timeout_secs.is_some() {
                config.run_timeout_secs = timeout_secs;
            }

            let radius = radius.map(Radius::new).transpose()?;
            let matrix = Arc::new(DataMatrix::from_csv_path(&data)?);
            let saved = Discovery::load_checkpoint(&checkpoint)?;
            let engine = build_engine(&config, &data)?;

            let result = engine.resume(matrix, saved, radius).await;
            report(result, Some(&checkpoint))
        }
    }
}

fn build_engine(
    config: &DiscoverConfig,
    data_path: &Path,
) -> anyhow::Result<FrontierEngine<ConfiguredOracle>> {
    let oracle = ConfiguredOracle::from_config(&config.oracle, data_path)?;
    tracing::info!(oracle = oracle.kind(), "Oracle configured");

    let mut engine = FrontierEngine::new(oracle, config.params.clone())
        .with_settings(config.engine_settings());
    if let Some(dir) = &config.record_dir {
        engine = engine.with_record_dir(dir);
    }
    Ok(engine)
}

fn resolve_targets(matrix: &DataMatrix, keys: &[String]) -> anyhow::Result<TargetSet> {
    let ids = keys
        .iter()
        .map(|key| matrix.resolve(key))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TargetSet::new(ids)?)
}

/// Print the discovery as JSON; write the checkpoint when the run stopped
/// early.
fn report(
    result: Result<Discovery, DiscoverError>,
    checkpoint: Option<&Path>,
) -> anyhow::Result<()> {
    match result {
        Ok(discovery) => {
            if let Some(interruption) = &discovery.interruption {
                tracing::warn!(
                    layer = interruption.layer,
                    cancelled = interruption.cancelled.len(),
                    "Run interrupted by deadline"
                );
                save_checkpoint(&discovery, checkpoint)?;
            }
            println!("{}", serde_json::to_string_pretty(&discovery)?);
            Ok(())
        }
        Err(e) => {
            if let Some(partial) = e.partial() {
                save_checkpoint(partial, checkpoint)?;
            }
            Err(e.into())
        }
    }
}

fn save_checkpoint(discovery: &Discovery, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            discovery.save_checkpoint(path)?;
            tracing::info!(
                path = %path.display(),
                answered = discovery.ledger.answered_count(),
                "Checkpoint saved; continue with `localgraph-discover resume`"
            );
        }
        None => tracing::warn!("No --checkpoint given, partial results are not saved"),
    }
    Ok(())
}
