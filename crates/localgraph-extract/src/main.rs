//! CLI entry point for localgraph-extract.
//!
//! Reads a JSON request from stdin and writes a JSON result to stdout, so it
//! can sit behind any estimation pipeline that emits adjacency matrices.

use std::io::Read;

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use localgraph_extract::handlers::{
    handle_cluster, handle_evaluate, handle_layers, handle_restrict,
};

#[derive(Parser)]
#[command(name = "localgraph-extract")]
#[command(about = "Radius-bounded extraction from a known dependency graph")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Pretty-print the JSON result.
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Local graph within a radius of a seed set (reads JSON from stdin).
    Restrict,
    /// Variables within a radius of one anchor (reads JSON from stdin).
    Cluster,
    /// Variables grouped by hop distance from the seeds (reads JSON from stdin).
    Layers,
    /// Edge recovery against a reference graph (reads JSON from stdin).
    Evaluate,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Restrict => print(&handle_restrict(read_request()?)?, cli.pretty),
        Command::Cluster => print(&handle_cluster(read_request()?)?, cli.pretty),
        Command::Layers => print(&handle_layers(read_request()?)?, cli.pretty),
        Command::Evaluate => print(&handle_evaluate(read_request()?)?, cli.pretty),
    }
}

fn read_request<T: DeserializeOwned>() -> anyhow::Result<T> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    Ok(serde_json::from_str(&input)?)
}

fn print<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
