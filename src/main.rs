//! Inventory API checker
//!
//! Runs the end-to-end check sequence against an inventory API server and
//! exits non-zero unless every expected step passed.

use std::path::PathBuf;

use clap::Parser;
use inventory_check::common::logging;
use inventory_check::{run_checks, Config};

#[derive(Parser)]
#[command(name = "inventory-check", about = "End-to-end checks for the inventory API")]
#[command(version, long_about = None)]
struct Cli {
    /// Base URL of the API server (default: http://localhost:5000)
    base_url: Option<String>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Print each response body and log requests
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_cli(cli.verbose);

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    if let Some(base_url) = cli.base_url {
        config.target.base_url = base_url;
    }
    if let Some(timeout) = cli.timeout {
        config.target.timeout_secs = timeout;
    }

    match run_checks(&config, cli.verbose).await {
        Ok(summary) => std::process::exit(summary.exit_code()),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
