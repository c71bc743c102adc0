use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use net_orchestrator::config::Config;
use net_orchestrator::inventory::load_inventory;
use net_orchestrator::labs::cli;
use net_orchestrator::reachability::run_ping_check;

/// Ping every inventory device once
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// YAML inventory with a top-level `devices` list [default: data/devices.yaml]
    #[arg(long)]
    inventory: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    cli::init_logging();
    let args = Args::parse();
    let cfg = Config::load();

    let path = args.inventory.unwrap_or_else(|| cfg.data_path("devices.yaml"));
    let devices = load_inventory(&path).with_context(|| format!("loading inventory {}", path.display()))?;
    let ips: Vec<String> = devices.into_iter().map(|d| d.ip).collect();

    run_ping_check(&ips, &mut std::io::stdout().lock()).await
}
