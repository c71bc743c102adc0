use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use net_orchestrator::config::Config;
use net_orchestrator::connection::SshConnector;
use net_orchestrator::inventory::load_inventory;
use net_orchestrator::labs::{cli, show, LabContext};
use net_orchestrator::models::Credentials;
use net_orchestrator::reachability::check_reachability;

const COMMANDS: [&str; 2] = [
    "show ip interface brief | exclude unassigned",
    "show version | include Cisco IOS XE Software, Version",
];

/// Reachability check, then two show commands on every inventory device
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// YAML inventory with a top-level `devices` list [default: data/devices.yaml]
    #[arg(long)]
    inventory: Option<PathBuf>,
    /// Login for devices whose inventory entry has none
    #[command(flatten)]
    credentials: cli::PromptedCredentialArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    cli::init_logging();
    let args = Args::parse();
    let cfg = Config::load();

    let path = args.inventory.unwrap_or_else(|| cfg.data_path("devices.yaml"));
    let devices = load_inventory(&path).with_context(|| format!("loading inventory {}", path.display()))?;

    let needs_login = devices
        .iter()
        .any(|d| d.username.as_deref().unwrap_or("").is_empty() || d.password.as_deref().unwrap_or("").is_empty());
    let credentials = if needs_login {
        args.credentials.resolve()?
    } else {
        Credentials::default()
    };

    let mut out = std::io::stdout().lock();
    writeln!(out, "=== Reachability Check ===")?;
    check_reachability(&devices, &mut out).await?;

    writeln!(out, "\n=== Running Show Commands ===")?;
    let commands: Vec<String> = COMMANDS.iter().map(|c| c.to_string()).collect();
    let connector = SshConnector;
    let ctx = LabContext::new(&connector, credentials, &cfg);
    show::run_inventory_commands(&ctx, &devices, &commands, &mut out).await
}
