use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use net_orchestrator::commands::{load_commands, ShowSelection};
use net_orchestrator::config::Config;
use net_orchestrator::connection::SshConnector;
use net_orchestrator::inventory::load_devices;
use net_orchestrator::labs::{cli, show, ErrorPolicy, LabContext};

/// Lab 6: show commands with per-device and per-command error handling
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[command(flatten)]
    credentials: cli::PromptedCredentialArgs,
    /// Path to CSV with device info [default: data/lab6-devices.csv]
    #[arg(long)]
    csv_path: Option<PathBuf>,
    /// Path to JSON with command definitions [default: data/show-commands.json]
    #[arg(long)]
    commands_json: Option<PathBuf>,
    #[command(flatten)]
    show: ShowSelection,
}

#[tokio::main]
async fn main() -> Result<()> {
    cli::init_logging();
    let args = Args::parse();
    let cfg = Config::load();
    let credentials = args.credentials.resolve()?;
    let mut out = std::io::stdout().lock();

    let csv_path = args.csv_path.unwrap_or_else(|| cfg.data_path("lab6-devices.csv"));
    let devices = load_devices(&csv_path, "--csv-path");
    if devices.is_empty() {
        writeln!(out, "No device entries loaded; nothing to do.")?;
        return Ok(());
    }

    let commands_map = load_commands(&args.commands_json.unwrap_or_else(|| cfg.data_path("show-commands.json")));
    if args.show.is_empty() {
        writeln!(out, "No commands selected; nothing to run.")?;
        return Ok(());
    }
    let commands = args.show.resolve(&commands_map);

    let connector = SshConnector;
    let ctx = LabContext::new(&connector, credentials, &cfg);
    show::run_show_commands(&ctx, &devices, &commands, ErrorPolicy::Continue, &mut out).await
}
