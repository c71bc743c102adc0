use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use net_orchestrator::commands::{load_commands, ShowSelection};
use net_orchestrator::config::Config;
use net_orchestrator::connection::SshConnector;
use net_orchestrator::inventory::load_devices;
use net_orchestrator::labs::push::{check_router_pair, load_push_plan, run_config_changes, PushTargets};
use net_orchestrator::labs::{cli, LabContext};

/// Lab 3: basic config changes on the two lab routers
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[command(flatten)]
    credentials: cli::CredentialArgs,
    /// Path to devices CSV [default: data/lab3-devices.csv]
    #[arg(long)]
    devices_csv: Option<PathBuf>,
    /// Path to JSON with command definitions [default: data/show-commands.json]
    #[arg(long)]
    commands_json: Option<PathBuf>,
    /// Path to JSON with R51/R52 config info [default: data/lab3-config.json]
    #[arg(long)]
    lab3_config_json: Option<PathBuf>,
    /// Override path to the R52 config file
    #[arg(long)]
    r52_config: Option<String>,
    /// Push config to devices
    #[arg(long)]
    push_config: bool,
    /// Comma-separated hostnames/IPs to push config to (or 'all'/'none')
    #[arg(long, default_value = "all")]
    push_config_targets: String,
    #[command(flatten)]
    show: ShowSelection,
}

#[tokio::main]
async fn main() -> Result<()> {
    cli::init_logging();
    let args = Args::parse();
    let cfg = Config::load();
    let mut out = std::io::stdout().lock();

    let csv_path = args.devices_csv.unwrap_or_else(|| cfg.data_path("lab3-devices.csv"));
    let devices = load_devices(&csv_path, "--devices-csv");
    if !check_router_pair(&devices, &mut out)? {
        return Ok(());
    }

    let commands_map = load_commands(&args.commands_json.unwrap_or_else(|| cfg.data_path("show-commands.json")));
    let commands = args.show.resolve(&commands_map);

    let plan_path = args.lab3_config_json.unwrap_or_else(|| cfg.data_path("lab3-config.json"));
    let plan = load_push_plan(&plan_path, cfg.data_path("lab3-r52_eigrp.cfg"))
        .with_r52_override(args.r52_config.as_deref());
    let targets = PushTargets::new(args.push_config, &args.push_config_targets);

    let connector = SshConnector;
    let ctx = LabContext::new(&connector, args.credentials.credentials(), &cfg);
    run_config_changes(&ctx, &devices, &commands, &plan, &targets, &mut out).await
}
