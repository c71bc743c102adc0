use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use net_orchestrator::config::Config;
use net_orchestrator::connection::SshConnector;
use net_orchestrator::labs::push::{eigrp_config, run_eigrp_push};
use net_orchestrator::labs::{cli, variables, LabContext};

/// Push EIGRP config lines to R51 and a config file to R52
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[command(flatten)]
    credentials: cli::CredentialArgs,
    /// EIGRP autonomous system number
    #[arg(long, default_value_t = variables::EIGRP_AS)]
    eigrp_as: u32,
    /// Network statement advertised by R51
    #[arg(long, default_value = "10.0.0.0 0.0.0.255")]
    network: String,
    /// Config file sent to R52 [default: data/lab3-r52_eigrp.cfg]
    #[arg(long)]
    r52_config_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    cli::init_logging();
    let args = Args::parse();
    let cfg = Config::load();

    let credentials = args.credentials.credentials();
    let routers = variables::device_list(&credentials);
    let r52_file = args.r52_config_file.unwrap_or_else(|| cfg.data_path("lab3-r52_eigrp.cfg"));

    let connector = SshConnector;
    let ctx = LabContext::new(&connector, credentials, &cfg);
    run_eigrp_push(
        &ctx,
        &routers[0],
        &routers[1],
        &eigrp_config(args.eigrp_as, &args.network),
        &r52_file,
        &mut std::io::stdout().lock(),
    )
    .await
}
