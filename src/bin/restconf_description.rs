use anyhow::Result;
use clap::Parser;

use net_orchestrator::labs::{cli, variables};
use net_orchestrator::restconf::{push_descriptions, RestconfTarget};

/// Set an interface description over RESTCONF on each lab router
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[command(flatten)]
    credentials: cli::CredentialArgs,
    /// Router address; repeat for several [default: 10.0.0.51 10.0.0.52]
    #[arg(long = "host")]
    hosts: Vec<String>,
    /// HTTPS port of the RESTCONF server
    #[arg(long, default_value_t = 443)]
    port: u16,
    /// Interface to update
    #[arg(long, default_value = "GigabitEthernet1")]
    interface: String,
    /// Description to set
    #[arg(long, default_value = "Configured via RESTCONF")]
    description: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    cli::init_logging();
    let args = Args::parse();

    let hosts = if args.hosts.is_empty() {
        vec![variables::IP_R51.to_string(), variables::IP_R52.to_string()]
    } else {
        args.hosts
    };
    let targets: Vec<RestconfTarget> = hosts
        .into_iter()
        .map(|host| RestconfTarget {
            host,
            port: args.port,
            username: args.credentials.username.clone(),
            password: args.credentials.password.clone(),
        })
        .collect();

    push_descriptions(&targets, &args.interface, &args.description, &mut std::io::stdout().lock()).await
}
