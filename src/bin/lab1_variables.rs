use clap::Parser;

use net_orchestrator::labs::{cli, variables};

/// Lab 1: variables and print
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[command(flatten)]
    credentials: cli::CredentialArgs,
}

fn main() {
    cli::init_logging();
    let args = Args::parse();
    for line in variables::report(&args.credentials.credentials()) {
        println!("{}", line);
    }
}
