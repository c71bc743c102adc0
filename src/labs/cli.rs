use anyhow::{Context, Result};
use clap::Args;
use console::Term;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::models::Credentials;

/// Initialize tracing for a lab binary. Logs go to stderr so stdout stays the lab report.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Device login, both parts required
#[derive(Debug, Clone, Args)]
pub struct CredentialArgs {
    /// Device username
    #[arg(long)]
    pub username: String,
    /// Device password
    #[arg(long)]
    pub password: String,
}

impl CredentialArgs {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }
}

/// Device login that falls back to an interactive prompt
#[derive(Debug, Clone, Args)]
pub struct PromptedCredentialArgs {
    /// Device username (prompted for when omitted)
    #[arg(long)]
    pub username: Option<String>,
    /// Device password (prompted for, hidden, when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

impl PromptedCredentialArgs {
    pub fn resolve(&self) -> Result<Credentials> {
        let term = Term::stdout();
        let username = match self.username.clone().filter(|u| !u.is_empty()) {
            Some(u) => u,
            None => {
                term.write_str("Username: ")?;
                term.read_line().context("reading username")?
            }
        };
        let password = match self.password.clone().filter(|p| !p.is_empty()) {
            Some(p) => p,
            None => {
                term.write_str("Password: ")?;
                term.read_secure_line().context("reading password")?
            }
        };
        Ok(Credentials::new(username, password))
    }
}
