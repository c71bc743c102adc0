pub mod platform;
mod ssh;

#[cfg(test)]
pub(crate) mod mock;

pub use ssh::{ssh_connect, ssh_exec, ssh_shell_send, SshConnection, SshConnector};

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;

use crate::models::ConnectParams;

/// Connector opens administrative sessions to devices
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, params: &ConnectParams) -> Result<Box<dyn DeviceConnection>>;
}

/// DeviceConnection is one open session. Callers must `disconnect` when done.
#[async_trait]
pub trait DeviceConnection: Send {
    /// Run a show command and return its output
    async fn send_command(&mut self, command: &str) -> Result<String>;

    /// Apply configuration lines inside the platform's config mode
    async fn send_config_set(&mut self, lines: &[String]) -> Result<String>;

    /// Apply the non-blank lines of a config file
    async fn send_config_from_file(&mut self, path: &Path) -> Result<String> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading config file {}", path.display()))?;
        let lines = platform::config_lines_from_text(&text);
        self.send_config_set(&lines).await
    }

    async fn disconnect(&mut self) -> Result<()>;
}
