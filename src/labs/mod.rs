//! Lab workflows shared by the lab executables.
//!
//! Every workflow writes its report to a caller-supplied writer (stdout in
//! the binaries) and talks to devices through a [`Connector`], one device at
//! a time.

pub mod cli;
pub mod push;
pub mod show;
pub mod variables;

use anyhow::Result;
use std::io::Write;

use crate::config::Config;
use crate::connection::{Connector, DeviceConnection};
use crate::models::{ConnectParams, Credentials, DeviceRecord};

/// What a workflow does when a device or command fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Propagate the first failure
    Abort,
    /// Report the failure and move on to the next command or device
    Continue,
}

/// Everything a workflow needs to open sessions
pub struct LabContext<'a> {
    pub connector: &'a dyn Connector,
    pub credentials: Credentials,
    pub port: u16,
    pub timeout_secs: u64,
}

impl<'a> LabContext<'a> {
    pub fn new(connector: &'a dyn Connector, credentials: Credentials, cfg: &Config) -> Self {
        Self {
            connector,
            credentials,
            port: cfg.ssh_port,
            timeout_secs: cfg.ssh_timeout_secs,
        }
    }

    pub fn params(&self, device: &DeviceRecord) -> ConnectParams {
        device.connect_params(&self.credentials, self.port, self.timeout_secs)
    }

    /// Open a session to `device`
    pub async fn open(&self, device: &DeviceRecord) -> Result<Box<dyn DeviceConnection>> {
        let params = self.params(device);
        tracing::info!("Connecting to {} ({}) as {}", device.display_name(), params.host, params.username);
        self.connector.connect(&params).await
    }
}

/// `===== Connecting to <name> (<ip>) =====` preceded by a blank line
pub fn write_banner<W: Write>(out: &mut W, device: &DeviceRecord) -> Result<()> {
    writeln!(out, "\n===== Connecting to {} ({}) =====", device.display_name(), device.ip)?;
    Ok(())
}

/// Disconnect, logging rather than propagating a failure
pub(crate) async fn close(conn: &mut dyn DeviceConnection, device: &DeviceRecord) {
    if let Err(e) = conn.disconnect().await {
        tracing::debug!("Disconnect from {} failed: {:#}", device.ip, e);
    }
}

/// One command's output block
pub fn write_command_output<W: Write>(out: &mut W, name: &str, command: &str, output: &str) -> Result<()> {
    writeln!(out, "\n{} - {}\n{}\n", name, command, output)?;
    Ok(())
}
