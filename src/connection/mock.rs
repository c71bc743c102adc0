use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use super::{Connector, DeviceConnection};
use crate::models::ConnectParams;

/// In-memory connector that records every interaction
#[derive(Clone, Default)]
pub struct MockConnector {
    pub transcript: Arc<Mutex<Vec<String>>>,
    unreachable: HashSet<String>,
    failing_commands: HashSet<String>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable(mut self, host: &str) -> Self {
        self.unreachable.insert(host.to_string());
        self
    }

    pub fn failing_command(mut self, command: &str) -> Self {
        self.failing_commands.insert(command.to_string());
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.transcript.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, params: &ConnectParams) -> Result<Box<dyn DeviceConnection>> {
        if self.unreachable.contains(&params.host) {
            bail!("TCP connection failed: connection refused");
        }
        self.transcript
            .lock()
            .unwrap()
            .push(format!("connect {} as {}", params.host, params.username));
        Ok(Box::new(MockConnection {
            host: params.host.clone(),
            transcript: self.transcript.clone(),
            failing_commands: self.failing_commands.clone(),
        }))
    }
}

struct MockConnection {
    host: String,
    transcript: Arc<Mutex<Vec<String>>>,
    failing_commands: HashSet<String>,
}

#[async_trait]
impl DeviceConnection for MockConnection {
    async fn send_command(&mut self, command: &str) -> Result<String> {
        if self.failing_commands.contains(command) {
            bail!("% Invalid input detected");
        }
        self.transcript.lock().unwrap().push(format!("{}: {}", self.host, command));
        Ok(format!("output of {}", command))
    }

    async fn send_config_set(&mut self, lines: &[String]) -> Result<String> {
        self.transcript
            .lock()
            .unwrap()
            .push(format!("{}: config [{}]", self.host, lines.join("; ")));
        Ok(format!("{} lines applied", lines.len()))
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.transcript.lock().unwrap().push(format!("disconnect {}", self.host));
        Ok(())
    }
}
