//! The web dashboard: lists catalog scripts, renders their input forms and
//! launches them as subprocesses.

pub mod handlers;
pub mod pages;
pub mod router;

use anyhow::Result;
use std::collections::VecDeque;
use tera::Tera;
use tokio::signal;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::models::RunRecord;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub templates: Tera,
    pub runs: RwLock<VecDeque<RunRecord>>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            templates: pages::templates()?,
            runs: RwLock::new(VecDeque::new()),
        })
    }

    /// Remember a finished run, dropping the oldest beyond the history limit
    pub async fn record_run(&self, record: RunRecord) {
        let mut runs = self.runs.write().await;
        runs.push_front(record);
        runs.truncate(self.config.run_history.max(1));
    }

    /// Most recent runs first
    pub async fn recent_runs(&self) -> Vec<RunRecord> {
        self.runs.read().await.iter().cloned().collect()
    }
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => { sig.recv().await; }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
