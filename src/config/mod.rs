use std::env;
use std::path::{Path, PathBuf};

/// Config holds all process configuration shared by the dashboard and the labs
#[derive(Debug, Clone)]
pub struct Config {
    pub root_dir: PathBuf,
    pub data_dir: PathBuf,
    pub catalog_config: PathBuf,
    pub static_dir: PathBuf,
    pub listen_addr: String,
    pub run_timeout_secs: u64,
    pub run_history: usize,
    pub python_bin: String,
    pub ssh_timeout_secs: u64,
    pub ssh_port: u16,
}

impl Config {
    /// Load configuration from environment variables with defaults.
    /// A `.env` file in the working directory is honoured when present.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();

        let root_dir = PathBuf::from(get_env("NETLAB_ROOT", "."));
        let root_dir = std::path::absolute(&root_dir).unwrap_or(root_dir);
        Self {
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| root_dir.join("data")),
            catalog_config: env::var("CATALOG_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| root_dir.join("config").join("config.json")),
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| root_dir.join("static")),
            listen_addr: get_env("LISTEN_ADDR", "0.0.0.0:8501"),
            run_timeout_secs: get_env("RUN_TIMEOUT_SECS", "300").parse().unwrap_or(300),
            run_history: get_env("RUN_HISTORY", "50").parse().unwrap_or(50),
            python_bin: get_env("PYTHON_BIN", "python3"),
            ssh_timeout_secs: get_env("SSH_TIMEOUT_SECS", "30").parse().unwrap_or(30),
            ssh_port: get_env("SSH_PORT", "22").parse().unwrap_or(22),
            root_dir,
        }
    }

    /// Configuration rooted at `root` with every other value at its default
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root_dir = root.as_ref().to_path_buf();
        Self {
            data_dir: root_dir.join("data"),
            catalog_config: root_dir.join("config").join("config.json"),
            static_dir: root_dir.join("static"),
            listen_addr: "0.0.0.0:8501".to_string(),
            run_timeout_secs: 300,
            run_history: 50,
            python_bin: "python3".to_string(),
            ssh_timeout_secs: 30,
            ssh_port: 22,
            root_dir,
        }
    }

    /// Path of a file under the data directory
    pub fn data_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Directory scanned for scripts, created when missing
    pub fn jobs_dir(&self) -> PathBuf {
        crate::catalog::find_jobs_dir(&self.root_dir)
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_root_layout() {
        let cfg = Config::with_root("/srv/labs");
        assert_eq!(cfg.data_path("show-commands.json"), PathBuf::from("/srv/labs/data/show-commands.json"));
        assert_eq!(cfg.catalog_config, PathBuf::from("/srv/labs/config/config.json"));
        assert_eq!(cfg.run_timeout_secs, 300);
    }
}
