use serde::{Deserialize, Serialize};

/// Device type used when a CSV row or inventory entry does not name one
pub const DEFAULT_DEVICE_TYPE: &str = "cisco_ios";

/// Hostnames handed out to headerless CSV rows, in order
pub const DEFAULT_HOSTNAMES: &[&str] = &["C8K-R51", "C8K-R52"];

fn default_device_type() -> String {
    DEFAULT_DEVICE_TYPE.to_string()
}

/// DeviceRecord is everything needed to reach one managed device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(default)]
    pub hostname: String,
    pub ip: String,
    #[serde(default = "default_device_type")]
    pub device_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

impl DeviceRecord {
    pub fn new(hostname: impl Into<String>, ip: impl Into<String>, device_type: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ip: ip.into(),
            device_type: device_type.into(),
            username: None,
            password: None,
        }
    }

    /// Hostname when known, otherwise the IP
    pub fn display_name(&self) -> &str {
        if self.hostname.is_empty() {
            &self.ip
        } else {
            &self.hostname
        }
    }

    /// Attach credentials to the record
    pub fn with_credentials(mut self, creds: &Credentials) -> Self {
        self.username = Some(creds.username.clone());
        self.password = Some(creds.password.clone());
        self
    }

    /// Build connection parameters. Credentials stored on the record win over `fallback`.
    pub fn connect_params(&self, fallback: &Credentials, port: u16, timeout_secs: u64) -> ConnectParams {
        let device_type = if self.device_type.trim().is_empty() {
            DEFAULT_DEVICE_TYPE.to_string()
        } else {
            self.device_type.clone()
        };
        ConnectParams {
            device_type,
            host: self.ip.clone(),
            port,
            username: self
                .username
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| fallback.username.clone()),
            password: self
                .password
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| fallback.password.clone()),
            timeout_secs,
        }
    }
}

/// Login supplied on the command line (or prompted for)
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// ConnectParams is the per-session tuple handed to a connector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    pub device_type: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub timeout_secs: u64,
}
