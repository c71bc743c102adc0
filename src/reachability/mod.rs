use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::models::DeviceRecord;
use crate::utils::{is_valid_hostname, is_valid_ipv4};

/// Upper bound for a single ping, process start included
pub const PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize)]
pub struct PingResult {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<String>,
    /// Set when ping could not be run at all, as opposed to getting no reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PingResult {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            reachable: false,
            latency: None,
            error: Some(error.into()),
        }
    }
}

/// Flag selecting the echo count on this platform
fn count_flag() -> &'static str {
    if cfg!(windows) {
        "-n"
    } else {
        "-c"
    }
}

/// Send one ICMP echo to `target` using the system ping
pub async fn ping(target: &str) -> PingResult {
    if target.starts_with('-') || !(is_valid_ipv4(target) || is_valid_hostname(target)) {
        return PingResult::failed("Invalid address");
    }

    let output = Command::new("ping")
        .args([count_flag(), "1", target])
        .kill_on_drop(true)
        .output();

    match timeout(PING_TIMEOUT, output).await {
        Ok(Ok(output)) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            PingResult {
                reachable: true,
                latency: parse_ping_latency(&stdout),
                error: None,
            }
        }
        Ok(Ok(_)) => PingResult {
            reachable: false,
            latency: None,
            error: None,
        },
        Ok(Err(e)) => PingResult::failed(e.to_string()),
        Err(_) => PingResult::failed(format!("timed out after {}s", PING_TIMEOUT.as_secs())),
    }
}

/// Round-trip time of the first reply, e.g. "time=1.23 ms" -> "1.23ms"
pub fn parse_ping_latency(output: &str) -> Option<String> {
    let re = regex_lite::Regex::new(r"time[=<]\s*([\d.]+)\s*ms").ok()?;
    re.captures(output).map(|c| format!("{}ms", &c[1]))
}

/// Ping each address once, one line per address
pub async fn run_ping_check<W: Write>(ips: &[String], out: &mut W) -> Result<()> {
    for ip in ips {
        let result = ping(ip).await;
        if let Some(latency) = &result.latency {
            tracing::debug!("{} replied in {}", ip, latency);
        }
        match (result.reachable, result.error) {
            (true, _) => writeln!(out, "{} is reachable", ip)?,
            (false, None) => writeln!(out, "{} is NOT reachable", ip)?,
            (false, Some(e)) => writeln!(out, "{} is NOT reachable (error: {})", ip, e)?,
        }
    }
    Ok(())
}

/// Reachability section of the inventory walkthrough
pub async fn check_reachability<W: Write>(devices: &[DeviceRecord], out: &mut W) -> Result<()> {
    for device in devices {
        let result = ping(&device.ip).await;
        if result.reachable {
            tracing::debug!("{} replied in {}", device.ip, result.latency.as_deref().unwrap_or("?"));
            writeln!(out, "{} is reachable.", device.ip)?;
        } else {
            tracing::debug!("{} did not answer", device.ip);
            writeln!(out, "{} is NOT reachable.", device.ip)?;
        }
    }
    Ok(())
}
