use anyhow::Result;
use serde::Deserialize;
use serde_json::json;
use std::io::Write;
use std::time::Duration;

/// Media type for RESTCONF YANG data (RFC 8040)
pub const YANG_JSON: &str = "application/yang-data+json";

fn default_port() -> u16 {
    443
}

/// A RESTCONF endpoint and its login
#[derive(Debug, Clone, Deserialize)]
pub struct RestconfTarget {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// How a PATCH attempt ended
#[derive(Debug)]
pub enum PatchOutcome {
    Updated,
    Rejected { status: u16, body: String },
    ConnectTimeout,
    RequestError(String),
}

pub fn interface_url(target: &RestconfTarget, interface: &str) -> String {
    format!(
        "https://{}:{}/restconf/data/ietf-interfaces:interfaces/interface={}",
        target.host, target.port, interface
    )
}

/// ietf-interfaces body setting an Ethernet interface's description
pub fn description_payload(interface: &str, description: &str) -> serde_json::Value {
    json!({
        "ietf-interfaces:interface": {
            "name": interface,
            "description": description,
            "type": "iana-if-type:ethernetCsmacd",
            "enabled": true
        }
    })
}

/// Client for lab devices: self-signed certificates accepted, 5 second timeout
pub fn build_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .timeout(Duration::from_secs(5))
        .build()?)
}

pub async fn patch_interface_description(
    client: &reqwest::Client,
    target: &RestconfTarget,
    interface: &str,
    description: &str,
) -> PatchOutcome {
    let response = client
        .patch(interface_url(target, interface))
        .header(reqwest::header::CONTENT_TYPE, YANG_JSON)
        .header(reqwest::header::ACCEPT, YANG_JSON)
        .basic_auth(&target.username, Some(&target.password))
        .body(description_payload(interface, description).to_string())
        .send()
        .await;

    match response {
        Ok(resp) if matches!(resp.status().as_u16(), 200 | 201 | 204) => PatchOutcome::Updated,
        Ok(resp) => {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            PatchOutcome::Rejected { status, body }
        }
        Err(e) if e.is_connect() && e.is_timeout() => PatchOutcome::ConnectTimeout,
        Err(e) => PatchOutcome::RequestError(e.to_string()),
    }
}

/// Push the description to every target, reporting each result
pub async fn push_descriptions<W: Write>(
    targets: &[RestconfTarget],
    interface: &str,
    description: &str,
    out: &mut W,
) -> Result<()> {
    let client = build_client()?;
    for target in targets {
        writeln!(out, "\nPushing description to {} on {} ...", interface, target.host)?;
        match patch_interface_description(&client, target, interface, description).await {
            PatchOutcome::Updated => {
                writeln!(out, "✅ Successfully updated description on {}", target.host)?;
            }
            PatchOutcome::Rejected { status, body } => {
                writeln!(out, "❌ Failed on {} (status {})", target.host, status)?;
                writeln!(out, "Response: {}", body)?;
            }
            PatchOutcome::ConnectTimeout => {
                writeln!(
                    out,
                    "❌ Could not reach {} on port {} (connect timeout)",
                    target.host, target.port
                )?;
            }
            PatchOutcome::RequestError(e) => {
                tracing::warn!("RESTCONF request to {} failed: {}", target.host, e);
                writeln!(out, "❌ Request error talking to {}: {}", target.host, e)?;
            }
        }
    }
    Ok(())
}
