mod table;

pub use table::{CsvTable, Record};

use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Write;
use std::path::Path;

use crate::models::{DeviceRecord, DEFAULT_DEVICE_TYPE, DEFAULT_HOSTNAMES};

/// Header cells that mark the first row of a one-column device list
const IP_HEADERS: &[&str] = &["device_ips", "ip"];
const NAME_HEADERS: &[&str] = &["hostname", "device_ips", "ip"];

/// Load device records from a CSV file.
///
/// Never fails: a missing or unreadable file is reported on stdout and yields
/// an empty list. `path_flag` names the CLI flag the user should fix.
pub fn load_devices(path: &Path, path_flag: &str) -> Vec<DeviceRecord> {
    load_devices_reporting(path, path_flag, &mut std::io::stdout())
}

/// [`load_devices`] with problems reported to `out`
pub fn load_devices_reporting<W: Write>(path: &Path, path_flag: &str, out: &mut W) -> Vec<DeviceRecord> {
    let report = match CsvTable::read(path) {
        Ok(table) => return devices_from_table(&table),
        Err(e) if is_not_found(&e) => format!(
            "CSV not found at {}. Provide a valid path with {}.",
            path.display(),
            path_flag
        ),
        Err(e) => {
            tracing::warn!("Failed to load devices from {}: {:#}", path.display(), e);
            format!("Error reading CSV {}: {}", path.display(), e.root_cause())
        }
    };
    if let Err(e) = writeln!(out, "{}", report) {
        tracing::warn!("Failed to report CSV problem: {}", e);
    }
    Vec::new()
}

/// Build device records from a parsed table: keyed by header first,
/// then positionally when the header pass finds nothing.
pub fn devices_from_table(table: &CsvTable) -> Vec<DeviceRecord> {
    let mut devices = Vec::new();

    if !table.header().is_empty() {
        for rec in table.records() {
            let ip = rec.first_of(&["ip", "device_ips"]);
            if ip.is_empty() {
                continue;
            }
            let hostname = rec.first_of(&["hostname"]);
            let device_type = match rec.first_of(&["device_type"]) {
                t if t.is_empty() => DEFAULT_DEVICE_TYPE.to_string(),
                t => t,
            };
            devices.push(DeviceRecord::new(hostname, ip, device_type));
        }
    }

    if !devices.is_empty() {
        return devices;
    }

    for (idx, row) in table.rows().iter().enumerate() {
        let Some(first) = row.first() else { continue };
        let val = first.trim();
        if idx == 0 && IP_HEADERS.contains(&val.to_lowercase().as_str()) {
            continue;
        }
        if val.is_empty() {
            continue;
        }
        let ordinal = devices.len();
        let hostname = DEFAULT_HOSTNAMES
            .get(ordinal)
            .map(|h| h.to_string())
            .unwrap_or_else(|| format!("device{}", ordinal + 1));
        devices.push(DeviceRecord::new(hostname, val, DEFAULT_DEVICE_TYPE));
    }

    devices
}

/// Device labels for the dashboard picker: hostname, else IP.
/// A missing or unreadable file silently yields an empty list.
pub fn load_device_names(path: &Path) -> Vec<String> {
    if !path.exists() {
        return Vec::new();
    }
    match CsvTable::read(path) {
        Ok(table) => names_from_table(&table),
        Err(e) => {
            tracing::debug!("Ignoring unreadable device CSV {}: {:#}", path.display(), e);
            Vec::new()
        }
    }
}

fn names_from_table(table: &CsvTable) -> Vec<String> {
    let mut names: Vec<String> = table
        .records()
        .map(|rec| {
            let hostname = rec.first_of(&["hostname"]);
            if hostname.is_empty() {
                rec.first_of(&["ip", "device_ips"])
            } else {
                hostname
            }
        })
        .filter(|label| !label.is_empty())
        .collect();

    if !names.is_empty() {
        return names;
    }

    for (idx, row) in table.rows().iter().enumerate() {
        let Some(first) = row.first() else { continue };
        let val = first.trim();
        if idx == 0 && NAME_HEADERS.contains(&val.to_lowercase().as_str()) {
            continue;
        }
        if !val.is_empty() {
            names.push(val.to_string());
        }
    }
    names
}

#[derive(Debug, Deserialize)]
struct InventoryFile {
    #[serde(default)]
    devices: Vec<DeviceRecord>,
}

/// Load a YAML inventory with a top-level `devices` list.
/// JSON is accepted too, being valid YAML. Entries without an IP are dropped.
pub fn load_inventory(path: &Path) -> Result<Vec<DeviceRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading inventory {}", path.display()))?;
    let inventory: InventoryFile = serde_yaml::from_str(&raw)
        .with_context(|| format!("parsing inventory {}", path.display()))?;

    let (devices, dropped): (Vec<_>, Vec<_>) = inventory
        .devices
        .into_iter()
        .partition(|d| !d.ip.trim().is_empty());
    if !dropped.is_empty() {
        tracing::warn!("Skipped {} inventory entries without an IP", dropped.len());
    }
    Ok(devices)
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .map_or(false, |io| io.kind() == std::io::ErrorKind::NotFound)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_yields_empty_list() {
        let mut out = Vec::new();
        let devices = load_devices_reporting(Path::new("/nonexistent/lab2-devices.csv"), "--csv-path", &mut out);
        assert!(devices.is_empty());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "CSV not found at /nonexistent/lab2-devices.csv. Provide a valid path with --csv-path.\n"
        );
        assert!(load_device_names(Path::new("/nonexistent/lab2-devices.csv")).is_empty());
    }

    #[test]
    fn test_unreadable_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[b'i', b'p', b'\n', 0xff, 0xfe, b'\n']).unwrap();

        let mut out = Vec::new();
        let devices = load_devices_reporting(file.path(), "--csv-path", &mut out);
        assert!(devices.is_empty());
        let report = String::from_utf8(out).unwrap();
        assert!(report.starts_with(&format!("Error reading CSV {}: ", file.path().display())));
        assert!(report.contains("UTF-8"), "{}", report);
    }

    #[test]
    fn test_header_rows() {
        let file = write_temp("hostname,ip,device_type\nC8K-R51,10.0.0.51,\nC8K-R52,10.0.0.52,cisco_xe\n");
        let devices = load_devices(file.path(), "--csv-path");
        assert_eq!(
            devices,
            vec![
                DeviceRecord::new("C8K-R51", "10.0.0.51", "cisco_ios"),
                DeviceRecord::new("C8K-R52", "10.0.0.52", "cisco_xe"),
            ]
        );
    }

    #[test]
    fn test_device_ips_column_and_blank_ip_rows() {
        let file = write_temp("device_ips\n10.0.0.51\n\n  \n10.0.0.52\n");
        let devices = load_devices(file.path(), "--csv-path");
        let ips: Vec<_> = devices.iter().map(|d| d.ip.as_str()).collect();
        assert_eq!(ips, vec!["10.0.0.51", "10.0.0.52"]);
        assert!(devices.iter().all(|d| d.hostname.is_empty()));
        assert_eq!(devices[0].display_name(), "10.0.0.51");
    }

    #[test]
    fn test_positional_fallback_without_known_header() {
        let file = write_temp("10.0.0.51\n10.0.0.52\n10.0.0.53\n");
        let devices = load_devices(file.path(), "--csv-path");
        let names: Vec<_> = devices.iter().map(|d| d.hostname.as_str()).collect();
        assert_eq!(names, vec!["C8K-R51", "C8K-R52", "device3"]);
        assert!(devices.iter().all(|d| d.device_type == DEFAULT_DEVICE_TYPE));
    }

    #[test]
    fn test_positional_fallback_skips_ip_header_case_insensitively() {
        let file = write_temp("IP\n10.0.0.51\n");
        let devices = load_devices(file.path(), "--csv-path");
        assert_eq!(devices, vec![DeviceRecord::new("C8K-R51", "10.0.0.51", "cisco_ios")]);
    }

    #[test]
    fn test_device_names_prefer_hostname() {
        let file = write_temp("hostname,ip\nR51,10.0.0.51\n,10.0.0.52\n");
        assert_eq!(load_device_names(file.path()), vec!["R51", "10.0.0.52"]);
    }

    #[test]
    fn test_device_names_positional_fallback() {
        let file = write_temp("10.0.0.51\n10.0.0.52\n");
        assert_eq!(load_device_names(file.path()), vec!["10.0.0.51", "10.0.0.52"]);

        let headerless = write_temp("Hostname\nR51\n");
        assert_eq!(load_device_names(headerless.path()), vec!["R51"]);
    }

    #[test]
    fn test_yaml_inventory() {
        let file = write_temp(
            "devices:\n  - hostname: C8K-R51\n    ip: 10.0.0.51\n    device_type: cisco_xe\n  - hostname: C8K-R52\n    ip: 10.0.0.52\n",
        );
        let devices = load_inventory(file.path()).unwrap();
        assert_eq!(
            devices,
            vec![
                DeviceRecord::new("C8K-R51", "10.0.0.51", "cisco_xe"),
                DeviceRecord::new("C8K-R52", "10.0.0.52", "cisco_ios"),
            ]
        );
        assert!(devices[0].username.is_none());
    }

    #[test]
    fn test_inventory_drops_entries_without_ip() {
        let file = write_temp(
            r#"{"devices": [
                {"hostname": "C8K-R51", "ip": "10.0.0.51", "username": "admin", "password": "x"},
                {"hostname": "broken", "ip": ""}
            ]}"#,
        );
        let devices = load_inventory(file.path()).unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].device_type, DEFAULT_DEVICE_TYPE);
        assert_eq!(devices[0].username.as_deref(), Some("admin"));
    }
}
