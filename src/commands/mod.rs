use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Show-command keys mapped to the command text sent to the device
pub type CommandMap = BTreeMap<String, String>;

/// Canonical show-command keys
pub mod command_key {
    pub const SHOW_INTERFACE_BRIEF: &str = "show_interface_brief";
    pub const SHOW_ROUTE: &str = "show_route";
    pub const SHOW_VERSION: &str = "show_version";
    pub const SHOW_EIGRP_INTERFACES: &str = "show_eigrp_interfaces";
    pub const SHOW_EIGRP_NEIGHBORS: &str = "show_eigrp_neighbors";
    pub const SHOW_EIGRP_TOPOLOGY: &str = "show_eigrp_topology";
}

/// Built-in command map used underneath any user-supplied JSON
pub fn default_commands() -> CommandMap {
    use command_key::*;
    [
        (SHOW_INTERFACE_BRIEF, "show ip interface brief"),
        (SHOW_ROUTE, "show ip route"),
        (SHOW_VERSION, "show version"),
        (SHOW_EIGRP_INTERFACES, "show ip eigrp interfaces"),
        (SHOW_EIGRP_NEIGHBORS, "show ip eigrp neighbors"),
        (SHOW_EIGRP_TOPOLOGY, "show ip eigrp topology"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Load the command map from `{"commands": {...}}`.
///
/// String entries override the defaults, unknown keys are kept, non-string
/// values are ignored. Any read or parse error is reported on stdout and the
/// defaults are returned.
pub fn load_commands(path: &Path) -> CommandMap {
    match read_commands(path) {
        Ok(map) => map,
        Err(e) => {
            println!("Error reading commands JSON {}: {}", path.display(), e);
            default_commands()
        }
    }
}

fn read_commands(path: &Path) -> Result<CommandMap> {
    let raw = std::fs::read_to_string(path).context("could not read file")?;
    let data: Value = serde_json::from_str(&raw)?;
    merge_commands(&data)
}

/// Overlay the string entries of `data["commands"]` on the defaults
pub fn merge_commands(data: &Value) -> Result<CommandMap> {
    let obj = data
        .as_object()
        .ok_or_else(|| anyhow!("expected a JSON object at the top level"))?;

    let mut merged = default_commands();
    match obj.get("commands") {
        None => {}
        Some(Value::Object(cmds)) => {
            for (key, value) in cmds {
                if let Value::String(text) = value {
                    merged.insert(key.clone(), text.clone());
                }
            }
        }
        Some(other) => bail!("'commands' must be an object, got {}", other),
    }
    Ok(merged)
}

/// Show-command flags shared by the labs
#[derive(Debug, Clone, Default, Args)]
pub struct ShowSelection {
    /// Run show ip interface brief
    #[arg(long)]
    pub show_interface_brief: bool,
    /// Run show ip route
    #[arg(long)]
    pub show_route: bool,
    /// Run show version
    #[arg(long)]
    pub show_version: bool,
    /// Run show ip eigrp interfaces
    #[arg(long)]
    pub show_eigrp_interfaces: bool,
    /// Run show ip eigrp neighbors
    #[arg(long)]
    pub show_eigrp_neighbors: bool,
    /// Run show ip eigrp topology
    #[arg(long)]
    pub show_eigrp_topology: bool,
}

impl ShowSelection {
    /// Selected command keys, always in flag order
    pub fn selected_keys(&self) -> Vec<&'static str> {
        use command_key::*;
        [
            (self.show_interface_brief, SHOW_INTERFACE_BRIEF),
            (self.show_route, SHOW_ROUTE),
            (self.show_version, SHOW_VERSION),
            (self.show_eigrp_interfaces, SHOW_EIGRP_INTERFACES),
            (self.show_eigrp_neighbors, SHOW_EIGRP_NEIGHBORS),
            (self.show_eigrp_topology, SHOW_EIGRP_TOPOLOGY),
        ]
        .into_iter()
        .filter_map(|(on, key)| on.then_some(key))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_keys().is_empty()
    }

    /// Command text for each selected key present in `map`
    pub fn resolve(&self, map: &CommandMap) -> Vec<String> {
        self.selected_keys()
            .into_iter()
            .filter_map(|k| map.get(k).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_overrides_defaults_and_keeps_unknown_keys() {
        let data = json!({
            "commands": {
                "show_route": "show ip route ospf",
                "show_clock": "show clock",
                "bogus": 42
            }
        });
        let merged = merge_commands(&data).unwrap();
        assert_eq!(merged["show_route"], "show ip route ospf");
        assert_eq!(merged["show_clock"], "show clock");
        assert_eq!(merged["show_version"], "show version");
        assert!(!merged.contains_key("bogus"));
        assert_eq!(merged.len(), 7);
    }

    #[test]
    fn test_missing_commands_key_means_defaults() {
        assert_eq!(merge_commands(&json!({})).unwrap(), default_commands());
    }

    #[test]
    fn test_malformed_inputs_fall_back_to_defaults() {
        assert!(merge_commands(&json!([1, 2])).is_err());
        assert!(merge_commands(&json!({"commands": ["show version"]})).is_err());
        assert_eq!(load_commands(Path::new("/nonexistent/show-commands.json")), default_commands());
    }

    #[test]
    fn test_selection_order_and_resolution() {
        let selection = ShowSelection {
            show_eigrp_topology: true,
            show_interface_brief: true,
            ..Default::default()
        };
        assert_eq!(selection.selected_keys(), vec!["show_interface_brief", "show_eigrp_topology"]);

        let mut map = default_commands();
        map.remove("show_eigrp_topology");
        assert_eq!(selection.resolve(&map), vec!["show ip interface brief".to_string()]);
        assert!(ShowSelection::default().is_empty());
    }
}
