use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Where the dashboard catalog came from
pub mod catalog_source {
    pub const CONFIG: &str = "config";
    pub const SCAN: &str = "scan";
}

/// Widget kinds an input spec can ask for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Int,
    Float,
    Select,
    Password,
    Multiselect,
    MultiselectDevices,
    Bool,
    /// Unknown widget types render as plain text inputs
    #[default]
    #[serde(other)]
    Text,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Int => "int",
            Self::Float => "float",
            Self::Select => "select",
            Self::Password => "password",
            Self::Multiselect => "multiselect",
            Self::MultiselectDevices => "multiselect_devices",
            Self::Bool => "bool",
        }
    }
}

fn default_true() -> bool {
    true
}

/// InputSpec describes one form widget of a catalog entry and the CLI argument it maps to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Flag emitted before the value, e.g. "--count". Positional when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: InputKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Value>,
    /// Name of the input holding the CSV path for a device picker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_input: Option<String>,
    #[serde(default = "default_true")]
    pub include_all_option: bool,
    #[serde(default = "default_true")]
    pub include_none_option: bool,
}

impl InputSpec {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// ScriptSpec is one entry of the `scripts` list in config/config.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptSpec {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub inputs: Option<Vec<InputSpec>>,
    /// Keys the dashboard does not interpret are carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// CatalogEntry is a launchable script as shown by the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub description: String,
    /// Resolved location on disk; None when the configured file was not found
    pub path: Option<PathBuf>,
    pub inputs: Vec<InputSpec>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Catalog is the full list the dashboard offers
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub source: &'static str,
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn is_config_driven(&self) -> bool {
        self.source == catalog_source::CONFIG
    }
}

/// A form widget with its resolved starting value and choices
#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    #[serde(flatten)]
    pub spec: InputSpec,
    pub value: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
}
