use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::inventory::load_device_names;
use crate::models::{FormField, InputKind, InputSpec};

/// Input consulted for the device CSV when `csv_input` is not set
pub const DEFAULT_CSV_INPUT: &str = "devices_csv";
pub const ALL_DEVICES: &str = "all";
pub const NO_DEVICES: &str = "none";

/// Truthiness of a form value: null, false, zero and empty values are false
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Command-line text of a value. Lists are comma-joined.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(stringify_value).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Turn form values into script arguments, in input order.
///
/// Null or missing values emit nothing. Booleans emit their flag (`arg`, or
/// `--<name>`) only when true. Password values are trimmed. An empty device
/// selection is skipped entirely. Everything else is `arg` (when given)
/// followed by the value.
pub fn build_cli_args(inputs: &[InputSpec], values: &Map<String, Value>) -> Vec<String> {
    let mut args = Vec::new();
    for input in inputs {
        let Some(value) = values.get(&input.name).filter(|v| !v.is_null()) else {
            continue;
        };

        match input.kind {
            InputKind::Bool => {
                if is_truthy(value) {
                    args.push(
                        input
                            .arg
                            .clone()
                            .unwrap_or_else(|| format!("--{}", input.name)),
                    );
                }
            }
            InputKind::Password => {
                args.extend(input.arg.clone());
                args.push(stringify_value(value).trim().to_string());
            }
            InputKind::MultiselectDevices => {
                if !is_truthy(value) {
                    continue;
                }
                args.extend(input.arg.clone());
                args.push(stringify_value(value));
            }
            _ => {
                args.extend(input.arg.clone());
                args.push(stringify_value(value));
            }
        }
    }
    args
}

fn as_i64(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Bool(b)) => *b as i64,
        _ => 0,
    }
}

fn as_f64(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

/// List default for multi-pickers: an explicit list, or `when_true` for `true`
fn list_default(default: Option<&Value>, when_true: Vec<Value>) -> Vec<Value> {
    match default {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Bool(true)) => when_true,
        _ => Vec::new(),
    }
}

/// Choices of a device picker: CSV labels framed by the `all` / `none` options
pub fn device_choices(input: &InputSpec, csv_path: Option<&Path>) -> Vec<Value> {
    let mut choices: Vec<Value> = Vec::new();
    if input.include_all_option {
        choices.push(Value::from(ALL_DEVICES));
    }
    if let Some(path) = csv_path {
        choices.extend(load_device_names(path).into_iter().map(Value::from));
    }
    if input.include_none_option {
        choices.push(Value::from(NO_DEVICES));
    }
    choices
}

/// CSV path a device picker reads: the named csv input's current value, else the picker's own default.
/// Relative paths are taken from `root`.
fn device_csv_path(input: &InputSpec, resolved: &Map<String, Value>, root: &Path) -> Option<PathBuf> {
    let csv_input = input.csv_input.as_deref().unwrap_or(DEFAULT_CSV_INPUT);
    let raw = resolved
        .get(csv_input)
        .filter(|v| is_truthy(v))
        .or(input.default.as_ref().filter(|v| v.is_string()))
        .map(stringify_value)
        .filter(|s| !s.trim().is_empty())?;

    let path = PathBuf::from(raw.trim());
    Some(if path.is_absolute() { path } else { root.join(path) })
}

/// The widget's starting value and its options
fn widget_default(input: &InputSpec, resolved: &Map<String, Value>, root: &Path) -> (Value, Vec<Value>) {
    let default = input.default.as_ref();
    match input.kind {
        InputKind::Int => (Value::from(as_i64(default)), Vec::new()),
        InputKind::Float => (Value::from(as_f64(default)), Vec::new()),
        InputKind::Select => {
            let value = default
                .filter(|d| input.choices.contains(d))
                .or(input.choices.first())
                .cloned()
                .unwrap_or(Value::Null);
            (value, input.choices.clone())
        }
        InputKind::Multiselect => (
            Value::Array(list_default(default, input.choices.clone())),
            input.choices.clone(),
        ),
        InputKind::MultiselectDevices => {
            let csv = device_csv_path(input, resolved, root);
            let options = device_choices(input, csv.as_deref());
            let selected = list_default(default, vec![Value::from(ALL_DEVICES)]);
            (Value::from(stringify_value(&Value::Array(selected))), options)
        }
        InputKind::Bool => (Value::Bool(default.is_some_and(is_truthy)), Vec::new()),
        InputKind::Password | InputKind::Text => (
            Value::from(default.map(stringify_value).unwrap_or_default()),
            Vec::new(),
        ),
    }
}

/// Resolve every input of a form. Supplied values win over widget defaults.
/// Inputs are resolved in order so a device picker sees the CSV path chosen above it.
pub fn resolve_form(inputs: &[InputSpec], values: &Map<String, Value>, root: &Path) -> Vec<FormField> {
    let mut resolved = Map::new();
    let mut fields = Vec::with_capacity(inputs.len());

    for input in inputs {
        let (default, options) = widget_default(input, &resolved, root);
        let value = match values.get(&input.name) {
            Some(v) if !v.is_null() => v.clone(),
            _ => default,
        };
        resolved.insert(input.name.clone(), value.clone());
        fields.push(FormField {
            spec: input.clone(),
            value,
            options,
        });
    }
    fields
}

/// Supplied values with every absent input filled from its widget default
pub fn fill_defaults(inputs: &[InputSpec], values: &Map<String, Value>, root: &Path) -> Map<String, Value> {
    let mut filled = values.clone();
    for field in resolve_form(inputs, values, root) {
        filled.insert(field.spec.name, field.value);
    }
    filled
}
