use anyhow::{anyhow, Result};
use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tera::{Context, Tera};

use super::handlers::{about_note, script_detail, ApiError};
use super::AppState;
use crate::catalog::inputs::stringify_value;
use crate::models::{Catalog, FormField, InputKind};

const INDEX_TEMPLATE: &str = include_str!("templates/index.html.tera");
const SCRIPT_TEMPLATE: &str = include_str!("templates/script.html.tera");

/// Page templates, compiled once at startup
pub fn templates() -> Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_template("index.html", INDEX_TEMPLATE)
        .map_err(|e| anyhow!("Invalid index template: {}", e))?;
    tera.add_raw_template("script.html", SCRIPT_TEMPLATE)
        .map_err(|e| anyhow!("Invalid script template: {}", e))?;
    Ok(tera)
}

fn render(tera: &Tera, name: &str, ctx: &Context) -> Result<Html<String>, ApiError> {
    tera.render(name, ctx)
        .map(Html)
        .map_err(|e| ApiError::internal(format!("Failed to render {}: {}", name, e)))
}

pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let catalog = Catalog::load(&state.config);
    let mut ctx = Context::new();
    ctx.insert("about", about_note(&catalog));
    ctx.insert("catalog", &catalog);
    ctx.insert("runs", &state.recent_runs().await);
    render(&state.templates, "index.html", &ctx)
}

/// A form field flattened for the template
#[derive(Serialize)]
struct FieldView {
    name: String,
    label: String,
    kind: &'static str,
    value: String,
    checked: bool,
    options: Vec<String>,
    selected: Vec<String>,
    csv_input: Option<String>,
}

impl From<&FormField> for FieldView {
    fn from(field: &FormField) -> Self {
        let selected = match (&field.spec.kind, &field.value) {
            (_, Value::Array(items)) => items.iter().map(stringify_value).collect(),
            (InputKind::MultiselectDevices, Value::String(s)) => {
                s.split(',').filter(|p| !p.is_empty()).map(str::to_string).collect()
            }
            _ => Vec::new(),
        };
        let csv_input = (field.spec.kind == InputKind::MultiselectDevices).then(|| {
            field
                .spec
                .csv_input
                .clone()
                .unwrap_or_else(|| crate::catalog::inputs::DEFAULT_CSV_INPUT.to_string())
        });
        Self {
            name: field.spec.name.clone(),
            label: field.spec.label().to_string(),
            kind: field.spec.kind.as_str(),
            value: stringify_value(&field.value),
            checked: field.value.as_bool().unwrap_or(false),
            options: field.options.iter().map(stringify_value).collect(),
            selected,
            csv_input,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScriptPageQuery {
    #[serde(default)]
    pub source: bool,
}

pub async fn script_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ScriptPageQuery>,
) -> Result<Html<String>, ApiError> {
    let detail = script_detail(&state, &id)?;
    let fields: Vec<FieldView> = detail.form.iter().map(FieldView::from).collect();

    let mut ctx = Context::new();
    ctx.insert("script", &detail.entry);
    if let Some(path) = &detail.entry.path {
        ctx.insert("path", &path.display().to_string());
    }
    ctx.insert("fields", &fields);
    ctx.insert("show_source", &query.source);
    if query.source && detail.entry.path.is_some() {
        match detail.entry.read_source() {
            Ok(src) => ctx.insert("source", &src),
            Err(e) => ctx.insert("source_error", &format!("Could not read file: {:#}", e)),
        }
    }
    render(&state.templates, "script.html", &ctx)
}
