use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::AppState;
use crate::catalog::{inputs, ScriptNotFound};
use crate::models::{Catalog, CatalogEntry, FormField, RunRecord, RunRequest};
use crate::runner;

/// Error response body: {"error": "message"}
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// API error type
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(nf) = err.downcast_ref::<ScriptNotFound>() {
            return Self::not_found(nf.to_string());
        }
        Self::internal(format!("{:#}", err))
    }
}

/// Message response for simple status messages
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Json<Self> {
        Json(Self { message: msg.into() })
    }
}

/// Healthcheck endpoint, returns 200 OK with status
pub async fn healthcheck() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "net-orchestrator",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Catalog plus the note explaining where it came from
#[derive(Serialize)]
pub struct CatalogResponse {
    #[serde(flatten)]
    pub catalog: Catalog,
    pub about: &'static str,
}

pub fn about_note(catalog: &Catalog) -> &'static str {
    if catalog.is_config_driven() {
        "UI driven by config/config.json. Edit it to control displayed scripts and inputs."
    } else {
        "No config found; showing scripts discovered in the jobs/ folder."
    }
}

pub async fn list_scripts(State(state): State<Arc<AppState>>) -> Json<CatalogResponse> {
    let catalog = Catalog::load(&state.config);
    let about = about_note(&catalog);
    Json(CatalogResponse { catalog, about })
}

/// One entry with its form resolved to starting values
#[derive(Serialize)]
pub struct ScriptDetail {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    pub form: Vec<FormField>,
}

pub fn script_detail(state: &AppState, id: &str) -> Result<ScriptDetail, ApiError> {
    let catalog = Catalog::load(&state.config);
    let entry = catalog.find(id)?.clone();
    let form = inputs::resolve_form(&entry.inputs, &Default::default(), &state.config.root_dir);
    Ok(ScriptDetail { entry, form })
}

pub async fn get_script(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ScriptDetail>, ApiError> {
    Ok(Json(script_detail(&state, &id)?))
}

#[derive(Serialize)]
pub struct SourceResponse {
    pub id: String,
    pub path: String,
    pub source: String,
}

pub async fn get_script_source(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SourceResponse>, ApiError> {
    let catalog = Catalog::load(&state.config);
    let entry = catalog.find(&id)?;
    let path = entry.require_path()?.display().to_string();
    let source = entry.read_source()?;
    Ok(Json(SourceResponse { id, path, source }))
}

#[derive(Debug, Deserialize)]
pub struct DevicesQuery {
    pub csv: Option<String>,
    /// Which picker to resolve; defaults to the first device picker of the script
    pub input: Option<String>,
}

/// Device choices for a script's device picker, read from `csv`
pub async fn get_device_choices(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<DevicesQuery>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let catalog = Catalog::load(&state.config);
    let entry = catalog.find(&id)?;
    let picker = entry
        .inputs
        .iter()
        .filter(|i| i.kind == crate::models::InputKind::MultiselectDevices)
        .find(|i| query.input.as_deref().map_or(true, |name| i.name == name))
        .ok_or_else(|| ApiError::bad_request(format!("Script {} has no device picker", id)))?;

    let csv = query
        .csv
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| state.config.root_dir.join(c));
    Ok(Json(inputs::device_choices(picker, csv.as_deref())))
}

/// Launch a script with the submitted form values
pub async fn run_script(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<RunRequest>,
) -> Result<Json<RunRecord>, ApiError> {
    let catalog = Catalog::load(&state.config);
    let entry = catalog.find(&id)?;
    let path = entry.require_path()?;

    let values = inputs::fill_defaults(&entry.inputs, &req.values, &state.config.root_dir);
    let args = inputs::build_cli_args(&entry.inputs, &values);
    let record = runner::run_script(&entry.id, path, &args, &state.config).await?;

    state.record_run(record.clone()).await;
    Ok(Json(record))
}

pub async fn list_runs(State(state): State<Arc<AppState>>) -> Json<Vec<RunRecord>> {
    Json(state.recent_runs().await)
}

pub async fn clear_runs(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    let cleared = {
        let mut runs = state.runs.write().await;
        let n = runs.len();
        runs.clear();
        n
    };
    MessageResponse::new(format!("Cleared {} runs", cleared))
}
