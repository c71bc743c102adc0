use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::{handlers, pages, AppState};

/// Build the dashboard router with all routes
pub fn build(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        // Pages
        .route("/", get(pages::index))
        .route("/scripts/:id", get(pages::script_page))
        // Health
        .route("/api/health", get(handlers::healthcheck))
        // Catalog routes
        .route("/api/scripts", get(handlers::list_scripts))
        .route("/api/scripts/:id", get(handlers::get_script))
        .route("/api/scripts/:id/source", get(handlers::get_script_source))
        .route("/api/scripts/:id/devices", get(handlers::get_device_choices))
        .route("/api/scripts/:id/run", post(handlers::run_script))
        // Run history
        .route("/api/runs", get(handlers::list_runs))
        .route("/api/runs", delete(handlers::clear_runs))
        // Static assets
        .nest_service("/static", ServeDir::new(static_dir))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
