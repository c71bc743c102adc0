use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use net_orchestrator::config::Config;
use net_orchestrator::dashboard::{self, router, AppState};
use net_orchestrator::models::Catalog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "net_orchestrator=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let cfg = Config::load();
    tracing::info!("Starting Network Orchestrator");
    tracing::info!("Root: {}", cfg.root_dir.display());
    tracing::info!("Catalog: {}", cfg.catalog_config.display());
    tracing::info!("Jobs Dir: {}", cfg.jobs_dir().display());
    tracing::info!("Run timeout: {}s", cfg.run_timeout_secs);
    tracing::info!("Listen: {}", cfg.listen_addr);

    let catalog = Catalog::load(&cfg);
    tracing::info!("Catalog has {} scripts (source: {})", catalog.entries.len(), catalog.source);

    // Create app state
    let state = Arc::new(AppState::new(cfg.clone())?);

    // Build router
    let app = router::build(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!("Network Orchestrator listening on {}", cfg.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(dashboard::shutdown_signal())
        .await?;

    tracing::info!("Network Orchestrator shutting down");
    Ok(())
}
