//! # ovpo-collector: Binary Entry Point
//!
//! Loads configuration, builds the schema store, then serves until
//! Ctrl-C. A schema directory that fails to load stops startup.

use std::sync::Arc;

use anyhow::Context;
use ovpo_collector::state::{AppConfig, AppState};
use ovpo_schema::SchemaValidator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid collector configuration")?;
    ovpo_core::telemetry::init_tracing(config.log_format);

    let validator = SchemaValidator::for_schemas_root(&config.schemas_root).with_context(|| {
        format!(
            "failed to load schemas from {}",
            config.schemas_root.display()
        )
    })?;
    tracing::info!(
        schemas = validator.schema_count(),
        location = %validator.location(),
        "schema store loaded"
    );

    let port = config.port;
    let state = AppState::new(config, Arc::new(validator));
    let app = ovpo_collector::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    tracing::info!(%addr, version = ovpo_core::OVPO_VERSION, "OVPO collector listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("OVPO collector stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("cannot listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
