//! # ovpo-query-api: Binary Entry Point

use anyhow::Context;
use ovpo_query_api::config::QueryConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = QueryConfig::from_env().context("invalid query API configuration")?;
    ovpo_core::telemetry::init_tracing(config.log_format);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    tracing::info!(%addr, version = ovpo_core::OVPO_VERSION, "OVPO query API listening");

    axum::serve(listener, ovpo_query_api::app())
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
            tracing::info!("shutdown signal received");
        })
        .await
        .context("server error")?;

    Ok(())
}
