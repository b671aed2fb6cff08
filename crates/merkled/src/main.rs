mod api;
mod config;
mod metrics;

use crate::{api::AppState, config::Config, metrics::Metrics};
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cfg = Config::parse();

    info!("merkled starting on {}", cfg.bind);
    info!("max_leaves = {}, body_limit_bytes = {}", cfg.max_leaves, cfg.body_limit_bytes);

    let state = AppState {
        max_leaves: cfg.max_leaves,
        metrics: Metrics::new(),
    };
    let app: Router = api::router(state, cfg.body_limit_bytes).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = cfg.bind.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}
