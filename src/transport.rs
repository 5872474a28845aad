use anyhow::Result;
use axum::{routing::get, Json, Router};
use clap::ValueEnum;
use rmcp::{
    transport::streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
    },
    ServiceExt,
};
use serde_json::{json, Value};
use std::{net::SocketAddr, sync::Arc};

use crate::service::Weather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// MCP over standard input/output
    Stdio,
    /// MCP streamable HTTP at `/mcp`
    Http,
}

/// Serves the weather tools over stdio until the client disconnects
pub async fn serve_stdio(weather: Weather) -> Result<()> {
    let server = weather.serve(rmcp::transport::stdio()).await?;
    server.waiting().await?;
    Ok(())
}

/// HTTP routes: the MCP endpoint plus a health check endpoint
pub fn router(weather: Weather) -> Router {
    let mcp = StreamableHttpService::new(
        move || Ok(weather.clone()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route("/health", get(health))
        .nest_service("/mcp", mcp)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "mcp-weather"}))
}

/// Serves the weather tools over HTTP until Ctrl-C
pub async fn serve_http(weather: Weather, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        "Starting MCP weather server with HTTP transport on http://{}/mcp",
        listener.local_addr()?
    );

    axum::serve(listener, router(weather))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
