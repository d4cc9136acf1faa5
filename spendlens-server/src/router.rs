//! HTTP router and the stdio/HTTP serve loops.

use axum::routing::get;
use axum::{Json, Router};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::StreamableHttpService;
use rmcp::ServiceExt;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::config::{ServerConfig, Transport};
use crate::error::{BuildError, ServerError, ServerResult};
use crate::handler::CostExplorerServer;

/// Path of the liveness endpoint
pub const HEALTH_PATH: &str = "/health";

/// Builder for the HTTP router serving the MCP endpoint.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use spendlens_server::{CostExplorerServer, McpRouter, ServerConfig};
/// use spendlens_tools::SdkAwsClients;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let clients = SdkAwsClients::from_env("BedrockCrossAccount2").await;
/// let server = CostExplorerServer::new(Arc::new(clients), ServerConfig::default());
///
/// let app = McpRouter::new(server)
///     .mcp_path("/mcp")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct McpRouter {
    server: CostExplorerServer,
    mcp_path: String,
}

impl McpRouter {
    /// Create a router builder serving MCP at `/mcp`.
    pub fn new(server: CostExplorerServer) -> Self {
        Self {
            server,
            mcp_path: "/mcp".to_string(),
        }
    }

    /// Mount the MCP endpoint at `path` instead.
    pub fn mcp_path(mut self, path: impl Into<String>) -> Self {
        self.mcp_path = path.into();
        self
    }

    /// Build the router: the MCP streamable HTTP endpoint plus `GET /health`,
    /// with request tracing.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidPath`] if the MCP path does not start with
    /// `/`, and [`BuildError::ReservedPath`] if it is the health check path.
    pub fn build(self) -> Result<Router, BuildError> {
        if !self.mcp_path.starts_with('/') {
            return Err(BuildError::InvalidPath(self.mcp_path));
        }
        if self.mcp_path == HEALTH_PATH {
            return Err(BuildError::ReservedPath(self.mcp_path));
        }

        let server = self.server;
        let mcp = StreamableHttpService::new(
            move || Ok(server.clone()),
            LocalSessionManager::default().into(),
            Default::default(),
        );

        let router = Router::new().route(HEALTH_PATH, get(health));
        // axum cannot nest at the root
        let router = if self.mcp_path == "/" {
            router.fallback_service(mcp)
        } else {
            router.nest_service(&self.mcp_path, mcp)
        };

        Ok(router.layer(TraceLayer::new_for_http()))
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Serve MCP over stdin/stdout until the client disconnects.
pub async fn serve_stdio(server: CostExplorerServer) -> ServerResult<()> {
    tracing::info!("serving MCP over stdio");

    let running = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| ServerError::Service(e.to_string()))?;
    let reason = running
        .waiting()
        .await
        .map_err(|e| ServerError::Service(e.to_string()))?;

    tracing::info!(?reason, "stdio session ended");
    Ok(())
}

/// Serve MCP over streamable HTTP until Ctrl-C.
pub async fn serve_http(server: CostExplorerServer, config: &ServerConfig) -> ServerResult<()> {
    let router = McpRouter::new(server).mcp_path(config.path.clone()).build()?;

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!(address = %addr, path = %config.path, "serving MCP over HTTP");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Serve on the transport `config` selects.
pub async fn serve(server: CostExplorerServer, config: &ServerConfig) -> ServerResult<()> {
    match config.transport {
        Transport::Stdio => serve_stdio(server).await,
        Transport::Http => serve_http(server, config).await,
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
