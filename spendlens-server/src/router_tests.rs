use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use spendlens_tools::test_utils::MockAwsClients;
use tower::ServiceExt;

use crate::config::ServerConfig;
use crate::error::BuildError;
use crate::handler::CostExplorerServer;
use crate::router::McpRouter;

fn server() -> CostExplorerServer {
    CostExplorerServer::new(Arc::new(MockAwsClients::new()), ServerConfig::default())
}

#[test]
fn test_rejects_relative_path() {
    let err = McpRouter::new(server()).mcp_path("mcp").build().unwrap_err();
    assert!(matches!(err, BuildError::InvalidPath(ref p) if p == "mcp"));
}

#[test]
fn test_rejects_health_path() {
    let err = McpRouter::new(server()).mcp_path("/health").build().unwrap_err();
    assert!(matches!(err, BuildError::ReservedPath(_)));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = McpRouter::new(server()).build().unwrap();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_mcp_endpoint_is_mounted_at_configured_path() {
    let app = McpRouter::new(server()).mcp_path("/rpc").build().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/rpc")
                .header("Content-Type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_ne!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mcp_endpoint_at_root_keeps_health() {
    let app = McpRouter::new(server()).mcp_path("/").build().unwrap();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
