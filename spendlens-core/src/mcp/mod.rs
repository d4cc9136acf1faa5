//! MCP (Model Context Protocol) client
//!
//! Connects to an MCP server over stdio or Streamable HTTP and exposes its
//! tools, prompts, and resources with plain Rust types.
//!
//! ```rust,no_run
//! use spendlens_core::mcp::{McpClient, McpServerConfig, McpTransport};
//!
//! # async fn example() -> Result<(), spendlens_core::mcp::McpError> {
//! let client = McpClient::new(McpServerConfig::new(
//!     "spendlens",
//!     McpTransport::http("http://localhost:8000/mcp"),
//! ))?;
//!
//! for tool in client.list_tools().await? {
//!     println!("{}: {}", tool.name, tool.description);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod transport;

pub use client::{McpClient, PromptDefinition, ResourceDefinition, ToolCallOutput, ToolDefinition};
pub use transport::{HttpBuilder, McpServerConfig, McpTransport, StdioBuilder};

use thiserror::Error;

/// Errors that can occur during MCP operations
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MCP protocol error: {0}")]
    Protocol(String),
}
