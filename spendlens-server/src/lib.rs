//! MCP server exposing AWS Cost Explorer and Bedrock usage tools.
//!
//! [`CostExplorerServer`] registers the tools from `spendlens-tools`, the
//! `system_prompt_for_agent` prompt and the `config://app` resource. It is
//! served over stdio or streamable HTTP depending on [`ServerConfig`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use spendlens_server::{serve, CostExplorerServer, ServerConfig};
//! use spendlens_tools::SdkAwsClients;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::default();
//! let clients = SdkAwsClients::from_env(config.cross_account_role.clone()).await;
//!
//! let server = CostExplorerServer::new(Arc::new(clients), config.clone());
//! serve(server, &config).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod prompt;
pub mod router;

// Re-exports
pub use config::{ServerConfig, Transport};
pub use error::{BuildError, ConfigError, ServerError, ServerResult};
pub use handler::{CostExplorerServer, CONFIG_URI};
pub use prompt::{system_prompt_for_agent, SYSTEM_PROMPT_NAME};
pub use router::{serve, serve_http, serve_stdio, McpRouter};
