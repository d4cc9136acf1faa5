//! Server configuration from flags and environment variables.

use clap::Parser;
use serde::Serialize;
use spendlens_tools::aws::session::DEFAULT_CROSS_ACCOUNT_ROLE;
use spendlens_tools::DEFAULT_LOG_GROUP;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// How the server talks to its MCP client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// JSON-RPC over stdin/stdout
    Stdio,
    /// Streamable HTTP with server-sent events
    Http,
}

impl FromStr for Transport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "sse" | "http" | "streamable-http" => Ok(Transport::Http),
            other => Err(ConfigError::UnknownTransport(other.to_string())),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Stdio => write!(f, "stdio"),
            Transport::Http => write!(f, "http"),
        }
    }
}

/// MCP server exposing AWS Cost Explorer and Bedrock usage tools
#[derive(Debug, Clone, PartialEq, Parser, Serialize)]
#[command(name = "spendlens-server", version, about)]
pub struct ServerConfig {
    /// Transport: stdio, or sse/http/streamable-http for HTTP
    #[arg(long, env = "MCP_TRANSPORT", default_value = "stdio")]
    pub transport: Transport,

    /// Address to listen on (HTTP transport)
    #[arg(long, env = "MCP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on (HTTP transport)
    #[arg(long, env = "MCP_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Path the MCP endpoint is mounted at (HTTP transport)
    #[arg(long, env = "MCP_PATH", default_value = "/mcp")]
    pub path: String,

    /// Log group the Bedrock usage tools read when a request names none
    #[arg(long, env = "BEDROCK_LOG_GROUP_NAME", default_value = DEFAULT_LOG_GROUP)]
    pub log_group: String,

    /// Role assumed in other accounts for cross-account requests
    #[arg(long, env = "CROSS_ACCOUNT_ROLE_NAME", default_value = DEFAULT_CROSS_ACCOUNT_ROLE)]
    pub cross_account_role: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            host: "0.0.0.0".to_string(),
            port: 8000,
            path: "/mcp".to_string(),
            log_group: DEFAULT_LOG_GROUP.to_string(),
            cross_account_role: DEFAULT_CROSS_ACCOUNT_ROLE.to_string(),
        }
    }
}

impl ServerConfig {
    /// `host:port` for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
