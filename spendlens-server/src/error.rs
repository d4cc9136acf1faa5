//! Error types for the spendlens server.

/// Invalid server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown transport '{0}': expected stdio, sse, http or streamable-http")]
    UnknownTransport(String),
}

/// Errors that can occur when building a router.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The MCP endpoint path does not start with `/`.
    #[error("Invalid MCP path '{0}': must start with '/'")]
    InvalidPath(String),

    /// The MCP endpoint would shadow the health check.
    #[error("MCP path '{0}' conflicts with the health check endpoint")]
    ReservedPath(String),
}

/// Errors that can occur while serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Router construction failed.
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// The HTTP listener could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure while serving.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The MCP session failed.
    #[error("MCP service error: {0}")]
    Service(String),
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let cases = [
            (
                ServerError::Build(BuildError::InvalidPath("mcp".to_string())),
                "Build error: Invalid MCP path 'mcp': must start with '/'",
            ),
            (
                ServerError::Service("connection closed".to_string()),
                "MCP service error: connection closed",
            ),
            (
                ServerError::Bind {
                    addr: "0.0.0.0:8000".to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
                },
                "Failed to bind 0.0.0.0:8000: in use",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }
}
