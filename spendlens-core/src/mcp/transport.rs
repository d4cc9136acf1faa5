use std::collections::HashMap;

/// Connection settings for one MCP server
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Server name for identification in logs
    pub name: String,
    /// Transport configuration
    pub transport: McpTransport,
}

impl McpServerConfig {
    /// Create a new MCP server configuration
    ///
    /// ```
    /// # use spendlens_core::mcp::{McpServerConfig, McpTransport};
    /// let config = McpServerConfig::new("spendlens", McpTransport::http("http://localhost:8000/mcp"));
    /// assert_eq!(config.name, "spendlens");
    /// ```
    pub fn new(name: impl Into<String>, transport: impl Into<McpTransport>) -> Self {
        Self {
            name: name.into(),
            transport: transport.into(),
        }
    }
}

/// MCP transport types
#[derive(Debug, Clone)]
pub enum McpTransport {
    /// Spawn a child process and communicate via stdio
    Stdio {
        /// Command to execute (e.g., "spendlens-server")
        command: String,
        /// Command-line arguments
        args: Vec<String>,
        /// Environment variables to pass to the process
        env: HashMap<String, String>,
    },
    /// Connect to an HTTP endpoint using the Streamable HTTP transport
    ///
    /// Requests are HTTP POSTs; responses and notifications stream back as
    /// server-sent events. All custom headers are sent with each request.
    Http {
        /// Server URL (typically ending in `/mcp`)
        url: String,
        /// HTTP headers (for authentication, API keys, etc.)
        headers: HashMap<String, String>,
    },
}

impl McpTransport {
    /// Create a stdio transport builder with the given command
    ///
    /// ```
    /// # use spendlens_core::mcp::McpTransport;
    /// let transport = McpTransport::stdio("spendlens-server")
    ///     .args(["--transport", "stdio"])
    ///     .env("AWS_PROFILE", "billing");
    /// ```
    pub fn stdio(command: impl Into<String>) -> StdioBuilder {
        StdioBuilder::new(command)
    }

    /// Create an HTTP transport builder with the given URL
    ///
    /// ```
    /// # use spendlens_core::mcp::McpTransport;
    /// let transport = McpTransport::http("https://costs.example.com/mcp")
    ///     .header("Authorization", "Bearer token");
    /// ```
    pub fn http(url: impl Into<String>) -> HttpBuilder {
        HttpBuilder::new(url)
    }
}

/// Builder for stdio transport configuration
#[derive(Debug, Clone)]
pub struct StdioBuilder {
    command: String,
    args: Vec<String>,
    env: HashMap<String, String>,
}

impl StdioBuilder {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }

    /// Add a single argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Set a single environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> McpTransport {
        self.into()
    }
}

impl From<StdioBuilder> for McpTransport {
    fn from(builder: StdioBuilder) -> Self {
        McpTransport::Stdio {
            command: builder.command,
            args: builder.args,
            env: builder.env,
        }
    }
}

/// Builder for HTTP transport configuration
#[derive(Debug, Clone)]
pub struct HttpBuilder {
    url: String,
    headers: HashMap<String, String>,
}

impl HttpBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
        }
    }

    /// Set a single header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> McpTransport {
        self.into()
    }
}

impl From<HttpBuilder> for McpTransport {
    fn from(builder: HttpBuilder) -> Self {
        McpTransport::Http {
            url: builder.url,
            headers: builder.headers,
        }
    }
}
