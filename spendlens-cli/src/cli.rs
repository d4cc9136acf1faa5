use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::Verbosity;
use serde_json::{json, Map, Value};
use spendlens_core::mcp::{McpClient, McpServerConfig, McpTransport};

/// Daily Bedrock usage tool
pub const DAILY_USAGE_TOOL: &str = "get_bedrock_daily_usage_stats";
/// Hourly Bedrock usage tool
pub const HOURLY_USAGE_TOOL: &str = "get_bedrock_hourly_usage_stats";
/// Agent prompt registered by the server
pub const AGENT_PROMPT: &str = "system_prompt_for_agent";

/// Example client for the spendlens MCP server
#[derive(Debug, Parser)]
#[command(name = "spendlens", author, about, version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// What to do; without one, inspect the server and show daily Bedrock usage
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Hostname of the MCP server, or a base URL with scheme
    #[arg(long, env = "MCP_SERVER_URL", default_value = "localhost", global = true)]
    pub host: String,

    /// Port of the MCP server; 443 switches to https
    #[arg(long, env = "MCP_SERVER_PORT", default_value_t = 8000, global = true)]
    pub port: u16,

    /// Path of the MCP endpoint
    #[arg(long, default_value = "/mcp", global = true)]
    pub path: String,

    /// AWS account to query when different from the server's own account
    ///
    /// Requires the cross-account role to exist in that account
    #[arg(long, env = "AWS_ACCOUNT_ID", global = true)]
    pub aws_account_id: Option<String>,

    #[clap(flatten)]
    pub verbose: Verbosity,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the server's prompts, resources and tools
    Inspect,
    /// Show Bedrock token usage
    Usage(Usage),
    /// Call any tool
    Call(Call),
    /// Print the agent system prompt
    Prompt,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct Usage {
    /// Days to look back
    #[arg(long, default_value_t = 7)]
    pub days: u32,

    /// Region the invocation logs live in
    #[arg(long, default_value = "us-east-1")]
    pub region: String,

    /// Break usage down by hour instead of by day
    #[arg(long)]
    pub hourly: bool,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct Call {
    /// Tool name
    pub tool: String,

    /// Arguments as a JSON object; wrapped in `params` unless already
    #[arg(long)]
    pub args: Option<String>,
}

impl Cli {
    /// URL of the MCP endpoint
    pub fn server_url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        if self.host.contains("://") {
            return format!("{}{}", self.host.trim_end_matches('/'), path);
        }

        let scheme = if self.port == 443 { "https" } else { "http" };
        format!("{}://{}:{}{}", scheme, self.host, self.port, path)
    }

    /// Blank account ids count as none
    pub fn account_id(&self) -> Option<&str> {
        self.aws_account_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn client(&self) -> Result<McpClient> {
        let config = McpServerConfig::new("spendlens", McpTransport::http(self.server_url()));
        Ok(McpClient::new(config)?)
    }
}

impl Default for Usage {
    fn default() -> Self {
        Self {
            days: 7,
            region: "us-east-1".to_string(),
            hourly: false,
        }
    }
}

impl Usage {
    pub fn tool(&self) -> &'static str {
        if self.hourly {
            HOURLY_USAGE_TOOL
        } else {
            DAILY_USAGE_TOOL
        }
    }

    pub fn arguments(&self, account_id: Option<&str>) -> Value {
        let mut params = Map::new();
        params.insert("days".to_string(), json!(self.days));
        params.insert("region".to_string(), json!(self.region));
        if let Some(id) = account_id {
            params.insert("aws_account_id".to_string(), json!(id));
        }
        json!({ "params": params })
    }
}

impl Call {
    /// Parse `--args`, wrap it as `{"params": ...}` and fill in the account id
    /// when the caller left it out.
    pub fn arguments(&self, account_id: Option<&str>) -> Result<Value> {
        let raw = self.args.as_deref().unwrap_or("{}");
        let parsed: Value = serde_json::from_str(raw).context("--args is not valid JSON")?;
        let Value::Object(object) = parsed else {
            bail!("--args must be a JSON object");
        };

        let mut arguments = if object.contains_key("params") {
            object
        } else {
            let mut wrapped = Map::new();
            wrapped.insert("params".to_string(), Value::Object(object));
            wrapped
        };

        if let (Some(id), Some(Value::Object(params))) = (account_id, arguments.get_mut("params")) {
            params
                .entry("aws_account_id")
                .or_insert_with(|| json!(id));
        }

        Ok(Value::Object(arguments))
    }
}
