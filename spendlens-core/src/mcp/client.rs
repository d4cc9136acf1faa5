use super::{McpError, McpServerConfig, McpTransport};
use rmcp::model::{
    CallToolRequestParam, GetPromptRequestParam, PromptMessageContent, ReadResourceRequestParam,
    ResourceContents,
};
use rmcp::service::RunningService;
use rmcp::transport::streamable_http_client::{
    StreamableHttpClientTransport, StreamableHttpClientTransportConfig,
};
use rmcp::transport::TokioChildProcess;
use rmcp::{RoleClient, ServiceExt};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::RwLock;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// MCP client wrapper that provides lazy connection and typed access to a
/// server's tools, prompts, and resources
pub struct McpClient {
    name: String,
    config: McpServerConfig,
    service: Arc<RwLock<Option<RunningService<RoleClient, ()>>>>,
}

impl McpClient {
    /// Create a new MCP client from configuration
    ///
    /// The client is not connected until `connect()` is called or a method that requires
    /// connection is invoked.
    pub fn new(config: McpServerConfig) -> Result<Self, McpError> {
        Ok(Self {
            name: config.name.clone(),
            config,
            service: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the server name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connect to the MCP server. Calling it again while connected is a no-op.
    pub async fn connect(&self) -> Result<(), McpError> {
        let mut service_guard = self.service.write().await;

        if service_guard.is_some() {
            return Ok(());
        }

        let service: RunningService<RoleClient, ()> = match &self.config.transport {
            McpTransport::Stdio { command, args, env } => {
                let mut cmd = Command::new(command);
                cmd.args(args);
                for (key, value) in env {
                    cmd.env(key, value);
                }

                let transport = TokioChildProcess::new(cmd).map_err(|e| {
                    McpError::Transport(format!("Failed to create child process: {}", e))
                })?;

                ().serve(transport).await.map_err(|e| {
                    McpError::Connection(format!("Failed to connect to server: {}", e))
                })?
            }
            McpTransport::Http { url, headers } => {
                let config = StreamableHttpClientTransportConfig::with_uri(url.clone());

                let mut header_map = HeaderMap::new();
                for (key, value) in headers {
                    let header_name = HeaderName::try_from(key.as_str()).map_err(|e| {
                        McpError::Config(format!("Invalid header name '{}': {}", key, e))
                    })?;
                    let header_value = HeaderValue::try_from(value.as_str()).map_err(|e| {
                        McpError::Config(format!("Invalid header value for '{}': {}", key, e))
                    })?;
                    header_map.insert(header_name, header_value);
                }

                let http_client = reqwest::Client::builder()
                    .default_headers(header_map)
                    .build()
                    .map_err(|e| {
                        McpError::Transport(format!("Failed to create HTTP client: {}", e))
                    })?;

                let transport = StreamableHttpClientTransport::with_client(http_client, config);

                ().serve(transport).await.map_err(|e| {
                    McpError::Connection(format!("Failed to connect to {}: {}", url, e))
                })?
            }
        };

        tracing::debug!(server = %self.name, "connected to MCP server");
        *service_guard = Some(service);
        Ok(())
    }

    /// List available tools from the MCP server
    pub async fn list_tools(&self) -> Result<Vec<ToolDefinition>, McpError> {
        self.connect().await?;

        let service_guard = self.service.read().await;
        let service = connected(&service_guard)?;

        let result = service
            .list_tools(Default::default())
            .await
            .map_err(|e| McpError::Protocol(format!("Failed to list tools: {}", e)))?;

        Ok(result
            .tools
            .into_iter()
            .map(|tool| ToolDefinition {
                name: tool.name.to_string(),
                description: tool.description.unwrap_or_default().to_string(),
                input_schema: Value::Object((*tool.input_schema).clone()),
            })
            .collect())
    }

    /// Call a tool on the MCP server
    ///
    /// A tool that ran but reported failure is returned as `Ok` with
    /// `is_error` set; only protocol-level failures are `Err`.
    pub async fn call_tool(
        &self,
        name: impl Into<String>,
        arguments: Value,
    ) -> Result<ToolCallOutput, McpError> {
        self.connect().await?;

        let service_guard = self.service.read().await;
        let service = connected(&service_guard)?;

        let name: String = name.into();
        let params = CallToolRequestParam {
            name: name.into(),
            arguments: arguments.as_object().cloned(),
        };

        let result = service
            .call_tool(params)
            .await
            .map_err(|e| McpError::ToolExecution(format!("Tool execution failed: {}", e)))?;

        let text = result
            .content
            .iter()
            .filter_map(|content| content.raw.as_text().map(|t| t.text.as_str()))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(ToolCallOutput {
            text,
            is_error: result.is_error.unwrap_or(false),
        })
    }

    /// List the prompt templates the server offers
    pub async fn list_prompts(&self) -> Result<Vec<PromptDefinition>, McpError> {
        self.connect().await?;

        let service_guard = self.service.read().await;
        let service = connected(&service_guard)?;

        let result = service
            .list_prompts(Default::default())
            .await
            .map_err(|e| McpError::Protocol(format!("Failed to list prompts: {}", e)))?;

        Ok(result
            .prompts
            .into_iter()
            .map(|prompt| PromptDefinition {
                name: prompt.name,
                description: prompt.description.unwrap_or_default(),
                arguments: prompt
                    .arguments
                    .unwrap_or_default()
                    .into_iter()
                    .map(|arg| arg.name)
                    .collect(),
            })
            .collect())
    }

    /// Render a prompt and return the text of its messages joined by newlines
    pub async fn get_prompt(
        &self,
        name: impl Into<String>,
        arguments: Option<Map<String, Value>>,
    ) -> Result<String, McpError> {
        self.connect().await?;

        let service_guard = self.service.read().await;
        let service = connected(&service_guard)?;

        let result = service
            .get_prompt(GetPromptRequestParam {
                name: name.into(),
                arguments,
            })
            .await
            .map_err(|e| McpError::Protocol(format!("Failed to get prompt: {}", e)))?;

        Ok(result
            .messages
            .into_iter()
            .filter_map(|message| match message.content {
                PromptMessageContent::Text { text } => Some(text),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// List the resources the server offers
    pub async fn list_resources(&self) -> Result<Vec<ResourceDefinition>, McpError> {
        self.connect().await?;

        let service_guard = self.service.read().await;
        let service = connected(&service_guard)?;

        let result = service
            .list_resources(Default::default())
            .await
            .map_err(|e| McpError::Protocol(format!("Failed to list resources: {}", e)))?;

        Ok(result
            .resources
            .into_iter()
            .map(|resource| ResourceDefinition {
                uri: resource.raw.uri,
                name: resource.raw.name,
                description: resource.raw.description,
                mime_type: resource.raw.mime_type,
            })
            .collect())
    }

    /// Read a text resource by URI
    pub async fn read_resource(&self, uri: impl Into<String>) -> Result<String, McpError> {
        self.connect().await?;

        let service_guard = self.service.read().await;
        let service = connected(&service_guard)?;

        let uri = uri.into();
        let result = service
            .read_resource(ReadResourceRequestParam { uri: uri.clone() })
            .await
            .map_err(|e| McpError::Protocol(format!("Failed to read resource {}: {}", uri, e)))?;

        Ok(result
            .contents
            .into_iter()
            .filter_map(|contents| match contents {
                ResourceContents::TextResourceContents { text, .. } => Some(text),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Disconnect from the MCP server
    ///
    /// After disconnection, the client can be reconnected by calling `connect()` again.
    pub async fn disconnect(&self) -> Result<(), McpError> {
        let mut service_guard = self.service.write().await;

        if let Some(service) = service_guard.take() {
            service
                .cancel()
                .await
                .map_err(|e| McpError::Connection(format!("Failed to disconnect: {}", e)))?;
        }

        Ok(())
    }
}

fn connected(
    guard: &Option<RunningService<RoleClient, ()>>,
) -> Result<&RunningService<RoleClient, ()>, McpError> {
    guard
        .as_ref()
        .ok_or_else(|| McpError::Connection("Not connected".to_string()))
}

/// Tool definition from an MCP server
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's input
    pub input_schema: Value,
}

/// Outcome of a tool call
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallOutput {
    /// Text content blocks joined by newlines
    pub text: String,
    /// True when the tool reported a failure
    pub is_error: bool,
}

/// Prompt template advertised by an MCP server
#[derive(Debug, Clone)]
pub struct PromptDefinition {
    pub name: String,
    pub description: String,
    /// Argument names accepted by the prompt
    pub arguments: Vec<String>,
}

/// Resource advertised by an MCP server
#[derive(Debug, Clone)]
pub struct ResourceDefinition {
    pub uri: String,
    pub name: String,
    pub description: Option<String>,
    pub mime_type: Option<String>,
}
