//! MCP request handling: tool dispatch, the agent prompt and the config
//! resource.

use std::sync::Arc;

use rmcp::model::{
    AnnotateAble, CallToolRequestParam, CallToolResult, Content, GetPromptRequestParam,
    GetPromptResult, Implementation, ListPromptsResult, ListResourcesResult, ListToolsResult,
    PaginatedRequestParam, Prompt, PromptArgument, PromptMessage, PromptMessageRole, RawResource,
    ReadResourceRequestParam, ReadResourceResult, ResourceContents, ServerCapabilities,
    ServerInfo, Tool as McpTool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler};
use serde_json::{json, Map, Value};
use spendlens_core::DynTool;
use spendlens_tools::AwsClients;

use crate::config::ServerConfig;
use crate::prompt::{system_prompt_for_agent, SYSTEM_PROMPT_NAME};

/// URI of the effective-configuration resource
pub const CONFIG_URI: &str = "config://app";

const SERVER_NAME: &str = "aws_cloudwatch_logs";

/// MCP server exposing the cost and usage tools.
///
/// Cheap to clone; the HTTP transport creates one per session.
#[derive(Clone)]
pub struct CostExplorerServer {
    tools: Arc<Vec<Box<dyn DynTool>>>,
    clients: Arc<dyn AwsClients>,
    config: Arc<ServerConfig>,
}

impl CostExplorerServer {
    /// Register every tool against `clients`.
    pub fn new(clients: Arc<dyn AwsClients>, config: ServerConfig) -> Self {
        let tools = spendlens_tools::all_tools(clients.clone(), &config.log_group);
        Self::with_tools(clients, config, tools)
    }

    /// Serve an explicit set of tools.
    pub fn with_tools(
        clients: Arc<dyn AwsClients>,
        config: ServerConfig,
        tools: Vec<Box<dyn DynTool>>,
    ) -> Self {
        Self {
            tools: Arc::new(tools),
            clients,
            config: Arc::new(config),
        }
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run a tool by name. Tool failures are reported in the result, not as
    /// protocol errors.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> Result<CallToolResult, ErrorData> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ErrorData::invalid_params(format!("Unknown tool: {}", name), None))?;

        tracing::info!(tool = name, arguments = %arguments, "calling tool");
        match tool.execute_raw(arguments).await {
            Ok(result) => Ok(CallToolResult::success(vec![Content::text(result.as_text())])),
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "tool failed");
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
        }
    }

    /// The agent system prompt. A blank account means the server's own.
    pub async fn agent_prompt(&self, account_id: Option<&str>) -> Result<String, ErrorData> {
        let account_id = match account_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => self.clients.caller_account().await.map_err(|e| {
                ErrorData::internal_error(format!("Could not resolve the caller account: {}", e), None)
            })?,
        };
        Ok(system_prompt_for_agent(&account_id))
    }

    /// JSON view of the effective, non-secret configuration
    pub fn config_document(&self) -> Value {
        json!({
            "server": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "transport": self.config.transport,
            "host": self.config.host,
            "port": self.config.port,
            "path": self.config.path,
            "default_log_group": self.config.log_group,
            "cross_account_role": self.config.cross_account_role,
            "tools": self.tool_names(),
        })
    }
}

fn mcp_tool(tool: &dyn DynTool) -> McpTool {
    let schema = match tool.input_schema() {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    McpTool::new(tool.name().to_string(), tool.description().to_string(), Arc::new(schema))
}

impl ServerHandler for CostExplorerServer {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = SERVER_NAME.to_string();
        server_info.version = env!("CARGO_PKG_VERSION").to_string();

        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder()
            .enable_tools()
            .enable_prompts()
            .enable_resources()
            .build();
        info.server_info = server_info;
        info.instructions = Some(
            "Answers questions about AWS spend: EC2 and per-service costs from Cost Explorer, \
             and Amazon Bedrock token usage from model invocation logs. Every tool takes its \
             arguments under a `params` object."
                .to_string(),
        );
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(
            self.tools.iter().map(|t| mcp_tool(t.as_ref())).collect(),
        ))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let arguments = request
            .arguments
            .map(Value::Object)
            .unwrap_or_else(|| json!({}));
        self.dispatch(&request.name, arguments).await
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        let argument = PromptArgument {
            name: "aws_account_id".to_string(),
            title: None,
            description: Some(
                "AWS account to analyze; defaults to the server's own account".to_string(),
            ),
            required: Some(false),
        };
        Ok(ListPromptsResult::with_all_items(vec![Prompt::new(
            SYSTEM_PROMPT_NAME,
            Some("System prompt for an AWS cost analysis agent"),
            Some(vec![argument]),
        )]))
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        if request.name != SYSTEM_PROMPT_NAME {
            return Err(ErrorData::invalid_params(
                format!("Unknown prompt: {}", request.name),
                None,
            ));
        }

        let account_id = request
            .arguments
            .as_ref()
            .and_then(|args| args.get("aws_account_id"))
            .and_then(Value::as_str);
        let text = self.agent_prompt(account_id).await?;

        Ok(GetPromptResult {
            description: Some("System prompt for an AWS cost analysis agent".to_string()),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        let mut resource = RawResource::new(CONFIG_URI, "config");
        resource.description = Some("Effective server configuration".to_string());
        resource.mime_type = Some("application/json".to_string());
        Ok(ListResourcesResult::with_all_items(vec![resource.no_annotation()]))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        if request.uri != CONFIG_URI {
            return Err(ErrorData::resource_not_found(
                format!("Unknown resource: {}", request.uri),
                None,
            ));
        }

        let text = serde_json::to_string_pretty(&self.config_document())
            .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, CONFIG_URI)],
        })
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
