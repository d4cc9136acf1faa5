use super::*;
use rmcp::model::ResourceContents;
use rmcp::service::RunningService;
use rmcp::{RoleClient, ServiceExt};
use spendlens_tools::aws::AwsError;
use spendlens_tools::test_utils::{cost_group, cost_period, MockAwsClients};

fn server(mock: MockAwsClients) -> CostExplorerServer {
    CostExplorerServer::new(Arc::new(mock), ServerConfig::default())
}

fn text_of(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| c.raw.as_text().map(|t| t.text.clone()))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn connect(server: CostExplorerServer) -> RunningService<RoleClient, ()> {
    let (server_io, client_io) = tokio::io::duplex(4096);
    tokio::spawn(async move {
        if let Ok(running) = server.serve(server_io).await {
            let _ = running.waiting().await;
        }
    });
    ().serve(client_io).await.unwrap()
}

#[test]
fn test_registers_every_tool() {
    let server = server(MockAwsClients::new());
    assert_eq!(
        server.tool_names(),
        vec![
            "get_bedrock_daily_usage_stats",
            "get_bedrock_hourly_usage_stats",
            "get_ec2_spend_last_day",
            "get_detailed_breakdown_by_day",
        ]
    );
}

#[test]
fn test_server_info() {
    let info = server(MockAwsClients::new()).get_info();
    assert_eq!(info.server_info.name, "aws_cloudwatch_logs");
    assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
    assert!(info.capabilities.tools.is_some());
    assert!(info.capabilities.prompts.is_some());
    assert!(info.capabilities.resources.is_some());
}

#[tokio::test]
async fn test_dispatch_pretty_prints_json_results() {
    let mock = MockAwsClients::new().with_cost_response(|_| {
        Ok(vec![cost_period(
            "2024-05-07",
            "2024-05-08",
            vec![cost_group(&["t3.micro"], 0.25)],
        )])
    });
    let server = server(mock);

    let result = server
        .dispatch("get_ec2_spend_last_day", json!({"params": {}}))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(false));
    let text = text_of(&result);
    assert!(text.contains('\n'));
    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["instance_types"][0]["instance_type"], "t3.micro");
}

#[tokio::test]
async fn test_dispatch_reports_tool_errors_in_result() {
    let mock = MockAwsClients::new()
        .with_logs_error(AwsError::Authentication("AccessDeniedException".to_string()));
    let server = server(mock);

    let result = server
        .dispatch("get_bedrock_daily_usage_stats", json!({"params": {"days": 3}}))
        .await
        .unwrap();
    assert_eq!(result.is_error, Some(true));
    assert!(text_of(&result).contains("AccessDeniedException"));

    let result = server
        .dispatch("get_bedrock_daily_usage_stats", json!({"params": {"days": 0}}))
        .await
        .unwrap();
    assert_eq!(result.is_error, Some(true));
    assert!(text_of(&result).starts_with("Invalid input"));

    let result = server
        .dispatch("get_bedrock_daily_usage_stats", json!({"days": 3}))
        .await
        .unwrap();
    assert_eq!(result.is_error, Some(true));
    assert!(text_of(&result).starts_with("Invalid input"));
}

#[tokio::test]
async fn test_dispatch_unknown_tool() {
    let err = server(MockAwsClients::new())
        .dispatch("get_s3_spend", json!({}))
        .await
        .unwrap_err();
    assert!(err.message.contains("get_s3_spend"));
}

#[tokio::test]
async fn test_agent_prompt_account_resolution() {
    let server = server(MockAwsClients::new().with_caller_account("111111111111"));

    let prompt = server.agent_prompt(Some("222222222222")).await.unwrap();
    assert!(prompt.contains("for account 222222222222."));

    for blank in [None, Some(""), Some("   ")] {
        let prompt = server.agent_prompt(blank).await.unwrap();
        assert!(prompt.contains("for account 111111111111."));
    }
}

#[test]
fn test_config_document() {
    let config = ServerConfig {
        log_group: "Invocations".to_string(),
        ..ServerConfig::default()
    };
    let server = CostExplorerServer::new(Arc::new(MockAwsClients::new()), config);

    let doc = server.config_document();
    assert_eq!(doc["transport"], "stdio");
    assert_eq!(doc["default_log_group"], "Invocations");
    assert_eq!(doc["cross_account_role"], "BedrockCrossAccount2");
    assert_eq!(doc["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(doc["tools"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_session_over_in_memory_transport() {
    let client = connect(server(MockAwsClients::new().with_caller_account("333333333333"))).await;

    let tools = client.list_tools(Default::default()).await.unwrap();
    assert_eq!(tools.tools.len(), 4);
    let ec2 = tools
        .tools
        .iter()
        .find(|t| t.name == "get_ec2_spend_last_day")
        .unwrap();
    assert!(ec2.input_schema.contains_key("properties"));

    let result = client
        .call_tool(CallToolRequestParam {
            name: "get_bedrock_hourly_usage_stats".into(),
            arguments: None,
        })
        .await
        .unwrap();
    assert_eq!(text_of(&result), spendlens_tools::bedrock::NO_USAGE_DATA);

    let unknown = client
        .call_tool(CallToolRequestParam {
            name: "nope".into(),
            arguments: None,
        })
        .await;
    assert!(unknown.is_err());

    let prompts = client.list_prompts(Default::default()).await.unwrap();
    assert_eq!(prompts.prompts[0].name, SYSTEM_PROMPT_NAME);

    let prompt = client
        .get_prompt(GetPromptRequestParam {
            name: SYSTEM_PROMPT_NAME.to_string(),
            arguments: None,
        })
        .await
        .unwrap();
    assert_eq!(prompt.messages.len(), 1);

    let resources = client.list_resources(Default::default()).await.unwrap();
    assert_eq!(resources.resources[0].raw.uri, CONFIG_URI);

    let read = client
        .read_resource(ReadResourceRequestParam {
            uri: CONFIG_URI.to_string(),
        })
        .await
        .unwrap();
    match &read.contents[0] {
        ResourceContents::TextResourceContents { text, .. } => {
            let doc: Value = serde_json::from_str(text).unwrap();
            assert_eq!(doc["server"], "aws_cloudwatch_logs");
        }
        other => panic!("expected text contents, got {:?}", other),
    }

    let missing = client
        .read_resource(ReadResourceRequestParam {
            uri: "config://secrets".to_string(),
        })
        .await;
    assert!(missing.is_err());

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_prompt_reports_unresolvable_account() {
    struct NoSts;

    #[async_trait::async_trait]
    impl AwsClients for NoSts {
        async fn caller_account(&self) -> Result<String, AwsError> {
            Err(AwsError::Authentication("no credentials".to_string()))
        }

        async fn cost_explorer(
            &self,
            _target: &spendlens_tools::aws::AwsTarget,
        ) -> Result<Arc<dyn spendlens_tools::aws::CostExplorerClient>, AwsError> {
            Err(AwsError::Authentication("no credentials".to_string()))
        }

        async fn logs(
            &self,
            _target: &spendlens_tools::aws::AwsTarget,
        ) -> Result<Arc<dyn spendlens_tools::aws::LogsClient>, AwsError> {
            Err(AwsError::Authentication("no credentials".to_string()))
        }
    }

    let server = CostExplorerServer::with_tools(Arc::new(NoSts), ServerConfig::default(), vec![]);
    let err = server.agent_prompt(None).await.unwrap_err();
    assert!(err.message.contains("no credentials"));

    let result = server.dispatch("get_ec2_spend_last_day", json!({})).await;
    assert!(result.is_err());
}
