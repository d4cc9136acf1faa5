//! The `spendlens-server` binary over stdio, driven by the spendlens MCP
//! client as a child process.

use serde_json::Value;
use spendlens_core::mcp::{McpClient, McpServerConfig, McpTransport};
use spendlens_server::CONFIG_URI;

fn stdio_client(extra_args: &[&str]) -> McpClient {
    let transport = McpTransport::stdio(env!("CARGO_BIN_EXE_spendlens-server"))
        .args(["--transport", "stdio"])
        .args(extra_args.iter().copied())
        .env("AWS_REGION", "us-east-1")
        .env("AWS_EC2_METADATA_DISABLED", "true")
        .env("RUST_LOG", "warn");
    McpClient::new(McpServerConfig::new("spendlens", transport)).unwrap()
}

#[tokio::test]
async fn test_binary_serves_tools_over_stdio() {
    let client = stdio_client(&["--log-group", "Invocations"]);

    let tools = client.list_tools().await.unwrap();
    let mut names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec![
            "get_bedrock_daily_usage_stats",
            "get_bedrock_hourly_usage_stats",
            "get_detailed_breakdown_by_day",
            "get_ec2_spend_last_day",
        ]
    );

    let text = client.read_resource(CONFIG_URI).await.unwrap();
    let config: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(config["server"], "aws_cloudwatch_logs");
    assert_eq!(config["transport"], "stdio");
    assert_eq!(config["default_log_group"], "Invocations");
    assert_eq!(config["tools"].as_array().map(Vec::len), Some(4));

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_binary_rejects_unwrapped_arguments_over_stdio() {
    let client = stdio_client(&[]);

    let output = client
        .call_tool("get_ec2_spend_last_day", serde_json::json!({"days": 30}))
        .await
        .unwrap();
    assert!(output.is_error);
    assert!(output.text.starts_with("Invalid input"), "{}", output.text);

    client.disconnect().await.unwrap();
}
