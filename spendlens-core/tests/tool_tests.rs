use spendlens_core::{box_tool, Tool, ToolError, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ===== ToolResult Helper Method Tests =====

#[test]
fn test_tool_result_text_factory() {
    let result = ToolResult::text("Hello");
    assert_eq!(result.as_str(), Some("Hello"));

    let result2 = ToolResult::text(String::from("World"));
    assert_eq!(result2.as_str(), Some("World"));
}

#[test]
fn test_tool_result_json_factory() {
    #[derive(Serialize)]
    struct Spend {
        instance_type: String,
        cost: f64,
    }

    let result = ToolResult::json(Spend {
        instance_type: "m5.large".to_string(),
        cost: 12.5,
    })
    .unwrap();

    match result {
        ToolResult::Json(v) => {
            assert_eq!(v["instance_type"], "m5.large");
            assert_eq!(v["cost"], 12.5);
        }
        other => panic!("Expected Json, got {:?}", other),
    }
}

#[test]
fn test_tool_result_as_str_only_for_text() {
    let json_result = ToolResult::Json(serde_json::json!({"key": "value"}));
    assert_eq!(json_result.as_str(), None);
    assert!(json_result.as_text().contains("\"key\": \"value\""));
}

#[test]
fn test_tool_result_from_strings() {
    let owned: ToolResult = String::from("Test").into();
    let borrowed: ToolResult = "Test".into();
    assert_eq!(owned.as_str(), borrowed.as_str());
}

// ===== ToolError Tests =====

#[test]
fn test_tool_error_display() {
    assert_eq!(
        ToolError::InvalidInput("days must be between 1 and 90".into()).to_string(),
        "Invalid input: days must be between 1 and 90"
    );
    assert_eq!(
        ToolError::Aws("throttled".into()).to_string(),
        "AWS error: throttled"
    );
    assert_eq!(ToolError::from("plain").to_string(), "plain");
}

#[test]
fn test_tool_error_from_serde() {
    let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let tool_err: ToolError = err.into();
    assert!(matches!(tool_err, ToolError::Serialization(_)));
}

// ===== Tool trait through DynTool =====

#[derive(Debug, Deserialize, JsonSchema)]
struct GreetInput {
    /// Who to greet
    name: String,
    #[serde(default)]
    shout: bool,
}

struct GreetTool;

impl Tool for GreetTool {
    type Input = GreetInput;

    fn name(&self) -> &str {
        "greet"
    }

    fn description(&self) -> &str {
        "Greet someone"
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        if input.name.is_empty() {
            return Err(ToolError::InvalidInput("name is empty".into()));
        }
        let greeting = format!("Hello, {}", input.name);
        Ok(if input.shout {
            greeting.to_uppercase().into()
        } else {
            greeting.into()
        })
    }
}

#[test]
fn test_schema_carries_field_docs() {
    let tool = box_tool(GreetTool);
    let schema = tool.input_schema();

    assert_eq!(schema["properties"]["name"]["description"], "Who to greet");
    let required = schema["required"].as_array().unwrap();
    assert!(required.iter().any(|v| v == "name"));
    assert!(!required.iter().any(|v| v == "shout"));
}

#[tokio::test]
async fn test_dyn_tool_runs_with_defaults() {
    let tool = box_tool(GreetTool);
    let result = tool
        .execute_raw(serde_json::json!({"name": "ops"}))
        .await
        .unwrap();
    assert_eq!(result.as_str(), Some("Hello, ops"));
}

#[tokio::test]
async fn test_dyn_tool_propagates_tool_errors() {
    let tool = box_tool(GreetTool);
    let err = tool
        .execute_raw(serde_json::json!({"name": ""}))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid input: name is empty");
}
