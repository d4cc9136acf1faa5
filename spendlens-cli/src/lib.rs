pub mod cli;

use anyhow::{bail, Result};
use comfy_table::{presets, Table};
use serde_json::{Map, Value};
use spendlens_core::mcp::McpClient;

pub use cli::{Call, Cli, Commands, Usage};

const RULE: &str = "==================================================";

/// Run the selected command against the server
pub async fn run(cli: &Cli) -> Result<()> {
    let url = cli.server_url();
    tracing::info!(%url, "connecting to MCP server");
    println!("Connecting to MCP server at: {}", url);

    let client = cli.client()?;
    client.connect().await?;

    let result = match &cli.command {
        None => {
            inspect(&client).await?;
            usage(&client, &Usage::default(), cli.account_id()).await
        }
        Some(Commands::Inspect) => inspect(&client).await,
        Some(Commands::Usage(args)) => usage(&client, args, cli.account_id()).await,
        Some(Commands::Call(call)) => {
            let arguments = call.arguments(cli.account_id())?;
            call_tool(&client, &call.tool, arguments).await
        }
        Some(Commands::Prompt) => prompt(&client, cli.account_id()).await,
    };

    if let Err(e) = client.disconnect().await {
        tracing::debug!(error = %e, "disconnect failed");
    }
    result
}

fn section(title: &str, body: &str) {
    println!("{}", RULE);
    println!("{}", title);
    println!("{}", RULE);
    println!("{}", body);
    println!("{}", RULE);
}

fn listing(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_header(headers.to_vec());
    for row in rows {
        table.add_row(row);
    }
    table.to_string()
}

/// Print the server's prompts, resources and tools
pub async fn inspect(client: &McpClient) -> Result<()> {
    let prompts = client.list_prompts().await?;
    section(
        "Available prompts:",
        &listing(
            &["Name", "Arguments", "Description"],
            prompts
                .into_iter()
                .map(|p| vec![p.name, p.arguments.join(", "), p.description])
                .collect(),
        ),
    );

    let resources = client.list_resources().await?;
    section(
        "Available resources:",
        &listing(
            &["URI", "Name", "Type", "Description"],
            resources
                .into_iter()
                .map(|r| {
                    vec![
                        r.uri,
                        r.name,
                        r.mime_type.unwrap_or_default(),
                        r.description.unwrap_or_default(),
                    ]
                })
                .collect(),
        ),
    );

    let tools = client.list_tools().await?;
    section(
        "Available tools:",
        &listing(
            &["Name", "Description"],
            tools
                .into_iter()
                .map(|t| vec![t.name, first_line(&t.description).to_string()])
                .collect(),
        ),
    );
    Ok(())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default().trim()
}

/// Call a Bedrock usage tool and print its report
pub async fn usage(client: &McpClient, args: &Usage, account_id: Option<&str>) -> Result<()> {
    println!(
        "\nCalling {} tool with days={}, region={}:",
        args.tool(),
        args.days,
        args.region
    );
    let output = client
        .call_tool(args.tool(), args.arguments(account_id))
        .await?;
    if output.is_error {
        bail!("{} failed: {}", args.tool(), output.text);
    }
    section("Bedrock Usage Results:", &output.text);
    Ok(())
}

/// Call any tool and print its output
pub async fn call_tool(client: &McpClient, tool: &str, arguments: Value) -> Result<()> {
    tracing::debug!(%tool, %arguments, "calling tool");
    let output = client.call_tool(tool, arguments).await?;
    if output.is_error {
        bail!("{} failed: {}", tool, output.text);
    }
    println!("{}", output.text);
    Ok(())
}

/// Print the agent system prompt for `account_id`, or the server's account
pub async fn prompt(client: &McpClient, account_id: Option<&str>) -> Result<()> {
    let arguments = account_id.map(|id| {
        let mut args = Map::new();
        args.insert("aws_account_id".to_string(), Value::String(id.to_string()));
        args
    });
    let text = client.get_prompt(cli::AGENT_PROMPT, arguments).await?;
    println!("{}", text);
    Ok(())
}
