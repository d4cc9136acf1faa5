use std::sync::Arc;

use clap::Parser;
use spendlens_server::{serve, CostExplorerServer, ServerConfig};
use spendlens_tools::SdkAwsClients;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout belongs to the stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::parse();
    tracing::info!(
        transport = %config.transport,
        log_group = %config.log_group,
        role = %config.cross_account_role,
        "starting spendlens-server"
    );

    let clients = SdkAwsClients::from_env(config.cross_account_role.clone()).await;
    let server = CostExplorerServer::new(Arc::new(clients), config.clone());

    serve(server, &config).await?;
    Ok(())
}
