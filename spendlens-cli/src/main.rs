use std::process;

use anyhow::Result;
use clap::Parser;
use spendlens_cli::Cli;
use tracing_log::AsTrace;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.verbose.log_level_filter().as_trace())
        .with_writer(std::io::stderr)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Err(err) = spendlens_cli::run(&cli).await {
        eprintln!("{err:#}");
        process::exit(2);
    }
    Ok(())
}
