use anyhow::Result;
use clap::Parser;
use shared::{logging, Config, LogSettings};
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "collect-news")]
#[command(about = "Collect this week's space news and papers into data/raw_news.json")]
struct Args {}

#[tokio::main]
async fn main() -> ExitCode {
    let _args = Args::parse();
    logging::init(&LogSettings::from_env());

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "collect-news failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = Config::from_env()?;
    let items = shared::collector::collect(&config).await?;
    info!("Collected {} items", items.len());
    Ok(())
}
