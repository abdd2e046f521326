use anyhow::Result;
use clap::Parser;
use shared::{logging, Config, LogSettings};
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "analyze-news")]
#[command(about = "Analyze collected news with Gemini into data/analyzed_report.json")]
struct Args {}

#[tokio::main]
async fn main() -> ExitCode {
    let _args = Args::parse();
    logging::init(&LogSettings::from_env());

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "analyze-news failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = Config::from_env()?;
    let slides = shared::analyzer::analyze(&config).await?;
    info!("Analyzed report has {} slides", slides.len());
    Ok(())
}
