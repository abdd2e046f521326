use anyhow::Result;
use clap::Parser;
use shared::{logging, Config, LogSettings};
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "generate-report")]
#[command(about = "Render the analyzed report into the weekly slide deck")]
struct Args {}

#[tokio::main]
async fn main() -> ExitCode {
    let _args = Args::parse();
    logging::init(&LogSettings::from_env());

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "generate-report failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = Config::from_env()?;
    let path = shared::generator::generate(&config).await?;
    info!("Report saved to {}", path.display());
    Ok(())
}
