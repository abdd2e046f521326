use clap::Parser;
use shared::{logging, pipeline, Config, LogSettings};
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "weekly-report")]
#[command(about = "Collect, analyze and render the weekly space business report")]
struct Args {}

#[tokio::main]
async fn main() -> ExitCode {
    let _args = Args::parse();
    logging::init(&LogSettings::from_env());

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Configuration error");
            return ExitCode::FAILURE;
        }
    };

    match pipeline::run(&config).await {
        Ok(path) => {
            info!(path = %path.display(), "Weekly report complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "Weekly report aborted");
            ExitCode::FAILURE
        }
    }
}
