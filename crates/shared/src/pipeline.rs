use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::analyzer;
use crate::collector;
use crate::config::Config;
use crate::generator;

/// Collector, Analyzer, Generator in order. The first failing stage stops the run.
#[tracing::instrument(name = "pipeline", skip_all)]
pub async fn run(config: &Config) -> Result<PathBuf> {
    info!(window = %config.window.describe(), "Starting weekly report");

    // The analyzer needs the key; check it before any collection traffic
    config.require_api_key()?;

    let items = collector::collect(config)
        .await
        .context("collector stage failed")?;
    info!(items = items.len(), "Step 1/3 complete");

    let slides = analyzer::analyze(config)
        .await
        .context("analyzer stage failed")?;
    info!(slides = slides.len(), "Step 2/3 complete");

    let artifact = generator::generate(config)
        .await
        .context("generator stage failed")?;
    info!(path = %artifact.display(), "Step 3/3 complete");

    Ok(artifact)
}
