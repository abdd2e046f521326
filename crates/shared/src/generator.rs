use anyhow::Result;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::Config;
use crate::html::HtmlDeck;
use crate::io;
use crate::markdown;
use crate::models::ReportSlide;
use crate::pdf::{DocumentRenderer, PdfRenderer};

/// Render the analyzed report. Returns the PDF path, or the Markdown path if rendering failed.
pub async fn generate(config: &Config) -> Result<PathBuf> {
    generate_with(config, &PdfRenderer::new()).await
}

#[tracing::instrument(name = "generator", skip_all)]
pub async fn generate_with(config: &Config, renderer: &dyn DocumentRenderer) -> Result<PathBuf> {
    let input = config.report_path();
    io::require_file(&input, "Run analyze-news first.")?;

    let slides: Vec<ReportSlide> = io::load_json(&input)?;
    info!(count = slides.len(), "Loaded analyzed report");

    io::ensure_dir(&config.output_dir)?;

    let md_path = config.artifact_path("md");
    io::write_text(&markdown::render(&slides), &md_path)?;
    info!(path = %md_path.display(), "Saved Markdown report");

    let rendered = (|| -> Result<PathBuf> {
        let html_path = config.artifact_path("html");
        io::write_text(&HtmlDeck::generate(&slides, config.run_date), &html_path)?;
        info!(path = %html_path.display(), "Saved HTML deck");

        let pdf_path = config.artifact_path("pdf");
        renderer.render(&slides, &pdf_path)?;
        Ok(pdf_path)
    })();

    match rendered {
        Ok(pdf_path) => {
            info!(path = %pdf_path.display(), "Saved PDF deck");
            Ok(pdf_path)
        }
        Err(e) => {
            warn!(
                error = %format!("{:#}", e),
                fallback = %md_path.display(),
                "Deck rendering failed; Markdown report is the deliverable"
            );
            Ok(md_path)
        }
    }
}
