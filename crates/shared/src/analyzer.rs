use anyhow::Result;
use std::collections::HashMap;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::feeds::truncate_chars;
use crate::io;
use crate::layout::{self, SectionPlan, CATEGORY_PLANS, INSIGHT_PLAN};
use crate::model::{GeminiClient, GenerationOptions, TextModel};
use crate::models::{Category, NewsItem, ReportSlide};
use crate::prompts;
use crate::slides::{self, NO_DATA_MARKER, UNAVAILABLE_MARKER};

/// Characters of a failed response kept in the error log.
const RAW_PREFIX_CHARS: usize = 300;

/// Analyze collected items with Gemini and save the slide report.
pub async fn analyze(config: &Config) -> Result<Vec<ReportSlide>> {
    let api_key = config.require_api_key()?;
    let model = GeminiClient::new(
        api_key.to_string(),
        config.gemini_model.clone(),
        config.gemini_base_url.clone(),
    )?;

    analyze_with(config, &model).await
}

/// Same as [`analyze`] with any model implementation.
#[tracing::instrument(name = "analyzer", skip_all)]
pub async fn analyze_with(config: &Config, model: &dyn TextModel) -> Result<Vec<ReportSlide>> {
    let input = config.raw_news_path();
    io::require_file(&input, "Run collect-news first.")?;
    io::ensure_dir(&config.data_dir)?;

    let items: Vec<NewsItem> = io::load_json(&input)?;
    info!(count = items.len(), "Loaded collected items");

    let mut buckets = partition(items);
    let system = prompts::system_instruction(&config.report_language);
    let options = GenerationOptions::default();

    let mut all_slides = layout::front_matter(config.run_date, &config.window);
    let mut calls_made = 0;

    for plan in CATEGORY_PLANS.iter() {
        let layout::Section::Category(category) = plan.section else {
            continue;
        };
        let items = buckets.remove(&category).unwrap_or_default();
        info!(
            category = category.as_str(),
            items = items.len(),
            slides = %format!("{}-{}", plan.start, plan.end()),
            "Generating section"
        );

        if items.is_empty() {
            warn!(category = category.as_str(), "No items; inserting placeholders");
            all_slides.extend(slides::placeholder_slides(
                plan,
                NO_DATA_MARKER,
                "No matching news was found this week.",
            ));
            continue;
        }

        if calls_made > 0 {
            tokio::time::sleep(config.pacing.between_model_calls).await;
        }
        calls_made += 1;

        let prompt = prompts::category_prompt(plan, &items);
        all_slides.extend(generate_section(model, &system, &prompt, &options, plan).await);
    }

    info!(
        slides = %format!("{}-{}", INSIGHT_PLAN.start, INSIGHT_PLAN.end()),
        "Generating insight section"
    );
    if calls_made > 0 {
        tokio::time::sleep(config.pacing.between_model_calls).await;
    }
    let insight_prompt = prompts::insight_prompt(&INSIGHT_PLAN, &all_slides[2..]);
    all_slides.extend(generate_section(model, &system, &insight_prompt, &options, &INSIGHT_PLAN).await);

    all_slides.sort_by_key(|s| s.slide_number);

    let quality = slides::quality_check(&all_slides);
    if quality.failed.is_empty() {
        info!(passed = quality.passed.len(), "Quality check passed");
    } else {
        for (number, problems) in &quality.failed {
            warn!(slide = number, problems = %problems.join("; "), "Quality check issue");
        }
        warn!(
            passed = quality.passed.len(),
            failed = quality.failed.len(),
            slides = ?quality.failed_numbers(),
            "Quality check found incomplete slides"
        );
    }

    let output = config.report_path();
    io::save_json(&all_slides, &output)?;
    info!(count = all_slides.len(), path = %output.display(), "Saved analyzed report");

    Ok(all_slides)
}

/// Split items into the four category buckets. Unrecognized categories are dropped.
pub fn partition(items: Vec<NewsItem>) -> HashMap<Category, Vec<NewsItem>> {
    let mut buckets: HashMap<Category, Vec<NewsItem>> =
        Category::ALL.iter().map(|c| (*c, Vec::new())).collect();

    for item in items {
        if let Some(bucket) = buckets.get_mut(&item.category) {
            bucket.push(item);
        }
    }

    buckets
}

/// One model call for one section. Any failure yields the full placeholder set.
async fn generate_section(
    model: &dyn TextModel,
    system: &str,
    prompt: &str,
    options: &GenerationOptions,
    plan: &SectionPlan,
) -> Vec<ReportSlide> {
    let fallback = || {
        slides::placeholder_slides(
            plan,
            UNAVAILABLE_MARKER,
            "Analysis data could not be generated for this section.",
        )
    };

    let raw = match model.generate(system, prompt, options).await {
        Ok(raw) => raw,
        Err(e) => {
            error!(section = plan.label, error = %format!("{:#}", e), "Model call failed");
            return fallback();
        }
    };

    let decoded = match slides::decode_slides(&raw) {
        Ok(decoded) => decoded,
        Err(e) => {
            error!(
                section = plan.label,
                error = %e,
                response_prefix = %truncate_chars(&raw, RAW_PREFIX_CHARS),
                "Could not parse model response"
            );
            return fallback();
        }
    };

    for issue in &decoded.issues {
        warn!(
            section = plan.label,
            element = issue.index,
            field = issue.field,
            problem = %issue.message,
            "Slide field did not validate"
        );
    }

    match slides::assemble_section(plan, decoded.slides) {
        Some(section) => {
            info!(section = plan.label, count = section.len(), "Section generated");
            section
        }
        None => {
            error!(
                section = plan.label,
                response_prefix = %truncate_chars(&raw, RAW_PREFIX_CHARS),
                "Model returned no usable slides"
            );
            fallback()
        }
    }
}
