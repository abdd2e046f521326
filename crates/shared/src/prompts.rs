use crate::feeds::truncate_chars;
use crate::layout::SectionPlan;
use crate::models::{NewsItem, ReportSlide};

pub const MAX_ITEMS_PER_PROMPT: usize = 30;
pub const PROMPT_SUMMARY_CHARS: usize = 500;

const SLIDE_SHAPE: &str = r#"{"slide_number": <int>, "title": "<title>", "lead": "<one-sentence key message>", "insights": ["<insight>", ...], "visualization": {"kind": "bar-chart" | "pie-chart" | "table" | "none", "labels": ["<label>", ...], "values": [<number>, ...], "headers": ["<header>", ...], "rows": [["<cell>", ...], ...]}, "sources": ["<url or outlet>", ...]}"#;

/// System instruction shared by every call.
pub fn system_instruction(language: &str) -> String {
    format!(
        r#"You are the world's leading space business analyst. You turn raw weekly news and papers into a slide report for executives and investors.

Strict output rules:
- Return ONLY a JSON array. Do not wrap it in Markdown code fences.
- Every element has the shape {shape}
- "lead" is a single decisive sentence stating the slide's conclusion.
- "insights" holds 3 to 5 bullet points of at most 25 words each, each supported by the supplied items.
- For "bar-chart" and "pie-chart" fill "labels" and "values" with equal lengths. For "table" fill "headers" and "rows". For "none" omit them.
- "sources" lists the URLs or outlet names you relied on.
- Never invent facts that are not in the supplied material.
- Write all text in {language}."#,
        shape = SLIDE_SHAPE,
        language = language
    )
}

/// Prompt for one category section, embedding at most 30 items.
pub fn category_prompt(plan: &SectionPlan, items: &[NewsItem]) -> String {
    let news_text = items
        .iter()
        .take(MAX_ITEMS_PER_PROMPT)
        .enumerate()
        .map(|(i, item)| {
            format!(
                "[{}] Title: {}\n    URL: {}\n    Summary: {}\n    Published: {}",
                i + 1,
                item.title,
                item.url,
                truncate_chars(&item.summary, PROMPT_SUMMARY_CHARS),
                item.published
                    .map(|ts| ts.to_rfc3339())
                    .unwrap_or_else(|| "unknown".to_string())
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Below are this week's items for \"{label}\".\n\n\
        {news}\n\n\
        Analyse them and produce slides {start} to {end} ({count} slides) as a JSON array.\n\
        Slide plan:\n{plan}\n\n\
        Shape of each element: {shape}\n\
        Return only the JSON array.",
        label = plan.label,
        news = news_text,
        start = plan.start,
        end = plan.end(),
        count = plan.count,
        plan = directive_lines(plan),
        shape = SLIDE_SHAPE,
    )
}

/// Prompt for the closing insight section, built from the slides produced so far.
pub fn insight_prompt(plan: &SectionPlan, slides: &[ReportSlide]) -> String {
    let summary = slides
        .iter()
        .map(|slide| {
            let mut line = format!("[Slide {}] {}: {}", slide.slide_number, slide.title, slide.lead);
            let highlights: Vec<&str> = slide.insights.iter().take(2).map(String::as_str).collect();
            if !highlights.is_empty() {
                line.push_str(" / ");
                line.push_str(&highlights.join(" / "));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Below is a summary of this week's report.\n\n\
        {summary}\n\n\
        Based on the whole report, produce the insight and outlook slides for executives and \
        investors: slides {start} to {end} ({count} slides) as a JSON array.\n\
        Slide plan:\n{plan}\n\n\
        Shape of each element: {shape}\n\
        Return only the JSON array.",
        summary = summary,
        start = plan.start,
        end = plan.end(),
        count = plan.count,
        plan = directive_lines(plan),
        shape = SLIDE_SHAPE,
    )
}

fn directive_lines(plan: &SectionPlan) -> String {
    plan.numbers()
        .zip(plan.directives.iter())
        .map(|(number, directive)| format!("- Slide {}: {}", number, directive))
        .collect::<Vec<_>>()
        .join("\n")
}
