//! Turning model output into slide records, and checking the assembled deck.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::DecodeError;
use crate::layout::SectionPlan;
use crate::models::{ReportSlide, VisualKind, Visualization};

pub const NO_DATA_MARKER: &str = "No data this week";
pub const UNAVAILABLE_MARKER: &str = "Analysis unavailable";

/// A field of one decoded element that did not validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Position of the element in the model's array.
    pub index: usize,
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct DecodedSlides {
    pub slides: Vec<DecodedSlide>,
    pub issues: Vec<FieldIssue>,
}

/// A slide whose number may still be missing before section assembly.
#[derive(Debug, Clone)]
pub struct DecodedSlide {
    pub slide_number: Option<u32>,
    pub slide: ReportSlide,
}

/// Remove a surrounding Markdown code fence, with or without a language tag.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the rest of the opening line (e.g. "json")
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Decode a model response into slides, collecting per-field problems instead of failing.
pub fn decode_slides(raw: &str) -> Result<DecodedSlides, DecodeError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))?;

    let elements = match value {
        Value::Array(elements) => elements,
        Value::Object(mut object) => match object.remove("slides") {
            Some(Value::Array(elements)) => elements,
            _ => return Err(DecodeError::NotAnArray("an object")),
        },
        Value::String(_) => return Err(DecodeError::NotAnArray("a string")),
        Value::Number(_) => return Err(DecodeError::NotAnArray("a number")),
        Value::Bool(_) => return Err(DecodeError::NotAnArray("a boolean")),
        Value::Null => return Err(DecodeError::NotAnArray("null")),
    };

    let mut decoded = DecodedSlides::default();
    for (index, element) in elements.into_iter().enumerate() {
        match element {
            Value::Object(object) => {
                let slide = decode_one(index, &object, &mut decoded.issues);
                decoded.slides.push(slide);
            }
            _ => decoded.issues.push(FieldIssue {
                index,
                field: "slide",
                message: "element is not an object; skipped".to_string(),
            }),
        }
    }

    Ok(decoded)
}

fn decode_one(index: usize, object: &Map<String, Value>, issues: &mut Vec<FieldIssue>) -> DecodedSlide {
    let mut issue = |field: &'static str, message: &str| {
        issues.push(FieldIssue {
            index,
            field,
            message: message.to_string(),
        })
    };

    let slide_number = match object.get("slide_number") {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    if slide_number.is_none() {
        issue("slide_number", "missing or not a positive integer");
    }

    let title = string_field(object, "title").unwrap_or_default();
    if title.is_empty() {
        issue("title", "missing or empty");
    }

    let lead = string_field(object, "lead").unwrap_or_default();
    if lead.is_empty() {
        issue("lead", "missing or empty");
    }

    let insights_value = object.get("insights").or_else(|| object.get("content"));
    let insights = match insights_value {
        Some(Value::Array(values)) => {
            let (strings, rejected) = string_list(values);
            if rejected > 0 {
                issue("insights", &format!("{} non-text entries dropped", rejected));
            }
            strings
        }
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    };
    if insights.is_empty() {
        issue("insights", "missing or empty");
    }

    let visualization = match object.get("visualization") {
        Some(Value::Object(viz)) => decode_visualization(viz, &mut issue),
        Some(Value::Null) | None => Visualization::none(),
        Some(_) => {
            issue("visualization", "not an object; treated as none");
            Visualization::none()
        }
    };

    let sources = match object.get("sources") {
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        _ => Vec::new(),
    };

    DecodedSlide {
        slide_number,
        slide: ReportSlide {
            slide_number: slide_number.unwrap_or(0),
            title,
            lead,
            insights,
            visualization,
            sources,
            placeholder: false,
        },
    }
}

fn decode_visualization(
    viz: &Map<String, Value>,
    issue: &mut impl FnMut(&'static str, &str),
) -> Visualization {
    let raw_kind = string_field(viz, "kind").unwrap_or_default();
    let kind = match VisualKind::parse(&raw_kind) {
        Some(kind) => kind,
        None => {
            issue(
                "visualization.kind",
                &format!("unknown kind {:?}; treated as none", raw_kind),
            );
            VisualKind::None
        }
    };

    let labels = match viz.get("labels") {
        Some(Value::Array(values)) => string_list(values).0,
        _ => Vec::new(),
    };
    let values: Vec<f64> = match viz.get("values") {
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(|v| match v {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    let headers = match viz.get("headers") {
        Some(Value::Array(values)) => string_list(values).0,
        _ => Vec::new(),
    };
    let rows = match viz.get("rows") {
        Some(Value::Array(rows)) => rows
            .iter()
            .filter_map(|row| match row {
                Value::Array(cells) => Some(
                    cells
                        .iter()
                        .map(|c| match c {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect(),
                ),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    if matches!(kind, VisualKind::BarChart | VisualKind::PieChart) && labels.len() != values.len() {
        issue(
            "visualization.values",
            &format!("{} labels but {} numeric values", labels.len(), values.len()),
        );
    }

    Visualization {
        kind,
        labels,
        values,
        headers,
        rows,
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key) {
        Some(Value::String(s)) => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Non-empty strings kept, everything else counted as rejected.
fn string_list(values: &[Value]) -> (Vec<String>, usize) {
    let mut strings = Vec::with_capacity(values.len());
    let mut rejected = 0;
    for value in values {
        match value {
            Value::String(s) if !s.trim().is_empty() => strings.push(s.trim().to_string()),
            _ => rejected += 1,
        }
    }
    (strings, rejected)
}

/// Stand-in slides for a whole section.
pub fn placeholder_slides(plan: &SectionPlan, marker: &str, message: &str) -> Vec<ReportSlide> {
    plan.numbers()
        .enumerate()
        .map(|(i, number)| placeholder_slide(plan, number, i, marker, message))
        .collect()
}

fn placeholder_slide(
    plan: &SectionPlan,
    number: u32,
    position: usize,
    marker: &str,
    message: &str,
) -> ReportSlide {
    let mut slide = ReportSlide::new(number, format!("{} ({})", plan.label, position + 1), marker)
        .with_insights(vec![message.to_string()]);
    slide.placeholder = true;
    slide
}

/// Fit decoded slides into the section's planned numbers.
///
/// Returns `None` when nothing usable was decoded so the caller can fall back to placeholders.
pub fn assemble_section(plan: &SectionPlan, decoded: Vec<DecodedSlide>) -> Option<Vec<ReportSlide>> {
    if decoded.is_empty() {
        return None;
    }

    let mut placed: BTreeMap<u32, ReportSlide> = BTreeMap::new();
    let mut unplaced = Vec::new();

    for DecodedSlide { slide_number, slide } in decoded {
        match slide_number {
            Some(n) if plan.contains(n) && !placed.contains_key(&n) => {
                placed.insert(n, slide);
            }
            _ => unplaced.push(slide),
        }
    }

    // Slides with a missing, duplicate or out-of-range number take the first free slot
    let mut unplaced = unplaced.into_iter();
    for number in plan.numbers() {
        if placed.contains_key(&number) {
            continue;
        }
        match unplaced.next() {
            Some(mut slide) => {
                slide.slide_number = number;
                placed.insert(number, slide);
            }
            None => break,
        }
    }

    let slides = plan
        .numbers()
        .enumerate()
        .map(|(i, number)| {
            placed.remove(&number).unwrap_or_else(|| {
                placeholder_slide(
                    plan,
                    number,
                    i,
                    UNAVAILABLE_MARKER,
                    "The model returned fewer slides than planned.",
                )
            })
        })
        .collect();

    Some(slides)
}

/// Result of the non-blocking lint over the assembled deck.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualityReport {
    pub passed: Vec<u32>,
    pub failed: Vec<(u32, Vec<String>)>,
}

impl QualityReport {
    pub fn failed_numbers(&self) -> Vec<u32> {
        self.failed.iter().map(|(n, _)| *n).collect()
    }
}

/// Check required fields on every slide. Never blocks saving.
pub fn quality_check(slides: &[ReportSlide]) -> QualityReport {
    let mut report = QualityReport::default();

    for slide in slides {
        let mut problems = Vec::new();

        if slide.lead.trim().is_empty() {
            problems.push("lead is empty".to_string());
        }
        if slide.insights.is_empty() {
            problems.push("no insights".to_string());
        }

        let viz = &slide.visualization;
        match viz.kind {
            VisualKind::BarChart | VisualKind::PieChart => {
                if viz.labels.is_empty() {
                    problems.push(format!("{} has no labels", viz.kind.as_str()));
                } else if viz.labels.len() != viz.values.len() {
                    problems.push(format!("{} labels and values differ in length", viz.kind.as_str()));
                }
            }
            VisualKind::Table => {
                if viz.headers.is_empty() || viz.rows.is_empty() {
                    problems.push("table needs headers and rows".to_string());
                }
            }
            VisualKind::None => {}
        }

        if problems.is_empty() {
            report.passed.push(slide.slide_number);
        } else {
            report.failed.push((slide.slide_number, problems));
        }
    }

    report
}
