use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Topical bucket an item belongs to. Drives both prompt content and slide layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Policy,
    Research,
    Business,
    Funding,
    /// Any tag outside the fixed set. Such items are dropped before analysis.
    #[serde(other)]
    Unrecognized,
}

impl Category {
    /// The four buckets the analyzer reports on, in report order.
    pub const ALL: [Category; 4] = [
        Category::Policy,
        Category::Research,
        Category::Business,
        Category::Funding,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Policy => "policy",
            Category::Research => "research",
            Category::Business => "business",
            Category::Funding => "funding",
            Category::Unrecognized => "unrecognized",
        }
    }
}

/// A normalized entry from a feed or the paper-search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub published: Option<DateTime<Utc>>,
    pub source: String,
    pub category: Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualKind {
    BarChart,
    PieChart,
    Table,
    #[default]
    None,
}

impl VisualKind {
    /// Accepts the canonical kebab-case names plus the spellings models tend to produce.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "bar-chart" | "bar" => Some(VisualKind::BarChart),
            "pie-chart" | "pie" => Some(VisualKind::PieChart),
            "table" => Some(VisualKind::Table),
            "none" | "" => Some(VisualKind::None),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VisualKind::BarChart => "bar-chart",
            VisualKind::PieChart => "pie-chart",
            VisualKind::Table => "table",
            VisualKind::None => "none",
        }
    }
}

/// Chart or table attached to a slide. Charts use `labels`/`values`, tables use `headers`/`rows`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Visualization {
    pub kind: VisualKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Vec<String>>,
}

impl Visualization {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.kind == VisualKind::None
    }
}

/// One record of the analyzed report. The generator renders one page per slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSlide {
    pub slide_number: u32,
    pub title: String,
    pub lead: String,
    pub insights: Vec<String>,
    #[serde(default)]
    pub visualization: Visualization,
    #[serde(default)]
    pub sources: Vec<String>,
    /// Synthesized stand-in, not model output.
    #[serde(default)]
    pub placeholder: bool,
}

impl ReportSlide {
    pub fn new(slide_number: u32, title: impl Into<String>, lead: impl Into<String>) -> Self {
        Self {
            slide_number,
            title: title.into(),
            lead: lead.into(),
            insights: Vec::new(),
            visualization: Visualization::none(),
            sources: Vec::new(),
            placeholder: false,
        }
    }

    pub fn with_insights(mut self, insights: Vec<String>) -> Self {
        self.insights = insights;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_as_lowercase() {
        let json = serde_json::to_string(&Category::Funding).unwrap();
        assert_eq!(json, "\"funding\"");
        let parsed: Category = serde_json::from_str("\"policy\"").unwrap();
        assert_eq!(parsed, Category::Policy);
    }

    #[test]
    fn test_unknown_category_is_unrecognized() {
        let parsed: Category = serde_json::from_str("\"sports\"").unwrap();
        assert_eq!(parsed, Category::Unrecognized);
        assert!(!Category::ALL.contains(&parsed));
    }

    #[test]
    fn test_news_item_without_date_serializes_null() {
        let item = NewsItem {
            title: "Launch".to_string(),
            url: String::new(),
            summary: String::new(),
            published: None,
            source: "SpaceNews".to_string(),
            category: Category::Business,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert!(json["published"].is_null());
        assert_eq!(json["category"], "business");
    }

    #[test]
    fn test_visual_kind_parse_variants() {
        assert_eq!(VisualKind::parse("bar-chart"), Some(VisualKind::BarChart));
        assert_eq!(VisualKind::parse("bar_chart"), Some(VisualKind::BarChart));
        assert_eq!(VisualKind::parse("Pie"), Some(VisualKind::PieChart));
        assert_eq!(VisualKind::parse("table"), Some(VisualKind::Table));
        assert_eq!(VisualKind::parse("none"), Some(VisualKind::None));
        assert_eq!(VisualKind::parse("scatter"), None);
    }

    #[test]
    fn test_slide_defaults_when_optional_fields_missing() {
        let slide: ReportSlide = serde_json::from_str(
            r#"{"slide_number": 4, "title": "T", "lead": "L", "insights": ["a"]}"#,
        )
        .unwrap();
        assert!(slide.visualization.is_none());
        assert!(slide.sources.is_empty());
        assert!(!slide.placeholder);
    }
}
