use anyhow::{Context, Result};
use url::Url;

use crate::config::DateWindow;
use crate::models::Category;

pub const USER_AGENT: &str =
    "SpaceBusinessReportBot/1.0 (automated academic/business research; non-commercial)";

pub const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";
pub const ARXIV_SOURCE_LABEL: &str = "arXiv";
pub const ARXIV_MAX_RESULTS: u32 = 15;

const GOOGLE_NEWS_EN: &str = "https://news.google.com/rss/search?q={query}&hl=en-US&gl=US&ceid=US:en";
const GOOGLE_NEWS_JA: &str = "https://news.google.com/rss/search?q={query}&hl=ja&gl=JP&ceid=JP:ja";

/// Where a feed lives: a fixed URL, or a search template filled with a query and the date window.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceTarget {
    Url(String),
    /// `template` contains a `{query}` slot.
    Search { template: String, query: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedSource {
    pub name: String,
    pub category: Category,
    pub target: SourceTarget,
}

impl FeedSource {
    pub fn url(name: impl Into<String>, category: Category, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category,
            target: SourceTarget::Url(url.into()),
        }
    }

    pub fn search(
        name: impl Into<String>,
        category: Category,
        template: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            target: SourceTarget::Search {
                template: template.into(),
                query: query.into(),
            },
        }
    }

    /// Build the request URL for this source within `window`.
    pub fn resolve_url(&self, window: &DateWindow) -> Result<Url> {
        let raw = match &self.target {
            SourceTarget::Url(url) => url.clone(),
            SourceTarget::Search { template, query } => {
                // Google News treats `before:` as exclusive, so push it one day past the end date
                let query = format!(
                    "{} after:{} before:{}",
                    query,
                    window.start.format("%Y-%m-%d"),
                    (window.end + chrono::Duration::days(1)).format("%Y-%m-%d")
                );
                template.replace("{query}", &urlencoding::encode(&query))
            }
        };

        Url::parse(&raw).with_context(|| format!("Invalid feed URL for {}: {}", self.name, raw))
    }
}

/// Paper-search API settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ArxivSettings {
    pub base_url: String,
    pub queries: Vec<String>,
    pub max_results: u32,
}

impl Default for ArxivSettings {
    fn default() -> Self {
        Self {
            base_url: ARXIV_API_URL.to_string(),
            queries: vec![
                "cat:astro-ph.IM".to_string(),
                "cat:astro-ph.EP".to_string(),
                "ti:commercial AND ti:space".to_string(),
            ],
            max_results: ARXIV_MAX_RESULTS,
        }
    }
}

pub fn default_feed_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::url("SpaceNews", Category::Business, "https://spacenews.com/feed/"),
        FeedSource::search(
            "Google News - Space Business (EN)",
            Category::Business,
            GOOGLE_NEWS_EN,
            "space business",
        ),
        FeedSource::search(
            "Google News - Space Policy (EN)",
            Category::Policy,
            GOOGLE_NEWS_EN,
            "space policy",
        ),
        FeedSource::search(
            "Google News - Space Funding (EN)",
            Category::Funding,
            GOOGLE_NEWS_EN,
            "space startup funding",
        ),
        FeedSource::search(
            "Google News - Space Europe (EN)",
            Category::Policy,
            GOOGLE_NEWS_EN,
            "ESA OR space Europe",
        ),
        FeedSource::search(
            "Google News - Space China (EN)",
            Category::Policy,
            GOOGLE_NEWS_EN,
            "China space",
        ),
        FeedSource::search(
            "Google News - Space Business (JA)",
            Category::Business,
            GOOGLE_NEWS_JA,
            "宇宙 ビジネス",
        ),
        FeedSource::search(
            "Google News - Space Policy (JA)",
            Category::Policy,
            GOOGLE_NEWS_JA,
            "宇宙 政策",
        ),
        FeedSource::search(
            "Google News - Space Funding (JA)",
            Category::Funding,
            GOOGLE_NEWS_JA,
            "宇宙 資金調達 OR 宇宙 スタートアップ",
        ),
    ]
}
