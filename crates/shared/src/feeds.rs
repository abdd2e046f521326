use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use scraper::Html;
use url::Url;

use crate::models::{Category, NewsItem};
use crate::sources::USER_AGENT;

pub const SUMMARY_MAX_CHARS: usize = 1000;

/// One parsed feed entry before it is tagged with a source and category.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: Option<DateTime<Utc>>,
}

impl FeedEntry {
    pub fn into_news_item(self, category: Category, source: &str) -> NewsItem {
        NewsItem {
            title: strip_html(&self.title),
            url: self.link,
            summary: truncate_chars(&strip_html(&self.summary), SUMMARY_MAX_CHARS),
            published: self.published,
            source: source.to_string(),
            category,
        }
    }
}

/// Fetches RSS/Atom documents and parses them into entries.
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &Url) -> Result<Vec<FeedEntry>> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .with_context(|| format!("Failed to fetch feed {}", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP error: {} for {}", status, url);
        }

        let body = response
            .bytes()
            .await
            .context("Failed to read response body")?;

        parse_feed(&body)
    }
}

/// Parse an RSS or Atom document. Timestamps fall back from `published` to `updated`.
pub fn parse_feed(body: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = feed_rs::parser::parse(body).context("Failed to parse feed")?;

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let summary = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .unwrap_or_default();

            FeedEntry {
                title: entry.title.map(|t| t.content).unwrap_or_default(),
                link: entry
                    .links
                    .first()
                    .map(|l| l.href.clone())
                    .unwrap_or_default(),
                summary,
                published: entry.published.or(entry.updated),
            }
        })
        .collect();

    Ok(entries)
}

/// Drop markup and collapse whitespace, keeping text nodes separated by a space.
pub fn strip_html(text: &str) -> String {
    if !text.contains('<') && !text.contains('&') {
        return collapse_whitespace(text);
    }

    let fragment = Html::parse_fragment(text);
    let joined = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    collapse_whitespace(&joined)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max` characters, never splitting a UTF-8 sequence.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
