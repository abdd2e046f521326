use anyhow::Result;
use std::collections::HashSet;
use tracing::{error, info};

use crate::arxiv::ArxivClient;
use crate::config::{Config, DateWindow};
use crate::feeds::{FeedClient, FeedEntry};
use crate::io;
use crate::models::{Category, NewsItem};
use crate::sources::ARXIV_SOURCE_LABEL;

/// Gather items from every feed and paper query, dedupe by URL, and save them.
#[tracing::instrument(name = "collector", skip_all)]
pub async fn collect(config: &Config) -> Result<Vec<NewsItem>> {
    io::ensure_dir(&config.data_dir)?;
    info!(window = %config.window.describe(), "Collecting news");

    let client = FeedClient::new()?;

    let mut all_items = collect_feeds(&client, config).await;
    all_items.extend(collect_arxiv(&client, config).await);

    let collected = all_items.len();
    let unique_items = dedupe_by_url(all_items);
    info!(
        collected,
        unique = unique_items.len(),
        "Collection complete after de-duplication"
    );

    let path = config.raw_news_path();
    io::save_json(&unique_items, &path)?;
    info!(path = %path.display(), "Saved collected items");

    Ok(unique_items)
}

/// Fetch every configured feed in order. A failing feed is logged and skipped.
pub async fn collect_feeds(client: &FeedClient, config: &Config) -> Vec<NewsItem> {
    let mut results = Vec::new();

    for (index, source) in config.feeds.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(config.pacing.between_feeds).await;
        }
        info!(source = %source.name, "Fetching feed");

        let url = match source.resolve_url(&config.window) {
            Ok(url) => url,
            Err(e) => {
                error!(source = %source.name, error = %e, "Skipping feed");
                continue;
            }
        };

        match client.fetch(&url).await {
            Ok(entries) => {
                let items = within_window(entries, &config.window, source.category, &source.name);
                info!(source = %source.name, count = items.len(), "Feed items in window");
                results.extend(items);
            }
            Err(e) => {
                error!(source = %source.name, error = %format!("{:#}", e), "Feed fetch failed");
            }
        }
    }

    results
}

/// Run every paper query in order, tagging results as research.
pub async fn collect_arxiv(client: &FeedClient, config: &Config) -> Vec<NewsItem> {
    let arxiv = ArxivClient::new(client, &config.arxiv);
    let mut results = Vec::new();

    for (index, query) in config.arxiv.queries.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(config.pacing.between_arxiv_queries).await;
        }
        info!(query = %query, "Querying arXiv");

        match arxiv.search(query, &config.window).await {
            Ok(entries) => {
                let items = within_window(
                    entries,
                    &config.window,
                    Category::Research,
                    ARXIV_SOURCE_LABEL,
                );
                info!(query = %query, count = items.len(), "arXiv papers in window");
                results.extend(items);
            }
            Err(e) => {
                error!(query = %query, error = %format!("{:#}", e), "arXiv query failed");
            }
        }
    }

    results
}

fn within_window(
    entries: Vec<FeedEntry>,
    window: &DateWindow,
    category: Category,
    source: &str,
) -> Vec<NewsItem> {
    entries
        .into_iter()
        .filter(|entry| window.contains(entry.published))
        .map(|entry| entry.into_news_item(category, source))
        .collect()
}

/// Keep the first occurrence of each URL. Items with an empty URL always pass.
pub fn dedupe_by_url(items: Vec<NewsItem>) -> Vec<NewsItem> {
    let mut seen_urls: HashSet<String> = HashSet::new();

    items
        .into_iter()
        .filter(|item| item.url.is_empty() || seen_urls.insert(item.url.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn item(title: &str, url: &str, source: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            url: url.to_string(),
            summary: String::new(),
            published: None,
            source: source.to_string(),
            category: Category::Business,
        }
    }

    fn entry(link: &str, published: Option<chrono::DateTime<Utc>>) -> FeedEntry {
        FeedEntry {
            title: "Entry".to_string(),
            link: link.to_string(),
            summary: "<p>Body</p>".to_string(),
            published,
        }
    }

    // ==================== Dedup Tests ====================

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let items = vec![
            item("first", "https://a.example", "feed"),
            item("second", "https://b.example", "feed"),
            item("dup", "https://a.example", "arXiv"),
        ];
        let unique = dedupe_by_url(items);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title, "first");
        assert_eq!(unique[1].title, "second");
    }

    #[test]
    fn test_dedupe_never_drops_empty_urls() {
        let items = vec![
            item("a", "", "feed"),
            item("b", "", "feed"),
            item("c", "https://c.example", "feed"),
            item("d", "", "feed"),
        ];
        let unique = dedupe_by_url(items);
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn test_dedupe_urls_are_unique_in_output() {
        let urls = ["u1", "u2", "u1", "", "u3", "u2", ""];
        let items = urls.iter().map(|u| item("t", u, "feed")).collect();
        let unique = dedupe_by_url(items);
        let non_empty: Vec<_> = unique.iter().filter(|i| !i.url.is_empty()).collect();
        let set: HashSet<_> = non_empty.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(set.len(), non_empty.len());
        assert_eq!(unique.len(), 5);
    }

    // ==================== Window Tests ====================

    #[test]
    fn test_within_window_filters_and_tags() {
        let now = Utc.with_ymd_and_hms(2026, 10, 14, 0, 0, 0).unwrap();
        let window = DateWindow::trailing_days(now, 7);
        let entries = vec![
            entry("https://in.example", Some(now - Duration::days(1))),
            entry("https://old.example", Some(now - Duration::days(30))),
            entry("https://undated.example", None),
        ];

        let items = within_window(entries, &window, Category::Funding, "Wire");
        let urls: Vec<_> = items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["https://in.example", "https://undated.example"]);
        assert!(items.iter().all(|i| i.category == Category::Funding));
        assert!(items.iter().all(|i| i.summary == "Body"));
    }
}
