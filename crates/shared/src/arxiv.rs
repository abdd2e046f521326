use anyhow::{Context, Result};
use url::Url;

use crate::config::DateWindow;
use crate::feeds::{FeedClient, FeedEntry};
use crate::sources::ArxivSettings;

/// Paper search against the arXiv Atom API, newest submissions first.
pub struct ArxivClient<'a> {
    feeds: &'a FeedClient,
    settings: &'a ArxivSettings,
}

impl<'a> ArxivClient<'a> {
    pub fn new(feeds: &'a FeedClient, settings: &'a ArxivSettings) -> Self {
        Self { feeds, settings }
    }

    pub async fn search(&self, query: &str, window: &DateWindow) -> Result<Vec<FeedEntry>> {
        let url = self.query_url(query, window)?;
        self.feeds.fetch(&url).await
    }

    /// The query is narrowed to the window with a `submittedDate` range.
    pub fn query_url(&self, query: &str, window: &DateWindow) -> Result<Url> {
        let search_query = format!(
            "({}) AND submittedDate:[{} TO {}]",
            query,
            window.start.format("%Y%m%d%H%M"),
            window.end.format("%Y%m%d%H%M")
        );
        let max_results = self.settings.max_results.to_string();

        Url::parse_with_params(
            &self.settings.base_url,
            &[
                ("search_query", search_query.as_str()),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
                ("max_results", max_results.as_str()),
            ],
        )
        .with_context(|| format!("Invalid arXiv API URL: {}", self.settings.base_url))
    }
}
