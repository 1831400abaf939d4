use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

use crate::models::SearchPage;

/// Anything that can turn a search URL into a page of stories.
pub trait StoryFetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> Result<SearchPage>;
}

#[derive(Clone)]
pub struct HackerNewsClient {
    client: Client,
}

impl HackerNewsClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hacker_stories/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

impl StoryFetcher for HackerNewsClient {
    fn fetch(&self, url: &str) -> Result<SearchPage> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("request to {} failed", url))?
            .error_for_status()?;

        let body = response.text()?;
        let page = parse_search_page(&body)?;

        debug!(url, hits = page.hits.len(), page = page.page, "fetched search page");
        Ok(page)
    }
}

pub fn parse_search_page(body: &str) -> Result<SearchPage> {
    serde_json::from_str(body).context("unexpected search response body")
}
