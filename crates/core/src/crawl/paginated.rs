use std::collections::HashSet;

use async_trait::async_trait;

use super::{CrawlJob, Crawler, PageSource};
use crate::Item;
use crate::error::CrawlError;

/// Items requested per upstream page.
pub const PAGE_SIZE: usize = 50;

/// Upstream requests allowed per job.
pub const MAX_REQUESTS: usize = 10;

/// Crawler that walks a [`PageSource`] page by page.
///
/// Items are deduplicated by id within one job, and items without an id are dropped.
/// The accumulated result is reported after every page. The crawl stops at the request
/// cap, on an empty page or zero total, or when the upstream total is exhausted.
#[derive(Debug)]
pub struct PaginatedCrawler<S> {
    name: String,
    source: S,
    page_size: usize,
    max_requests: usize,
}

impl<S: PageSource> PaginatedCrawler<S> {
    pub fn new(name: impl Into<String>, source: S) -> Self {
        Self { name: name.into(), source, page_size: PAGE_SIZE, max_requests: MAX_REQUESTS }
    }
}

#[async_trait]
impl<S: PageSource> Crawler for PaginatedCrawler<S> {
    async fn run(&self, job: CrawlJob) -> Result<Vec<Item>, CrawlError> {
        tracing::info!(crawler = %self.name, query = %job.query, "running search job");

        let mut seen = HashSet::new();
        let mut result: Vec<Item> = Vec::new();
        let mut offset = 0;

        for request in 0..self.max_requests {
            tracing::debug!(crawler = %self.name, offset, request, "fetching search page");
            let page = self.source.fetch_page(&job.query, offset, self.page_size).await?;

            let page_len = page.items.len().min(self.page_size);
            if page.total == 0 || page_len == 0 {
                break;
            }

            let before = result.len();
            for item in page.items.into_iter().take(page_len) {
                let Some(id) = item.id.as_deref() else {
                    continue;
                };
                if !seen.insert(id.to_string()) {
                    tracing::warn!(crawler = %self.name, id, "repeated product id in result set");
                    continue;
                }
                result.push(item);
            }
            tracing::info!(crawler = %self.name, offset, count = result.len() - before, "search page returned items");

            job.handlers.partial_result(&result);

            let consumed = offset + page_len;
            if page.total <= consumed as u64 {
                break;
            }
            offset = consumed;
        }

        tracing::info!(crawler = %self.name, count = result.len(), "search job finished");
        Ok(result)
    }
}
