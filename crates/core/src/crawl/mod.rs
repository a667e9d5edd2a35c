//! Crawler contract and the paginated crawl algorithm.
//!
//! A [`Crawler`] runs one job per cache key. While it works it reports the accumulated
//! items through [`PartialResults`], which lets the coordinator release waiters early.

mod paginated;

pub use paginated::{MAX_REQUESTS, PAGE_SIZE, PaginatedCrawler};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::Item;
use crate::error::CrawlError;

/// Callback sink for partial results of a running crawl.
#[derive(Clone)]
pub struct PartialResults {
    emit: Arc<dyn Fn(&[Item]) + Send + Sync>,
}

impl PartialResults {
    pub fn new(emit: impl Fn(&[Item]) + Send + Sync + 'static) -> Self {
        Self { emit: Arc::new(emit) }
    }

    /// Sink that discards every update.
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Report the full accumulated result so far. Called synchronously by the crawler.
    pub fn partial_result(&self, items: &[Item]) {
        (self.emit)(items)
    }
}

impl fmt::Debug for PartialResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialResults").finish_non_exhaustive()
    }
}

/// Input for a single crawl job.
#[derive(Debug, Clone)]
pub struct CrawlJob {
    /// Normalized query.
    pub query: String,
    pub handlers: PartialResults,
}

/// A registered search source.
#[async_trait]
pub trait Crawler: Send + Sync {
    /// Crawl the upstream for `job.query`, returning the complete result.
    async fn run(&self, job: CrawlJob) -> Result<Vec<Item>, CrawlError>;
}

/// One page of upstream search results.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    /// Total number of results the upstream reports for the query.
    pub total: u64,
    /// Items on this page, already projected into [`Item`]s.
    pub items: Vec<Item>,
}

/// Upstream endpoint that serves search results in offset-addressed pages.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, query: &str, offset: usize, limit: usize) -> Result<SearchPage, CrawlError>;
}
