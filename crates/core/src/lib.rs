//! Core types and shared functionality for vitrine.
//!
//! This crate provides:
//! - Filesystem cache store with mtime-based expiry
//! - Request coordinator that coalesces concurrent searches onto one crawl
//! - Crawler contract, paginated crawl algorithm and service registry
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod crawl;
pub mod deferred;
pub mod error;
pub mod item;

pub use cache::{CacheKey, CacheStore};
pub use config::{AppConfig, ConfigError};
pub use coordinator::{Coordinator, ServiceRegistry};
pub use crawl::{CrawlJob, Crawler, PageSource, PaginatedCrawler, PartialResults, SearchPage};
pub use error::{CrawlError, Error, StoreError};
pub use item::Item;
