//! Persistent cache for crawl results.
//!
//! Content-addressed file storage keyed by a hash of (query, service):
//!
//! - Query normalization and MD5-based keys
//! - Two-level sharded layout per service namespace
//! - Expiry driven by file mtime with lazy deletion on read

pub mod hash;
pub mod store;

pub use hash::{CacheKey, compute_cache_key, normalize_query};
pub use store::{CacheStore, DEFAULT_TTL};
