//! Query normalization and cache key derivation.
//!
//! A cache key has the shape `<md5 hex of normalized query>:<service>`. The store later
//! splits it back into its two parts to build a sharded path.

use std::fmt;
use std::path::PathBuf;

use md5::{Digest, Md5};

use crate::error::StoreError;

/// Length of the hex-encoded MD5 digest at the front of every key.
pub const HASH_LEN: usize = 32;

/// Number of leading hex characters used as the shard directory.
pub const SHARD_LEN: usize = 2;

/// Canonical form of a search query: whitespace runs collapsed to one space, trimmed,
/// lowercased.
pub fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Compute the cache key for an already normalized query.
pub fn compute_cache_key(normalized_query: &str, service: &str) -> String {
    let digest = Md5::digest(normalized_query.as_bytes());
    format!("{}:{}", hex::encode(digest), service)
}

/// A cache key decomposed into its hash and service parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    hash: String,
    service: String,
}

impl CacheKey {
    /// Parse a `hash:service` key.
    ///
    /// The hash must be 32 lowercase hex characters and the service a single, non-empty
    /// path component.
    pub fn parse(key: &str) -> Result<Self, StoreError> {
        let invalid = || StoreError::InvalidKey(key.to_string());

        let (hash, service) = key.split_once(':').ok_or_else(invalid)?;
        if hash.len() != HASH_LEN || !hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(invalid());
        }
        if service.is_empty() || service == "." || service == ".." || service.contains(['/', '\\', '\0']) {
            return Err(invalid());
        }

        Ok(Self { hash: hash.to_string(), service: service.to_string() })
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Shard directory relative to the store root: `<service>/<2 hex>`.
    pub fn shard_dir(&self) -> PathBuf {
        [self.service.as_str(), &self.hash[..SHARD_LEN]].iter().collect()
    }

    /// File path relative to the store root: `<service>/<2 hex>/<30 hex>`.
    pub fn relative_path(&self) -> PathBuf {
        self.shard_dir().join(&self.hash[SHARD_LEN..])
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hash, self.service)
    }
}
