//! Request validation, request entries and the truncation rule.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::Error;
use crate::cache::{compute_cache_key, normalize_query};

/// Smallest accepted `limit`.
pub const MIN_LIMIT: i64 = 10;

/// Largest accepted `limit`.
pub const MAX_LIMIT: i64 = 500;

/// Request ids wrap back to 1 after this value (2^53 - 1).
pub const MAX_REQUEST_ID: u64 = (1 << 53) - 1;

/// One validated caller request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEntry {
    pub service: String,
    /// Normalized query.
    pub query: String,
    pub limit: usize,
    pub key: String,
    /// Diagnostic sequence number.
    pub id: u64,
}

impl RequestEntry {
    /// Build an entry from a raw query, normalizing it and deriving the cache key.
    pub fn new(service: &str, raw_query: &str, limit: usize, id: u64) -> Self {
        let query = normalize_query(raw_query);
        let key = compute_cache_key(&query, service);
        Self { service: service.to_string(), query, limit, key, id }
    }
}

/// Check query and limit, returning the limit as a length.
///
/// Service registration is checked by the coordinator, which owns the registry.
pub fn validate(query: &str, limit: i64) -> Result<usize, Error> {
    if !query.chars().any(|c| !c.is_whitespace()) {
        return Err(Error::BadInput("query must contain a non-whitespace character".into()));
    }
    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(Error::BadInput(format!("limit must be an integer in [{MIN_LIMIT}, {MAX_LIMIT}], got {limit}")));
    }
    Ok(limit as usize)
}

/// Whether `data` holds strictly more than `expected` items.
pub fn has_enough<T>(data: Option<&[T]>, expected: usize) -> bool {
    data.is_some_and(|d| d.len() > expected)
}

/// Truncate a result to `limit` items.
///
/// Returns `None` for an absent or empty sequence.
pub fn get_result<T: Clone>(data: Option<&[T]>, limit: usize) -> Option<Vec<T>> {
    match data {
        Some(d) if !d.is_empty() => Some(d[..d.len().min(limit)].to_vec()),
        _ => None,
    }
}

/// Monotonic request id generator, safe under concurrent use.
#[derive(Debug, Default)]
pub struct RequestIds {
    last: AtomicU64,
}

impl RequestIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator whose next id follows `last`.
    pub fn starting_after(last: u64) -> Self {
        Self { last: AtomicU64::new(last) }
    }

    /// Allocate the next id, wrapping to 1 after [`MAX_REQUEST_ID`].
    pub fn next(&self) -> u64 {
        let previous = self
            .last
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |id| Some(successor(id)))
            .unwrap_or_else(|id| id);
        successor(previous)
    }

    /// Last id handed out, or 0 if none yet.
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}

fn successor(id: u64) -> u64 {
    if id < MAX_REQUEST_ID { id + 1 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_normalizes() {
        let a = RequestEntry::new("ML", "  Phone   Case ", 10, 1);
        let b = RequestEntry::new("ML", "phone case", 20, 2);
        assert_eq!(a.query, "phone case");
        assert_eq!(a.key, b.key);
        assert!(a.key.ends_with(":ML"));
    }

    #[test]
    fn test_validate_limits() {
        assert_eq!(validate("tv", 10).unwrap(), 10);
        assert_eq!(validate("tv", 500).unwrap(), 500);
        assert!(matches!(validate("tv", 9), Err(Error::BadInput(_))));
        assert!(matches!(validate("tv", 501), Err(Error::BadInput(_))));
        assert!(matches!(validate("tv", -10), Err(Error::BadInput(_))));
    }

    #[test]
    fn test_validate_blank_query() {
        assert!(matches!(validate("", 10), Err(Error::BadInput(_))));
        assert!(matches!(validate(" \t\n", 10), Err(Error::BadInput(_))));
        assert!(validate(" x ", 10).is_ok());
    }

    #[test]
    fn test_get_result() {
        let data: Vec<u32> = (1..=20).collect();
        assert_eq!(get_result(Some(data.as_slice()), 5), Some(vec![1, 2, 3, 4, 5]));
        assert_eq!(get_result(Some(data.as_slice()), 50), Some(data.clone()));
        assert_eq!(get_result::<u32>(Some(&[][..]), 5), None);
        assert_eq!(get_result::<u32>(None, 5), None);
    }

    #[test]
    fn test_has_enough_is_strict() {
        let data = [0u8; 10];
        assert!(has_enough(Some(&data[..]), 9));
        assert!(!has_enough(Some(&data[..]), 10));
        assert!(!has_enough::<u8>(None, 0));
    }

    #[test]
    fn test_request_ids_increment() {
        let ids = RequestIds::new();
        assert_eq!(ids.last(), 0);
        assert_eq!(ids.next(), 1);
        assert_eq!(ids.next(), 2);
        assert_eq!(ids.last(), 2);
    }

    #[test]
    fn test_request_ids_wrap() {
        let ids = RequestIds::starting_after(MAX_REQUEST_ID - 1);
        assert_eq!(ids.next(), MAX_REQUEST_ID);
        assert_eq!(ids.next(), 1);
    }

    #[test]
    fn test_request_ids_concurrent() {
        let ids = std::sync::Arc::new(RequestIds::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = std::sync::Arc::clone(&ids);
                std::thread::spawn(move || (0..1000).map(|_| ids.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 8000);
        assert_eq!(ids.last(), 8000);
    }
}
