//! Unified error types for vitrine.
//!
//! [`Error`] is what callers of the coordinator see. [`StoreError`] and [`CrawlError`]
//! stay internal to their layers: store failures are recovered as cache misses and crawl
//! failures are fanned out to waiters as [`Error::ServiceFailed`].

/// Errors surfaced to callers of the request coordinator.
///
/// The type is `Clone` because a single crawl failure is delivered to every waiter
/// attached to the same job.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Unregistered service, blank query or a limit outside the accepted range.
    #[error("BAD_INPUT: {0}")]
    BadInput(String),

    /// The crawl backing a request failed.
    #[error("SERVICE_FAILED: {0}")]
    ServiceFailed(String),
}

impl Error {
    /// Stable error type identifier used in API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::BadInput(_) => "bad_input",
            Error::ServiceFailed(_) => "request_failed",
        }
    }
}

/// Errors from the persistent cache store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Key does not have the `<32 hex>:<service>` shape.
    #[error("CACHE_ERROR: invalid key: {0}")]
    InvalidKey(String),

    /// Filesystem operation failed.
    #[error("CACHE_ERROR: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from a crawler talking to its upstream catalog.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CrawlError {
    /// Upstream request timed out.
    #[error("upstream timeout")]
    Timeout,

    /// Connection or transport level failure.
    #[error("network error: {0}")]
    Network(String),

    /// Upstream answered with a non-success status.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Upstream body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// Any other upstream failure.
    #[error("upstream error: {0}")]
    Upstream(String),
}
