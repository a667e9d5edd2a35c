//! HTTP session bound to one upstream base URL.
//!
//! Every request carries a User-Agent taken from a shared [`UserAgentPool`],
//! rotated per origin.

pub mod ua;

pub use ua::{DEFAULT_USER_AGENTS, UserAgentPool};

use std::sync::Arc;
use std::time::Duration;

use reqwest::header;
use serde::Serialize;
use url::Url;
use vitrine_core::CrawlError;

/// Errors raised while building a [`Session`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// HTTP session for a single upstream.
#[derive(Debug, Clone)]
pub struct Session {
    http: reqwest::Client,
    base_url: Url,
    origin: String,
    agents: Arc<UserAgentPool>,
}

impl Session {
    /// Create a session rooted at `base_url`.
    ///
    /// Relative paths passed to [`Session::get_json`] resolve below the base URL's path,
    /// so a missing trailing slash is added.
    pub fn new(base_url: &str, timeout: Duration, agents: Arc<UserAgentPool>) -> Result<Self, SessionError> {
        let invalid = |reason: String| SessionError::InvalidBaseUrl { url: base_url.to_string(), reason };

        let mut url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let origin = url.origin().ascii_serialization();
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { http, base_url: url, origin, agents })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// GET `path` relative to the base URL and decode the body as JSON.
    pub async fn get_json<Q>(&self, path: &str, query: &Q) -> Result<serde_json::Value, CrawlError>
    where
        Q: Serialize + ?Sized,
    {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| CrawlError::Upstream(format!("invalid path {path}: {e}")))?;
        let user_agent = self.agents.next(&self.origin);

        tracing::debug!(%url, user_agent, "upstream request");

        let response = self
            .http
            .get(url)
            .header(header::USER_AGENT, user_agent)
            .header(header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), origin = %self.origin, "upstream returned error status");
            return Err(CrawlError::HttpError { status: status.as_u16() });
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&bytes).map_err(|e| CrawlError::Parse(e.to_string()))
    }
}

/// Map a reqwest failure onto the crawl error taxonomy.
pub fn transport_error(err: reqwest::Error) -> CrawlError {
    if err.is_timeout() {
        CrawlError::Timeout
    } else if let Some(status) = err.status() {
        CrawlError::HttpError { status: status.as_u16() }
    } else if err.is_decode() {
        CrawlError::Parse(err.to_string())
    } else {
        CrawlError::Network(err.to_string())
    }
}
