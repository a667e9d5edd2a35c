//! MercadoLibre catalog search.
//!
//! - **Endpoint**: `GET <base>/search?q=<query>&offset=<n>&limit=50`
//! - **Base URL**: `upstream.base_url` from [`UpstreamConfig`] (Brazil site by default)
//! - **Paging**: `paging.total` plus a `results` array per page, walked by
//!   [`PaginatedCrawler`] for at most [`MAX_REQUESTS`](vitrine_core::crawl::MAX_REQUESTS) pages.

pub mod request;
pub mod response;

pub use request::SearchParams;
pub use response::{format_item, parse_page};

use std::sync::Arc;

use async_trait::async_trait;
use vitrine_core::config::UpstreamConfig;
use vitrine_core::{CrawlError, PageSource, PaginatedCrawler, SearchPage};

use crate::session::{Session, SessionError, UserAgentPool};

/// Name the crawler is registered under.
pub const SERVICE_NAME: &str = "ML";

/// Page source backed by the MercadoLibre search API.
#[derive(Debug, Clone)]
pub struct MercadoLibreSource {
    session: Session,
}

impl MercadoLibreSource {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Build a source from upstream settings with a fresh User-Agent pool.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, SessionError> {
        let session = Session::new(&config.base_url, config.timeout(), Arc::new(UserAgentPool::default()))?;
        Ok(Self::new(session))
    }
}

#[async_trait]
impl PageSource for MercadoLibreSource {
    async fn fetch_page(&self, query: &str, offset: usize, limit: usize) -> Result<SearchPage, CrawlError> {
        let body = self.session.get_json("search", &SearchParams { q: query, offset, limit }).await?;
        Ok(parse_page(&body))
    }
}

/// Crawler for the `"ML"` service.
pub fn crawler(config: &UpstreamConfig) -> Result<PaginatedCrawler<MercadoLibreSource>, SessionError> {
    Ok(PaginatedCrawler::new(SERVICE_NAME, MercadoLibreSource::from_config(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::DEFAULT_USER_AGENTS;
    use axum::extract::{Query, State};
    use axum::http::{HeaderMap, StatusCode, header};
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use vitrine_core::{CrawlJob, Crawler, PartialResults};

    /// Requests seen by the fake upstream: (query params, user agent).
    type Seen = Arc<Mutex<Vec<(HashMap<String, String>, String)>>>;

    const CATALOG_SIZE: usize = 120;

    async fn catalog(
        State(seen): State<Seen>, headers: HeaderMap, Query(params): Query<HashMap<String, String>>,
    ) -> Response {
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        seen.lock().unwrap().push((params.clone(), user_agent));

        let offset: usize = params.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
        let limit: usize = params.get("limit").and_then(|v| v.parse().ok()).unwrap_or(50);
        let results: Vec<_> = (offset..(offset + limit).min(CATALOG_SIZE))
            .map(|n| {
                json!({
                    "id": format!("MLB{n}"),
                    "title": format!("item {n}"),
                    "price": n as f64,
                    "currency_id": "BRL",
                })
            })
            .collect();

        Json(json!({"paging": {"total": CATALOG_SIZE}, "results": results})).into_response()
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/sites/MLB/")
    }

    fn config(base_url: String) -> UpstreamConfig {
        UpstreamConfig { base_url, timeout_ms: 5_000 }
    }

    #[tokio::test]
    async fn test_crawl_walks_all_pages() {
        let seen: Seen = Arc::default();
        let router = Router::new().route("/sites/MLB/search", get(catalog)).with_state(Arc::clone(&seen));
        let base_url = serve(router).await;

        let crawler = crawler(&config(base_url)).unwrap();
        let partials = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&partials);
        let job = CrawlJob {
            query: "smart tv".into(),
            handlers: PartialResults::new(move |items| sink.lock().unwrap().push(items.len())),
        };

        let items = crawler.run(job).await.unwrap();
        assert_eq!(items.len(), CATALOG_SIZE);
        assert_eq!(items[0].id.as_deref(), Some("MLB0"));
        assert_eq!(items[119].name.as_deref(), Some("item 119"));
        assert_eq!(*partials.lock().unwrap(), vec![50, 100, 120]);

        let seen = seen.lock().unwrap();
        let offsets: Vec<&str> = seen.iter().map(|(p, _)| p["offset"].as_str()).collect();
        assert_eq!(offsets, ["0", "50", "100"]);
        assert!(seen.iter().all(|(p, _)| p["q"] == "smart tv" && p["limit"] == "50"));

        let agents: Vec<&str> = seen.iter().map(|(_, ua)| ua.as_str()).collect();
        assert_eq!(agents.as_slice(), &DEFAULT_USER_AGENTS[..3]);
    }

    #[tokio::test]
    async fn test_error_status_fails_page() {
        let router = Router::new().route(
            "/sites/MLB/search",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response() }),
        );
        let source = MercadoLibreSource::from_config(&config(serve(router).await)).unwrap();

        let result = source.fetch_page("tv", 0, 50).await;
        assert!(matches!(result, Err(CrawlError::HttpError { status: 500 })), "got {result:?}");
    }

    #[tokio::test]
    async fn test_non_json_body_is_parse_error() {
        let router = Router::new().route("/sites/MLB/search", get(|| async { "<html>maintenance</html>" }));
        let source = MercadoLibreSource::from_config(&config(serve(router).await)).unwrap();

        let result = source.fetch_page("tv", 0, 50).await;
        assert!(matches!(result, Err(CrawlError::Parse(_))), "got {result:?}");
    }

    #[tokio::test]
    async fn test_failure_mid_crawl_fails_job() {
        let calls = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&calls);
        let router = Router::new().route(
            "/sites/MLB/search",
            get(move || {
                let counter = Arc::clone(&counter);
                async move {
                    let mut calls = counter.lock().unwrap();
                    *calls += 1;
                    if *calls == 1 {
                        let results: Vec<_> = (0..50).map(|n| json!({"id": format!("MLB{n}")})).collect();
                        Json(json!({"paging": {"total": 500}, "results": results})).into_response()
                    } else {
                        StatusCode::BAD_GATEWAY.into_response()
                    }
                }
            }),
        );
        let crawler = crawler(&config(serve(router).await)).unwrap();
        let job = CrawlJob { query: "tv".into(), handlers: PartialResults::noop() };

        let result = crawler.run(job).await;
        assert!(matches!(result, Err(CrawlError::HttpError { status: 502 })), "got {result:?}");
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[test]
    fn test_from_config_rejects_bad_url() {
        let result = MercadoLibreSource::from_config(&config("::nope::".into()));
        assert!(matches!(result, Err(SessionError::InvalidBaseUrl { .. })));
    }
}
