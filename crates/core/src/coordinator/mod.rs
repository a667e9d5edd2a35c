//! Request coordinator.
//!
//! Answers `(service, query, limit)` requests by reading the cache store and, on a miss,
//! coalescing concurrent requests for the same key onto a single crawl job:
//!
//! 1. Validate input and derive the cache key from the normalized query.
//! 2. Return a truncated cache hit if the store has a fresh record.
//! 3. Otherwise attach to the running job for the key (starting one if needed). A caller
//!    whose limit is already covered by the job's partial result returns immediately.
//! 4. Partial results release every waiter they satisfy; completion persists the result and
//!    releases the rest; failure rejects every waiter with the same error.
//!
//! The running-jobs map sits behind a single mutex. Attach, partial delivery and job
//! teardown all happen inside it, so there is never more than one job per key and no
//! waiter can miss a partial update.

pub mod registry;
pub mod request;

pub use registry::ServiceRegistry;
pub use request::{MAX_LIMIT, MIN_LIMIT, RequestEntry, RequestIds, get_result, has_enough};

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::Instrument;

use crate::cache::CacheStore;
use crate::crawl::{CrawlJob, Crawler, PartialResults};
use crate::deferred::{Resolver, deferred};
use crate::error::CrawlError;
use crate::{Error, Item};

/// A caller blocked on a running job.
#[derive(Debug)]
struct AwaitingRequest {
    request: RequestEntry,
    resolver: Resolver<Vec<Item>>,
}

/// State of one in-flight crawl.
#[derive(Debug)]
struct RunningServiceEntry {
    /// Id of the request that started the job; guards against stale callbacks.
    job_id: u64,
    awaiting: Vec<AwaitingRequest>,
    partial_result: Option<Vec<Item>>,
}

impl RunningServiceEntry {
    fn new(job_id: u64) -> Self {
        Self { job_id, awaiting: Vec::new(), partial_result: None }
    }
}

#[derive(Debug)]
struct CoordinatorInner {
    registry: ServiceRegistry,
    store: CacheStore,
    running: Mutex<HashMap<String, RunningServiceEntry>>,
    ids: RequestIds,
}

/// Coalescing cache coordinator.
///
/// Cheap to clone; clones share the registry, the store and the running jobs.
#[derive(Debug, Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

impl Coordinator {
    pub fn new(registry: ServiceRegistry, store: CacheStore) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                registry,
                store,
                running: Mutex::new(HashMap::new()),
                ids: RequestIds::new(),
            }),
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.inner.store
    }

    /// Id of the most recent request.
    pub fn last_request_id(&self) -> u64 {
        self.inner.ids.last()
    }

    /// Number of crawl jobs currently running.
    pub fn running_jobs(&self) -> usize {
        self.running().len()
    }

    /// Number of callers currently waiting on running jobs.
    pub fn waiting_requests(&self) -> usize {
        self.running().values().map(|job| job.awaiting.len()).sum()
    }

    /// Fetch up to `limit` items for `query` from `service`.
    ///
    /// # Errors
    ///
    /// - [`Error::BadInput`] for an unregistered service, a blank query or a limit outside
    ///   `[10, 500]`.
    /// - [`Error::ServiceFailed`] when the crawl this request waited on failed.
    pub async fn get(&self, service: &str, query: &str, limit: i64) -> Result<Vec<Item>, Error> {
        let crawler = self
            .inner
            .registry
            .lookup(service)
            .ok_or_else(|| Error::BadInput(format!("unknown service: {service}")))?;
        let limit = request::validate(query, limit)?;

        let entry = RequestEntry::new(service, query, limit, self.inner.ids.next());

        if let Some(items) = self.get_from_cache(&entry).await {
            tracing::debug!(key = %entry.key, request_id = entry.id, "request serviced from cache");
            return Ok(items);
        }

        self.get_from_service(entry, crawler).await
    }

    async fn get_from_cache(&self, entry: &RequestEntry) -> Option<Vec<Item>> {
        let bytes = self.inner.store.read(&entry.key, None).await?;
        match serde_json::from_slice::<Vec<Item>>(&bytes) {
            Ok(items) => get_result(Some(items.as_slice()), entry.limit),
            Err(e) => {
                tracing::error!(
                    key = %entry.key,
                    request_id = entry.id,
                    error = %e,
                    "failed to restore data from cache"
                );
                None
            }
        }
    }

    async fn get_from_service(&self, entry: RequestEntry, crawler: Arc<dyn Crawler>) -> Result<Vec<Item>, Error> {
        let pending = {
            let mut running = self.running();
            let job = match running.entry(entry.key.clone()) {
                Entry::Occupied(occupied) => occupied.into_mut(),
                Entry::Vacant(vacant) => vacant.insert(self.start_job(&entry, crawler)),
            };

            if has_enough(job.partial_result.as_deref(), entry.limit) {
                tracing::info!(key = %entry.key, request_id = entry.id, "request serviced by partial result");
                return Ok(get_result(job.partial_result.as_deref(), entry.limit).unwrap_or_default());
            }

            tracing::info!(
                key = %entry.key,
                request_id = entry.id,
                limit = entry.limit,
                "request waiting for service result"
            );
            let (resolver, pending) = deferred();
            job.awaiting.push(AwaitingRequest { request: entry, resolver });
            pending
        };

        pending.await
    }

    /// Spawn the crawl for `entry` and return its running entry.
    ///
    /// Called with the running-jobs lock held; the spawned task only touches the map after
    /// the caller has released it.
    fn start_job(&self, entry: &RequestEntry, crawler: Arc<dyn Crawler>) -> RunningServiceEntry {
        let job_id = entry.id;
        let key = entry.key.clone();

        let handlers = {
            let this = self.clone();
            let key = key.clone();
            PartialResults::new(move |items| this.on_partial_result(&key, job_id, items))
        };
        let job = CrawlJob { query: entry.query.clone(), handlers };

        let span = tracing::info_span!("crawl", service = %entry.service, key = %key, job_id);
        let this = self.clone();
        tokio::spawn(
            async move {
                // run in its own task so a panicking crawler still tears the job down
                let outcome = tokio::spawn(async move { crawler.run(job).await }).await;
                match outcome {
                    Ok(Ok(items)) => this.on_completed(&key, job_id, items).await,
                    Ok(Err(e)) => this.on_failed(&key, job_id, e),
                    Err(e) => this.on_failed(&key, job_id, CrawlError::Upstream(format!("crawler aborted: {e}"))),
                }
            }
            .instrument(span),
        );

        tracing::info!(key = %entry.key, request_id = entry.id, "service job started");
        RunningServiceEntry::new(job_id)
    }

    fn on_partial_result(&self, key: &str, job_id: u64, items: &[Item]) {
        let ready = {
            let mut running = self.running();
            let Some(job) = running.get_mut(key).filter(|job| job.job_id == job_id) else {
                return;
            };
            job.partial_result = Some(items.to_vec());

            let (ready, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut job.awaiting)
                .into_iter()
                .partition(|waiter| has_enough(Some(items), waiter.request.limit));
            job.awaiting = pending;
            ready
        };

        for waiter in ready {
            tracing::info!(key, request_id = waiter.request.id, "removing request from waiting list");
            waiter.resolver.resolve(get_result(Some(items), waiter.request.limit).unwrap_or_default());
        }
    }

    async fn on_completed(&self, key: &str, job_id: u64, items: Vec<Item>) {
        self.save_to_cache(key, &items).await;

        for waiter in self.finish_job(key, job_id) {
            tracing::info!(key, request_id = waiter.request.id, "finalizing request from waiting list");
            waiter.resolver.resolve(get_result(Some(items.as_slice()), waiter.request.limit).unwrap_or_default());
        }
        tracing::info!(key, count = items.len(), "service completed");
    }

    fn on_failed(&self, key: &str, job_id: u64, err: CrawlError) {
        let err = Error::ServiceFailed(err.to_string());

        for waiter in self.finish_job(key, job_id) {
            tracing::info!(key, request_id = waiter.request.id, "rejecting request from waiting list");
            waiter.resolver.reject(err.clone());
        }
        tracing::error!(key, error = %err, "service failed");
    }

    /// Remove the job from the running map, returning its remaining waiters.
    fn finish_job(&self, key: &str, job_id: u64) -> Vec<AwaitingRequest> {
        let mut running = self.running();
        if !running.get(key).is_some_and(|job| job.job_id == job_id) {
            return Vec::new();
        }
        running.remove(key).map(|job| job.awaiting).unwrap_or_default()
    }

    async fn save_to_cache(&self, key: &str, items: &[Item]) -> bool {
        if items.is_empty() {
            return false;
        }
        let json = match serde_json::to_vec(items) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(key, error = %e, "error serializing data for cache");
                return false;
            }
        };
        let saved = self.inner.store.write(key, &json).await;
        if saved {
            tracing::info!(key, "data saved to cache");
        }
        saved
    }

    fn running(&self) -> MutexGuard<'_, HashMap<String, RunningServiceEntry>> {
        self.inner.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
