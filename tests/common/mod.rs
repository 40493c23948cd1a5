//! Test utilities shared by the frontier integration tests

#![allow(dead_code)]

use bytes::Bytes;
use dashmap::DashMap;
use futures::future::BoxFuture;
use kodegen_tools_frontier::config::{CrawlConfigBuilder, WithStartUrls};
use kodegen_tools_frontier::{
    CanonicalUrl, Collaborators, CrawlConfig, CrawlObserver, DropReason, FetchResponse, Fetcher,
    FileStore, PageOutcome, TransportError,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How the mock answers one URL
#[derive(Clone)]
#[allow(dead_code)]
pub enum Route {
    Respond(FetchResponse),
    Fail(TransportError),
    Slow(Duration, FetchResponse),
}

/// In-memory fetcher: canned responses per canonical URL, 404 for everything else
#[derive(Default)]
pub struct MockFetcher {
    routes: HashMap<String, Route>,
    calls: DashMap<String, usize>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[allow(dead_code)]
impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, route: Route) -> Self {
        self.routes.insert(url.to_string(), route);
        self
    }

    pub fn page(self, url: &str, html: &str) -> Self {
        self.route(url, Route::Respond(FetchResponse::html(html.to_string())))
    }

    pub fn robots(self, origin: &str, body: &str) -> Self {
        self.route(
            &format!("{origin}/robots.txt"),
            Route::Respond(FetchResponse::new(
                200,
                Some("text/plain".into()),
                body.to_string(),
            )),
        )
    }

    pub fn xml(self, url: &str, body: &str) -> Self {
        self.route(
            url,
            Route::Respond(FetchResponse::new(
                200,
                Some("application/xml".into()),
                body.to_string(),
            )),
        )
    }

    pub fn slow_page(self, url: &str, delay: Duration, html: &str) -> Self {
        self.route(url, Route::Slow(delay, FetchResponse::html(html.to_string())))
    }

    /// Requests made for `url` (canonical form)
    pub fn calls(&self, url: &str) -> usize {
        self.calls.get(url).map_or(0, |count| *count)
    }

    /// Requests made for anything on `host`
    pub fn calls_to_host(&self, host: &str) -> usize {
        self.calls
            .iter()
            .filter(|entry| {
                url::Url::parse(entry.key())
                    .ok()
                    .and_then(|u| u.host_str().map(str::to_string))
                    .is_some_and(|h| h == host)
            })
            .map(|entry| *entry.value())
            .sum()
    }

    /// Highest number of simultaneous non-robots fetches observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Fetcher for MockFetcher {
    fn fetch<'a>(
        &'a self,
        url: &'a CanonicalUrl,
    ) -> BoxFuture<'a, Result<FetchResponse, TransportError>> {
        Box::pin(async move {
            *self.calls.entry(url.as_str().to_string()).or_default() += 1;
            let tracked = !url.as_url().path().ends_with("/robots.txt");
            if tracked {
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            }

            let result = match self.routes.get(url.as_str()).cloned() {
                Some(Route::Respond(response)) => Ok(response),
                Some(Route::Fail(error)) => Err(error),
                Some(Route::Slow(delay, response)) => {
                    tokio::time::sleep(delay).await;
                    Ok(response)
                }
                None => Ok(FetchResponse::new(404, Some("text/html".into()), "not found")),
            };

            if tracked {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
            }
            result
        })
    }
}

/// Collects every observer callback
#[derive(Default)]
pub struct RecordingObserver {
    outcomes: Mutex<Vec<(String, PageOutcome)>>,
    seeded: Mutex<Vec<(String, usize)>>,
    finished: AtomicBool,
}

#[allow(dead_code)]
impl RecordingObserver {
    pub fn outcomes(&self) -> Vec<(String, PageOutcome)> {
        self.outcomes.lock().unwrap().clone()
    }

    pub fn outcomes_for(&self, url: &str) -> Vec<PageOutcome> {
        self.outcomes()
            .into_iter()
            .filter(|(u, _)| u == url)
            .map(|(_, outcome)| outcome)
            .collect()
    }

    pub fn count(&self, reason: DropReason) -> usize {
        self.outcomes()
            .iter()
            .filter(|(_, outcome)| outcome.drop_reason() == Some(reason))
            .count()
    }

    pub fn seeded(&self) -> Vec<(String, usize)> {
        self.seeded.lock().unwrap().clone()
    }

    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

impl CrawlObserver for RecordingObserver {
    fn on_outcome(&self, url: &str, outcome: &PageOutcome) {
        self.outcomes
            .lock()
            .unwrap()
            .push((url.to_string(), outcome.clone()));
    }

    fn on_sitemap_seeded(&self, sitemap_url: &str, added: usize) {
        self.seeded
            .lock()
            .unwrap()
            .push((sitemap_url.to_string(), added));
    }

    fn on_finished(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }
}

/// File store that keeps downloads in memory
#[derive(Default)]
pub struct MemoryFileStore {
    files: DashMap<String, Bytes>,
}

#[allow(dead_code)]
impl MemoryFileStore {
    pub fn get(&self, url: &str) -> Option<Bytes> {
        self.files.get(url).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

impl FileStore for MemoryFileStore {
    fn save<'a>(
        &'a self,
        url: &'a CanonicalUrl,
        bytes: Bytes,
    ) -> BoxFuture<'a, std::io::Result<PathBuf>> {
        Box::pin(async move {
            self.files.insert(url.as_str().to_string(), bytes);
            Ok(PathBuf::from("memory").join(url.as_url().path().trim_start_matches('/')))
        })
    }
}

/// Config with pacing disabled and short idle waits, suitable for mock crawls
#[allow(dead_code)]
pub fn test_config<S: Into<String>>(seeds: impl IntoIterator<Item = S>) -> CrawlConfigBuilder<WithStartUrls> {
    CrawlConfig::builder()
        .start_urls(seeds)
        .default_crawl_delay(Duration::ZERO)
        .pop_timeout(Duration::from_secs(1))
}

/// Default collaborators around a mock fetcher and an in-memory file store
#[allow(dead_code)]
pub fn collaborators(
    config: &CrawlConfig,
    fetcher: Arc<MockFetcher>,
    store: Arc<MemoryFileStore>,
) -> Collaborators {
    let mut collaborators = Collaborators::with_fetcher(config, fetcher);
    collaborators.file_store = store;
    collaborators
}
