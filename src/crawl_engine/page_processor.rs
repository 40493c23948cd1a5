//! Single URL processing logic
//!
//! Handles the complete lifecycle of one dequeued URL:
//! - Domain-allow, robots and visited admission
//! - Fetch under the per-domain limit and the fetch timeout
//! - Dispatch by content class (download, sitemap XML, HTML)
//! - Content dedup and link discovery
//! - Outcome reporting to stats, observer and log

use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::content_gate::ContentDedupGate;
use super::crawl_types::{ContentClass, CrawlError, DropReason, PageOutcome, TransportError};
use super::domain_limiter::DomainLimiter;
use super::frontier::Frontier;
use super::link_processor::LinkEnqueuer;
use super::page_timeout::with_timeout;
use super::policy_store::{PolicyStore, SitemapSeeder};
use super::progress::CrawlObserver;
use super::robots;
use super::stats::CrawlStats;
use super::visited::VisitedRegistry;
use crate::canonical::CanonicalUrl;
use crate::collaborators::{Collaborators, FetchResponse};
use crate::config::CrawlConfig;
use crate::utils::path_extension;

/// Shared state of one crawl, owned by the worker pool through an `Arc`
pub struct CrawlContext {
    pub(crate) config: CrawlConfig,
    pub(crate) frontier: Arc<Frontier>,
    pub(crate) visited: Arc<VisitedRegistry>,
    pub(crate) content_gate: ContentDedupGate,
    pub(crate) policies: PolicyStore,
    pub(crate) domain_limiter: DomainLimiter,
    pub(crate) collaborators: Collaborators,
    pub(crate) enqueuer: LinkEnqueuer,
    pub(crate) stats: Arc<CrawlStats>,
    pub(crate) observer: Arc<dyn CrawlObserver>,
    pub(crate) cancel: CancellationToken,
}

impl CrawlContext {
    #[must_use]
    pub fn new(
        config: CrawlConfig,
        collaborators: Collaborators,
        observer: Arc<dyn CrawlObserver>,
        cancel: CancellationToken,
    ) -> Self {
        let frontier = Arc::new(Frontier::new(config.max_queue_size()));
        let visited = Arc::new(VisitedRegistry::new());
        let stats = Arc::new(CrawlStats::new());
        let enqueuer = LinkEnqueuer::new(
            Arc::clone(&frontier),
            Arc::clone(&visited),
            Arc::clone(&collaborators.scope),
        );

        let seeder = SitemapSeeder::new(
            enqueuer.clone(),
            Arc::clone(&collaborators.fetcher),
            Arc::clone(&collaborators.sitemap_parser),
            config.fetch_timeout(),
            Arc::clone(&stats),
            Arc::clone(&observer),
        );
        let policies = PolicyStore::new(
            Arc::clone(&collaborators.fetcher),
            config.robots_timeout(),
            config.respect_robots(),
        )
        .with_seeder(seeder);

        Self {
            domain_limiter: DomainLimiter::new(config.max_concurrent_per_domain()),
            config,
            frontier,
            visited,
            content_gate: ContentDedupGate::new(),
            policies,
            collaborators,
            enqueuer,
            stats,
            observer,
            cancel,
        }
    }

    #[must_use]
    pub fn frontier(&self) -> &Arc<Frontier> {
        &self.frontier
    }

    #[must_use]
    pub fn visited(&self) -> &VisitedRegistry {
        &self.visited
    }

    #[must_use]
    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    /// Count, log and publish one final outcome
    pub fn report(&self, url: &str, result: &UrlResult) {
        self.stats.record(&result.outcome);
        match (&result.outcome, &result.error) {
            (PageOutcome::Dropped(_), Some(error)) => {
                warn!(target: "frontier::coordinator", "Dropping {url}: {error}");
            }
            (PageOutcome::Dropped(reason), None) => {
                debug!(target: "frontier::coordinator", "Dropping {url}: {reason}");
            }
            (
                PageOutcome::Processed {
                    links_found,
                    links_enqueued,
                    images_found,
                },
                _,
            ) => {
                info!(
                    target: "frontier::coordinator",
                    "Processed {url}: {links_enqueued}/{links_found} links enqueued, {images_found} images"
                );
            }
            (
                PageOutcome::Sitemap {
                    urls_found,
                    urls_enqueued,
                },
                _,
            ) => {
                info!(
                    target: "frontier::coordinator",
                    "Sitemap {url}: {urls_enqueued}/{urls_found} urls enqueued"
                );
            }
            (PageOutcome::Downloaded { path }, _) => {
                info!(target: "frontier::coordinator", "Downloaded {url} to {}", path.display());
            }
        }
        self.observer.on_outcome(url, &result.outcome);
    }
}

impl std::fmt::Debug for CrawlContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlContext")
            .field("frontier", &self.frontier)
            .field("visited", &self.visited.len())
            .field("policies", &self.policies)
            .finish_non_exhaustive()
    }
}

/// Outcome of one URL plus what the worker owes afterwards
#[derive(Debug)]
pub struct UrlResult {
    pub outcome: PageOutcome,
    /// Error behind a drop, logged with the outcome
    pub error: Option<CrawlError>,
    /// Pause before this worker's next dequeue; set once a request was made
    pub pace: Option<Duration>,
}

impl UrlResult {
    #[must_use]
    pub fn dropped(reason: DropReason) -> Self {
        Self {
            outcome: PageOutcome::Dropped(reason),
            error: None,
            pace: None,
        }
    }

    #[must_use]
    pub fn cancelled() -> Self {
        Self::dropped(DropReason::Cancelled)
    }

    fn paced(outcome: PageOutcome, pace: Duration) -> Self {
        Self {
            outcome,
            error: None,
            pace: Some(pace),
        }
    }

    fn failed(reason: DropReason, error: CrawlError, pace: Duration) -> Self {
        Self {
            outcome: PageOutcome::Dropped(reason),
            error: Some(error),
            pace: Some(pace),
        }
    }
}

/// Decide how a fetched document is handled
#[must_use]
pub fn classify(config: &CrawlConfig, url: &CanonicalUrl, response: &FetchResponse) -> ContentClass {
    let extension = path_extension(url.as_url().path());
    if extension.is_some_and(|ext| config.is_downloadable_extension(&ext)) {
        ContentClass::Download
    } else if response.is_xml() {
        ContentClass::Xml
    } else {
        ContentClass::Html
    }
}

/// Run one dequeued URL through admission, fetch and dispatch
///
/// Never fails: every error becomes a dropped outcome carrying the error.
pub async fn process_url(ctx: &CrawlContext, url: &CanonicalUrl) -> UrlResult {
    if !ctx.collaborators.scope.is_in_scope(url) {
        return UrlResult::dropped(DropReason::OutOfScope);
    }

    let policy = ctx.policies.get_policy(url).await;
    if !robots::is_allowed(&policy, url) {
        return UrlResult::dropped(DropReason::RobotsDisallowed);
    }

    if !ctx.visited.admit(url) {
        return UrlResult::dropped(DropReason::AlreadyVisited);
    }

    let pace = policy
        .crawl_delay()
        .unwrap_or_else(|| ctx.config.default_crawl_delay());

    let fetched = {
        let _permit = ctx.domain_limiter.acquire(&url.domain_key()).await;
        debug!(target: "frontier::coordinator", "Fetching {url}");
        with_timeout(ctx.collaborators.fetcher.fetch(url), ctx.config.fetch_timeout()).await
    };

    let response = match fetched {
        Ok(response) if response.is_success() => response,
        Ok(response) => {
            let error = CrawlError::Transport {
                url: url.to_string(),
                source: TransportError::Status(response.status),
            };
            return UrlResult::failed(DropReason::Transport, error, pace);
        }
        Err(source) => {
            let error = CrawlError::Transport {
                url: url.to_string(),
                source,
            };
            return UrlResult::failed(DropReason::Transport, error, pace);
        }
    };

    match classify(&ctx.config, url, &response) {
        ContentClass::Download => save_download(ctx, url, response, pace).await,
        ContentClass::Xml => {
            let entries = ctx.collaborators.sitemap_parser.parse_sitemap(&response.body);
            let summary = ctx
                .enqueuer
                .enqueue_absolutes(entries.iter().map(String::as_str));
            UrlResult::paced(
                PageOutcome::Sitemap {
                    urls_found: summary.found,
                    urls_enqueued: summary.enqueued,
                },
                pace,
            )
        }
        ContentClass::Html => process_html(ctx, url, &response, pace),
    }
}

async fn save_download(
    ctx: &CrawlContext,
    url: &CanonicalUrl,
    response: FetchResponse,
    pace: Duration,
) -> UrlResult {
    match ctx.collaborators.file_store.save(url, response.body).await {
        Ok(path) => UrlResult::paced(PageOutcome::Downloaded { path }, pace),
        Err(source) => UrlResult::failed(
            DropReason::Io,
            CrawlError::Io {
                url: url.to_string(),
                source,
            },
            pace,
        ),
    }
}

fn process_html(
    ctx: &CrawlContext,
    url: &CanonicalUrl,
    response: &FetchResponse,
    pace: Duration,
) -> UrlResult {
    // Fingerprint before any extraction so duplicates add nothing to the frontier
    if !ctx.content_gate.admit_body(&response.body) {
        return UrlResult::paced(PageOutcome::Dropped(DropReason::DuplicateContent), pace);
    }

    // Relative links resolve against where the document was served from
    let base = response.base_url(url);
    let body = response.text();
    let links = ctx.collaborators.link_extractor.extract_links(&body);
    let summary = ctx
        .enqueuer
        .enqueue_hrefs(base, links.iter().map(String::as_str));
    let images = ctx
        .collaborators
        .link_extractor
        .extract_image_sources(&body, base);

    UrlResult::paced(
        PageOutcome::Processed {
            links_found: summary.found,
            links_enqueued: summary.enqueued,
            images_found: images.len(),
        },
        pace,
    )
}
