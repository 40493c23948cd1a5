//! Crawl entry points
//!
//! [`Crawler`] owns a configuration and a set of collaborators and runs one crawl
//! per call to [`Crawler::run`], each with fresh shared state. [`run`] is the
//! shortcut that builds the default collaborators for a set of seeds.

use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use super::crawl_types::{CrawlError, CrawlResult, DropReason};
use super::orchestrator::run_workers;
use super::page_processor::{CrawlContext, UrlResult};
use super::progress::{CrawlObserver, NoOpObserver};
use super::stats::StatsSnapshot;
use crate::canonical::{CanonicalUrl, canonicalize};
use crate::collaborators::Collaborators;
use crate::config::CrawlConfig;

/// Summary of a finished crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub stats: StatsSnapshot,
    /// Every URL admitted into the crawl, sorted
    pub visited: Vec<CanonicalUrl>,
    /// Distinct document bodies seen by the content gate
    pub unique_documents: usize,
    /// Domains whose robots policy was resolved
    pub policy_domains: usize,
    /// Frontier entries never processed (limit or cancellation)
    pub unprocessed: usize,
    pub limit_reached: bool,
    pub cancelled: bool,
    pub elapsed_ms: u64,
}

impl CrawlReport {
    /// Size of the visited set
    #[must_use]
    pub fn admitted(&self) -> usize {
        self.visited.len()
    }

    #[must_use]
    pub fn was_visited(&self, url: &str) -> bool {
        canonicalize(url).is_ok_and(|url| self.visited.contains(&url))
    }

    #[must_use]
    pub fn dropped(&self, reason: DropReason) -> u64 {
        self.stats.dropped(reason)
    }
}

/// A configured crawler; every [`run`](Crawler::run) is an independent crawl
pub struct Crawler {
    config: CrawlConfig,
    collaborators: Collaborators,
    observer: Arc<dyn CrawlObserver>,
    cancel: CancellationToken,
}

impl Crawler {
    #[must_use]
    pub fn new(config: CrawlConfig, collaborators: Collaborators) -> Self {
        Self {
            config,
            collaborators,
            observer: Arc::new(NoOpObserver),
            cancel: CancellationToken::new(),
        }
    }

    /// Receive every per-URL outcome
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn CrawlObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Stop the crawl when `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Token that cancels crawls started by this crawler
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Crawl from `seeds` until the frontier drains, the page limit is reached or the
    /// crawl is cancelled.
    ///
    /// Seeds that fail to canonicalize are reported as `InvalidUrl` drops.
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::Bootstrap` when a worker task panicked.
    pub async fn run<I, S>(&self, seeds: I) -> CrawlResult<CrawlReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let started = Instant::now();
        let ctx = Arc::new(CrawlContext::new(
            self.config.clone(),
            self.collaborators.clone(),
            Arc::clone(&self.observer),
            self.cancel.child_token(),
        ));

        let mut seeded = 0usize;
        for seed in seeds {
            let seed = seed.as_ref();
            match canonicalize(seed) {
                Ok(url) => {
                    if ctx.frontier.push(url) {
                        seeded += 1;
                    }
                }
                Err(e) => {
                    let result = UrlResult {
                        error: Some(e),
                        ..UrlResult::dropped(DropReason::InvalidUrl)
                    };
                    ctx.report(seed, &result);
                }
            }
        }

        if seeded == 0 {
            warn!(target: "frontier::coordinator", "No valid seed URLs, nothing to crawl");
        } else {
            info!(
                target: "frontier::coordinator",
                "Starting crawl with {seeded} seeds and {} workers",
                self.config.concurrency()
            );
        }

        let outcome = run_workers(Arc::clone(&ctx), self.config.concurrency()).await;
        self.observer.on_finished();
        outcome?;

        let stats = ctx.stats.snapshot();
        let report = CrawlReport {
            limit_reached: self
                .config
                .limit()
                .is_some_and(|limit| stats.pages_processed >= limit as u64),
            stats,
            visited: ctx.visited.snapshot(),
            unique_documents: ctx.content_gate.len(),
            policy_domains: ctx.policies.len(),
            unprocessed: ctx.frontier.len(),
            cancelled: ctx.cancel.is_cancelled(),
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        info!(
            target: "frontier::coordinator",
            "Crawl finished in {}ms: {} visited, {} processed, {} dropped, {} failed",
            report.elapsed_ms,
            report.admitted(),
            report.stats.pages_processed,
            report.stats.total_dropped(),
            report.stats.failed()
        );
        Ok(report)
    }
}

impl std::fmt::Debug for Crawler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crawler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Crawl `seeds` with `concurrency` workers and the default collaborators
///
/// The allow-list is derived from the seed hosts.
///
/// # Errors
///
/// Returns `CrawlError::Config` for an invalid configuration (for example zero
/// workers) and `CrawlError::Bootstrap` when the HTTP client or browser cannot be
/// started or a worker panicked.
pub async fn run<I, S>(seeds: I, concurrency: usize) -> CrawlResult<CrawlReport>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let config = CrawlConfig::builder()
        .start_urls(seeds)
        .concurrency(concurrency)
        .build()
        .map_err(|e| CrawlError::Config(format!("{e:#}")))?;
    let collaborators = Collaborators::from_config(&config).await?;
    let seeds = config.start_urls().to_vec();
    Crawler::new(config, collaborators).run(seeds).await
}
