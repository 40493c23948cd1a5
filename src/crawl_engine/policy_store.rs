//! Per-domain robots policy cache with sitemap seeding
//!
//! The first request for a domain fetches `/robots.txt` once; concurrent callers for
//! the same domain await the same in-flight fetch through a per-domain `OnceCell`.
//! Fetch failures resolve to an allow-all policy (fail-open).
//!
//! The caller whose fetch populated the cell also seeds the frontier with every URL
//! listed in the sitemaps the robots file names.

use dashmap::DashMap;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::crawl_types::CrawlError;
use super::link_processor::LinkEnqueuer;
use super::page_timeout::with_timeout;
use super::progress::CrawlObserver;
use super::robots::RobotsPolicy;
use super::stats::CrawlStats;
use crate::canonical::{CanonicalUrl, DomainKey, canonicalize};
use crate::collaborators::{Fetcher, SitemapParser};

/// Expands robots.txt `Sitemap:` lines into frontier entries
pub struct SitemapSeeder {
    enqueuer: LinkEnqueuer,
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn SitemapParser>,
    fetch_timeout: Duration,
    stats: Arc<CrawlStats>,
    observer: Arc<dyn CrawlObserver>,
}

impl SitemapSeeder {
    #[must_use]
    pub fn new(
        enqueuer: LinkEnqueuer,
        fetcher: Arc<dyn Fetcher>,
        parser: Arc<dyn SitemapParser>,
        fetch_timeout: Duration,
        stats: Arc<CrawlStats>,
        observer: Arc<dyn CrawlObserver>,
    ) -> Self {
        Self {
            enqueuer,
            fetcher,
            parser,
            fetch_timeout,
            stats,
            observer,
        }
    }

    /// Fetch every sitemap named by `policy` and enqueue its entries.
    ///
    /// Returns the number of URLs added to the frontier.
    pub async fn seed(&self, policy: &RobotsPolicy) -> usize {
        let mut total = 0;
        for sitemap_url in policy.sitemaps() {
            let added = self.seed_one(sitemap_url).await;
            self.observer.on_sitemap_seeded(sitemap_url, added);
            total += added;
        }
        if !policy.sitemaps().is_empty() {
            info!(target: "frontier::sitemap", "Added {total} urls from sitemap!");
            self.stats.record_seeded(total);
        }
        total
    }

    async fn seed_one(&self, sitemap_url: &str) -> usize {
        let url = match canonicalize(sitemap_url) {
            Ok(url) => url,
            Err(e) => {
                warn!(target: "frontier::sitemap", "Ignoring sitemap: {e}");
                return 0;
            }
        };

        let response = match with_timeout(self.fetcher.fetch(&url), self.fetch_timeout).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                warn!(
                    target: "frontier::sitemap",
                    "Sitemap {url} returned HTTP {}", response.status
                );
                return 0;
            }
            Err(e) => {
                warn!(target: "frontier::sitemap", "Failed to fetch sitemap {url}: {e}");
                return 0;
            }
        };

        let entries = self.parser.parse_sitemap(&response.body);
        let summary = self
            .enqueuer
            .enqueue_absolutes(entries.iter().map(String::as_str));
        debug!(
            target: "frontier::sitemap",
            "Sitemap {url}: {} entries, {} enqueued",
            summary.found,
            summary.enqueued
        );
        summary.enqueued
    }
}

/// Lazily populated, memoized robots policies keyed by domain
pub struct PolicyStore {
    policies: DashMap<DomainKey, Arc<OnceCell<Arc<RobotsPolicy>>>>,
    fetcher: Arc<dyn Fetcher>,
    robots_timeout: Duration,
    respect_robots: bool,
    seeder: Option<SitemapSeeder>,
    allow_all: Arc<RobotsPolicy>,
}

impl PolicyStore {
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>, robots_timeout: Duration, respect_robots: bool) -> Self {
        Self {
            policies: DashMap::new(),
            fetcher,
            robots_timeout,
            respect_robots,
            seeder: None,
            allow_all: Arc::new(RobotsPolicy::allow_all()),
        }
    }

    /// Seed the frontier from sitemaps of newly fetched policies
    #[must_use]
    pub fn with_seeder(mut self, seeder: SitemapSeeder) -> Self {
        self.seeder = Some(seeder);
        self
    }

    /// Policy for the domain of `url`, fetching it on first use
    pub async fn get_policy(&self, url: &CanonicalUrl) -> Arc<RobotsPolicy> {
        if !self.respect_robots {
            return Arc::clone(&self.allow_all);
        }

        let domain = url.domain_key();
        let cell = Arc::clone(self.policies.entry(domain.clone()).or_default().value());

        let mut fetched_here = false;
        let policy = cell
            .get_or_init(|| {
                fetched_here = true;
                self.fetch_policy(&domain)
            })
            .await;
        let policy = Arc::clone(policy);

        if fetched_here && let Some(seeder) = &self.seeder {
            seeder.seed(&policy).await;
        }
        policy
    }

    /// Policy already resolved for `domain`, without fetching
    #[must_use]
    pub fn cached(&self, domain: &DomainKey) -> Option<Arc<RobotsPolicy>> {
        self.policies
            .get(domain)
            .and_then(|cell| cell.get().map(Arc::clone))
    }

    /// Domains with a resolved policy
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn fetch_policy(&self, domain: &DomainKey) -> Arc<RobotsPolicy> {
        let robots_url = match canonicalize(&domain.robots_url()) {
            Ok(url) => url,
            Err(e) => {
                self.fail_open(domain, e.to_string());
                return Arc::clone(&self.allow_all);
            }
        };

        match with_timeout(self.fetcher.fetch(&robots_url), self.robots_timeout).await {
            Ok(response) if response.is_success() => {
                let policy = RobotsPolicy::parse(&response.text());
                info!(
                    target: "frontier::policy",
                    "Loaded robots.txt for {domain}: {} rules, crawl-delay {:?}, {} sitemaps",
                    policy.rules().len(),
                    policy.crawl_delay(),
                    policy.sitemaps().len()
                );
                Arc::new(policy)
            }
            Ok(response) => {
                self.fail_open(domain, format!("HTTP {}", response.status));
                Arc::clone(&self.allow_all)
            }
            Err(e) => {
                self.fail_open(domain, e.to_string());
                Arc::clone(&self.allow_all)
            }
        }
    }

    fn fail_open(&self, domain: &DomainKey, reason: String) {
        let error = CrawlError::PolicyFetch {
            domain: domain.to_string(),
            reason,
        };
        warn!(target: "frontier::policy", "{error}, allowing all paths");
    }
}

impl std::fmt::Debug for PolicyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyStore")
            .field("domains", &self.policies.len())
            .field("respect_robots", &self.respect_robots)
            .field("robots_timeout", &self.robots_timeout)
            .finish_non_exhaustive()
    }
}
