//! Crawl statistics using lock-free atomic counters
//!
//! All counters use `Ordering::SeqCst` so that snapshot reads are coherent
//! across fields once the worker pool has stopped.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::crawl_types::{DropReason, PageOutcome};

#[derive(Debug, Default)]
pub struct CrawlStats {
    pages_processed: AtomicU64,
    sitemaps_processed: AtomicU64,
    downloads: AtomicU64,
    links_found: AtomicU64,
    links_enqueued: AtomicU64,
    images_found: AtomicU64,
    sitemap_seeded: AtomicU64,
    dropped: [AtomicU64; DropReason::COUNT],
}

impl CrawlStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one per-URL outcome into the counters
    pub fn record(&self, outcome: &PageOutcome) {
        match outcome {
            PageOutcome::Processed {
                links_found,
                links_enqueued,
                images_found,
            } => {
                self.pages_processed.fetch_add(1, Ordering::SeqCst);
                self.links_found.fetch_add(*links_found as u64, Ordering::SeqCst);
                self.links_enqueued
                    .fetch_add(*links_enqueued as u64, Ordering::SeqCst);
                self.images_found.fetch_add(*images_found as u64, Ordering::SeqCst);
            }
            PageOutcome::Sitemap {
                urls_found,
                urls_enqueued,
            } => {
                self.sitemaps_processed.fetch_add(1, Ordering::SeqCst);
                self.links_found.fetch_add(*urls_found as u64, Ordering::SeqCst);
                self.links_enqueued
                    .fetch_add(*urls_enqueued as u64, Ordering::SeqCst);
            }
            PageOutcome::Downloaded { .. } => {
                self.downloads.fetch_add(1, Ordering::SeqCst);
            }
            PageOutcome::Dropped(reason) => {
                self.dropped[reason.index()].fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    /// URLs pushed from robots.txt sitemaps
    pub fn record_seeded(&self, count: usize) {
        self.sitemap_seeded.fetch_add(count as u64, Ordering::SeqCst);
    }

    /// Number of dequeued URLs that reached a final outcome
    #[must_use]
    pub fn completed(&self) -> u64 {
        self.snapshot().total_outcomes()
    }

    /// Successfully processed HTML pages, the quantity the page limit applies to
    #[must_use]
    pub fn pages_processed(&self) -> u64 {
        self.pages_processed.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_processed: self.pages_processed.load(Ordering::SeqCst),
            sitemaps_processed: self.sitemaps_processed.load(Ordering::SeqCst),
            downloads: self.downloads.load(Ordering::SeqCst),
            links_found: self.links_found.load(Ordering::SeqCst),
            links_enqueued: self.links_enqueued.load(Ordering::SeqCst),
            images_found: self.images_found.load(Ordering::SeqCst),
            sitemap_seeded: self.sitemap_seeded.load(Ordering::SeqCst),
            dropped: DropReason::ALL
                .iter()
                .map(|reason| (*reason, self.dropped[reason.index()].load(Ordering::SeqCst)))
                .filter(|(_, count)| *count > 0)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub pages_processed: u64,
    pub sitemaps_processed: u64,
    pub downloads: u64,
    pub links_found: u64,
    pub links_enqueued: u64,
    pub images_found: u64,
    pub sitemap_seeded: u64,
    /// Non-zero drop counts by reason
    pub dropped: BTreeMap<DropReason, u64>,
}

impl StatsSnapshot {
    #[must_use]
    pub fn dropped(&self, reason: DropReason) -> u64 {
        self.dropped.get(&reason).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_dropped(&self) -> u64 {
        self.dropped.values().sum()
    }

    /// Failed fetches and failed persistence
    #[must_use]
    pub fn failed(&self) -> u64 {
        self.dropped(DropReason::Transport) + self.dropped(DropReason::Io)
    }

    #[must_use]
    pub fn total_outcomes(&self) -> u64 {
        self.pages_processed + self.sitemaps_processed + self.downloads + self.total_dropped()
    }
}
