//! Crawl Engine Module
//!
//! This module contains the frontier and politeness engine: the concurrent URL
//! queue, the visited registry, the robots policy cache with sitemap seeding, the
//! content dedup gate and the worker pool that ties them together.

// Sub-modules
pub mod content_gate;
pub mod crawl_types;
pub mod crawler;
pub mod domain_limiter;
pub mod frontier;
pub mod link_processor;
pub mod orchestrator;
pub mod page_processor;
pub mod page_timeout;
pub mod policy_store;
pub mod progress;
pub mod robots;
pub mod stats;
pub mod visited;

// Re-export crawl types
pub use crawl_types::{
    ContentClass, CrawlError, CrawlResult, DropReason, PageOutcome, TransportError,
};

// Re-export the core components
pub use content_gate::{ContentDedupGate, ContentFingerprint};
pub use domain_limiter::DomainLimiter;
pub use frontier::{Frontier, Lease, Pop};
pub use link_processor::{EnqueueOutcome, EnqueueSummary, LinkEnqueuer};
pub use policy_store::{PolicyStore, SitemapSeeder};
pub use robots::{RobotsPolicy, RobotsRule, RuleKind, is_allowed};
pub use visited::VisitedRegistry;

// Re-export orchestration and progress types for advanced usage
pub use crawler::{CrawlReport, Crawler, run};
pub use orchestrator::{run_workers, worker_loop};
pub use page_processor::{CrawlContext, UrlResult, classify, process_url};
pub use progress::{CrawlObserver, NoOpObserver};
pub use stats::{CrawlStats, StatsSnapshot};
