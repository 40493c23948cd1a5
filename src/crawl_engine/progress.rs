//! Progress reporting abstraction for crawl operations
//!
//! Defines the `CrawlObserver` trait that receives every per-URL outcome
//! and provides a no-op implementation for simple use cases.

use super::crawl_types::PageOutcome;

/// Receives crawl lifecycle events
///
/// Implementations can send updates to channels, log to console, update UI, etc.
/// Callbacks run on worker tasks and must not block.
pub trait CrawlObserver: Send + Sync {
    /// Final outcome of one URL (raw form for URLs that never canonicalized)
    fn on_outcome(&self, url: &str, outcome: &PageOutcome);

    /// URLs added to the frontier from a sitemap listed in robots.txt
    fn on_sitemap_seeded(&self, _sitemap_url: &str, _added: usize) {}

    /// All workers have exited
    fn on_finished(&self) {}
}

/// Observer that does nothing
///
/// All methods are no-ops and will be inlined away by the compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl CrawlObserver for NoOpObserver {
    #[inline(always)]
    fn on_outcome(&self, _url: &str, _outcome: &PageOutcome) {}
}
