//! Link filtering and frontier admission
//!
//! Every discovered reference (page href, sitemap entry, seed) passes through
//! [`LinkEnqueuer`]: canonicalize, domain-allow filter, skip already visited, push.

use log::{debug, warn};
use std::sync::Arc;
use url::Url;

use super::frontier::Frontier;
use super::visited::VisitedRegistry;
use crate::canonical::{CanonicalUrl, canonicalize, canonicalize_relative};
use crate::collaborators::Scope;

/// What happened to one candidate reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Enqueued,
    Invalid,
    OutOfScope,
    AlreadyVisited,
    /// Frontier closed or full
    Rejected,
}

/// Counts for a batch of references
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnqueueSummary {
    pub found: usize,
    pub enqueued: usize,
}

/// Shared enqueue filter in front of the frontier
#[derive(Clone)]
pub struct LinkEnqueuer {
    frontier: Arc<Frontier>,
    visited: Arc<VisitedRegistry>,
    scope: Arc<dyn Scope>,
}

impl LinkEnqueuer {
    #[must_use]
    pub fn new(
        frontier: Arc<Frontier>,
        visited: Arc<VisitedRegistry>,
        scope: Arc<dyn Scope>,
    ) -> Self {
        Self {
            frontier,
            visited,
            scope,
        }
    }

    /// Filter and push an already canonical URL
    pub fn enqueue(&self, url: CanonicalUrl) -> EnqueueOutcome {
        if !self.scope.is_in_scope(&url) {
            debug!(target: "frontier::links", "Skipping out-of-scope {url}");
            return EnqueueOutcome::OutOfScope;
        }
        if self.visited.contains(&url) {
            return EnqueueOutcome::AlreadyVisited;
        }
        if self.frontier.push(url) {
            EnqueueOutcome::Enqueued
        } else {
            EnqueueOutcome::Rejected
        }
    }

    /// Canonicalize an absolute URL and enqueue it
    pub fn enqueue_absolute(&self, raw: &str) -> EnqueueOutcome {
        match canonicalize(raw) {
            Ok(url) => self.enqueue(url),
            Err(e) => {
                warn!(target: "frontier::links", "Dropping {e}");
                EnqueueOutcome::Invalid
            }
        }
    }

    /// Resolve `href` against `base`, then enqueue it
    pub fn enqueue_href(&self, base: &Url, href: &str) -> EnqueueOutcome {
        match canonicalize_relative(base, href) {
            Ok(url) => self.enqueue(url),
            Err(e) => {
                debug!(target: "frontier::links", "Skipping href on {base}: {e}");
                EnqueueOutcome::Invalid
            }
        }
    }

    /// Enqueue a batch of hrefs found on `base`
    pub fn enqueue_hrefs<'a, I>(&self, base: &Url, hrefs: I) -> EnqueueSummary
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut summary = EnqueueSummary::default();
        for href in hrefs {
            summary.found += 1;
            if self.enqueue_href(base, href) == EnqueueOutcome::Enqueued {
                summary.enqueued += 1;
            }
        }
        summary
    }

    /// Enqueue a batch of absolute URLs (sitemap entries)
    pub fn enqueue_absolutes<'a, I>(&self, urls: I) -> EnqueueSummary
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut summary = EnqueueSummary::default();
        for raw in urls {
            summary.found += 1;
            if self.enqueue_absolute(raw) == EnqueueOutcome::Enqueued {
                summary.enqueued += 1;
            }
        }
        summary
    }

    #[must_use]
    pub fn frontier(&self) -> &Arc<Frontier> {
        &self.frontier
    }
}

impl std::fmt::Debug for LinkEnqueuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkEnqueuer")
            .field("queued", &self.frontier.len())
            .field("visited", &self.visited.len())
            .finish_non_exhaustive()
    }
}
