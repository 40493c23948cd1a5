//! Per-domain concurrency limiter
//!
//! Caps how many fetches run against one site at a time, independent of the size
//! of the worker pool.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::canonical::DomainKey;

/// Per-domain concurrency limiter using lock-free `DashMap`
///
/// Each domain gets its own semaphore, created lazily on first access.
#[derive(Debug)]
pub struct DomainLimiter {
    domain_semaphores: DashMap<DomainKey, Arc<Semaphore>>,
    max_per_domain: usize,
}

impl DomainLimiter {
    /// Create a limiter allowing `max_per_domain` concurrent fetches per domain (at least one)
    #[must_use]
    pub fn new(max_per_domain: usize) -> Self {
        Self {
            domain_semaphores: DashMap::new(),
            max_per_domain: max_per_domain.max(1),
        }
    }

    fn semaphore(&self, domain: &DomainKey) -> Arc<Semaphore> {
        self.domain_semaphores
            .entry(domain.clone())
            .or_insert_with(|| Arc::new(Semaphore::new(self.max_per_domain)))
            .clone()
    }

    /// Acquire a permit for `domain`, released when dropped
    pub async fn acquire(&self, domain: &DomainKey) -> OwnedSemaphorePermit {
        loop {
            match self.semaphore(domain).acquire_owned().await {
                Ok(permit) => return permit,
                Err(_) => {
                    // Semaphores are never closed; recover with a fresh one if it happens
                    log::error!(
                        target: "frontier::coordinator",
                        "Semaphore for domain '{domain}' was closed unexpectedly - replacing"
                    );
                    self.domain_semaphores.insert(
                        domain.clone(),
                        Arc::new(Semaphore::new(self.max_per_domain)),
                    );
                }
            }
        }
    }

    /// Permits currently free for `domain`
    #[must_use]
    pub fn available(&self, domain: &DomainKey) -> usize {
        self.domain_semaphores
            .get(domain)
            .map_or(self.max_per_domain, |semaphore| semaphore.available_permits())
    }
}
