//! Registry of URLs admitted into the crawl
//!
//! `DashSet::insert` takes the shard write lock, tests membership and inserts in one
//! critical section, so `admit` is a linearizable insert-if-absent per URL.

use dashmap::DashSet;

use crate::canonical::CanonicalUrl;

#[derive(Debug, Default)]
pub struct VisitedRegistry {
    urls: DashSet<CanonicalUrl>,
}

impl VisitedRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim ownership of processing `url`.
    ///
    /// Returns `true` for exactly one caller per URL, whether calls are concurrent or
    /// sequential. Every other caller gets `false` and must not process the URL.
    pub fn admit(&self, url: &CanonicalUrl) -> bool {
        self.urls.insert(url.clone())
    }

    /// Membership test for enqueue filtering only; never use it to decide admission
    #[must_use]
    pub fn contains(&self, url: &CanonicalUrl) -> bool {
        self.urls.contains(url)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Sorted copy of every admitted URL
    #[must_use]
    pub fn snapshot(&self) -> Vec<CanonicalUrl> {
        let mut urls: Vec<CanonicalUrl> = self.urls.iter().map(|entry| entry.key().clone()).collect();
        urls.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::canonicalize;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_admit_once() {
        let registry = VisitedRegistry::new();
        let url = canonicalize("http://example.test/a").unwrap();

        assert!(registry.admit(&url));
        assert!(!registry.admit(&url));
        assert!(registry.contains(&url));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_equivalent_spellings_share_entry() {
        let registry = VisitedRegistry::new();
        assert!(registry.admit(&canonicalize("http://Example.test:80//a").unwrap()));
        assert!(!registry.admit(&canonicalize("http://example.test/a#frag").unwrap()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_admit_single_winner() {
        let registry = Arc::new(VisitedRegistry::new());
        let winners = Arc::new(AtomicUsize::new(0));
        let url = canonicalize("http://example.test/contended").unwrap();

        let mut handles = Vec::new();
        for _ in 0..64 {
            let registry = Arc::clone(&registry);
            let winners = Arc::clone(&winners);
            let url = url.clone();
            handles.push(tokio::spawn(async move {
                if registry.admit(&url) {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }
}
