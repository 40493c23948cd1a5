//! Content deduplication gate
//!
//! Pages reachable under several URLs (session ids, tracking parameters, mirrors)
//! are detected by hashing the fetched body. Only the first page with a given
//! fingerprint proceeds to link extraction.

use dashmap::DashSet;
use std::fmt;
use xxhash_rust::xxh3::xxh3_128;

/// 128-bit xxh3 hash of a document body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentFingerprint(u128);

impl ContentFingerprint {
    #[must_use]
    pub fn of(body: &[u8]) -> Self {
        Self(xxh3_128(body))
    }

    #[must_use]
    pub const fn as_u128(&self) -> u128 {
        self.0
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct ContentDedupGate {
    seen: DashSet<ContentFingerprint>,
}

impl ContentDedupGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert-if-absent on the fingerprint; `true` means this document is new
    pub fn admit_content(&self, fingerprint: ContentFingerprint) -> bool {
        self.seen.insert(fingerprint)
    }

    /// Fingerprint `body` and admit it in one step
    pub fn admit_body(&self, body: &[u8]) -> bool {
        self.admit_content(ContentFingerprint::of(body))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_fingerprint_is_stable() {
        let a = ContentFingerprint::of(b"<html>same</html>");
        let b = ContentFingerprint::of(b"<html>same</html>");
        let c = ContentFingerprint::of(b"<html>other</html>");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string().len(), 32);
    }

    #[test]
    fn test_duplicate_body_rejected() {
        let gate = ContentDedupGate::new();
        assert!(gate.admit_body(b"page"));
        assert!(!gate.admit_body(b"page"));
        assert!(gate.admit_body(b"page 2"));
        assert_eq!(gate.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_single_winner() {
        let gate = Arc::new(ContentDedupGate::new());
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let winners = Arc::clone(&winners);
                tokio::spawn(async move {
                    if gate.admit_body(b"identical body") {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
    }
}
