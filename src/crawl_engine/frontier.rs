//! Concurrent crawl frontier with in-flight work tracking
//!
//! The frontier is a lock-free MPMC FIFO of canonical URLs. Besides the queue itself
//! it counts *in-flight* work: every queued entry plus every entry a worker has popped
//! but not yet finished. A popped entry is handed out as a [`Lease`]; dropping the lease
//! marks that unit of work complete.
//!
//! Workers learn that the crawl is over when the queue is empty **and** nothing is in
//! flight, which is the only state in which no further work can ever appear.

use crossbeam_queue::SegQueue;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::canonical::CanonicalUrl;

/// Result of a [`Frontier::pop`] call
#[derive(Debug)]
pub enum Pop<'a> {
    /// A URL this worker now exclusively owns
    Item(Lease<'a>),
    /// Timed out waiting; other workers still hold in-flight work
    Empty,
    /// Queue empty, nothing in flight, or the frontier was closed
    Drained,
}

/// Exclusive ownership of one dequeued URL until dropped
#[derive(Debug)]
pub struct Lease<'a> {
    url: CanonicalUrl,
    frontier: &'a Frontier,
}

impl Lease<'_> {
    #[must_use]
    pub fn url(&self) -> &CanonicalUrl {
        &self.url
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        self.frontier.finish_one();
    }
}

/// Multi-producer multi-consumer URL queue
#[derive(Debug)]
pub struct Frontier {
    queue: SegQueue<CanonicalUrl>,
    /// Entries currently sitting in `queue`
    queued: AtomicUsize,
    /// Queued entries plus outstanding leases
    in_flight: AtomicUsize,
    /// Total URLs ever accepted by `push`
    pushed: AtomicUsize,
    closed: AtomicBool,
    notify: Notify,
    max_queue_size: Option<usize>,
}

impl Frontier {
    #[must_use]
    pub fn new(max_queue_size: Option<usize>) -> Self {
        Self {
            queue: SegQueue::new(),
            queued: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            pushed: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
            notify: Notify::new(),
            max_queue_size,
        }
    }

    /// Enqueue a URL.
    ///
    /// Returns `false` when the frontier is closed or the optional size cap is reached.
    /// The cap is checked without a lock, so concurrent producers may overshoot it by
    /// at most the number of producers.
    pub fn push(&self, url: CanonicalUrl) -> bool {
        if self.closed.load(Ordering::Acquire) {
            debug!(target: "frontier::queue", "Frontier closed, dropping {url}");
            return false;
        }

        if let Some(cap) = self.max_queue_size
            && self.queued.load(Ordering::Acquire) >= cap
        {
            warn!(target: "frontier::queue", "Frontier full ({cap} entries), dropping {url}");
            return false;
        }

        // in_flight must be raised before the entry becomes visible to consumers
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        self.queued.fetch_add(1, Ordering::AcqRel);
        self.pushed.fetch_add(1, Ordering::Relaxed);
        self.queue.push(url);
        self.notify.notify_one();
        true
    }

    /// Wait up to `timeout` for a URL.
    pub async fn pop(&self, timeout: Duration) -> Pop<'_> {
        let deadline = Instant::now() + timeout;

        loop {
            // Register interest before inspecting state so no wake-up is lost
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.closed.load(Ordering::Acquire) {
                return Pop::Drained;
            }

            if let Some(url) = self.queue.pop() {
                self.queued.fetch_sub(1, Ordering::AcqRel);
                return Pop::Item(Lease {
                    url,
                    frontier: self,
                });
            }

            if self.in_flight.load(Ordering::Acquire) == 0 {
                return Pop::Drained;
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Pop::Empty;
            }
        }
    }

    /// Stop handing out work; every current and future `pop` returns `Drained`
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!(target: "frontier::queue", "Frontier closed with {} queued entries", self.len());
        }
        self.notify.notify_waiters();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Entries waiting in the queue
    #[must_use]
    pub fn len(&self) -> usize {
        self.queued.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queued entries plus outstanding leases
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Total URLs accepted since creation
    #[must_use]
    pub fn total_pushed(&self) -> usize {
        self.pushed.load(Ordering::Relaxed)
    }

    fn finish_one(&self) {
        if self.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            // Last unit of work finished: wake every idle worker so they observe Drained
            self.notify.notify_waiters();
        }
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new(None)
    }
}
