//! Core types for crawl operations.
//!
//! This module contains the error taxonomy used throughout the frontier engine
//! and the per-URL outcome types reported to observers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Errors that can occur while crawling a single URL or bootstrapping a crawl.
///
/// Only `Config` and `Bootstrap` are fatal. Every other variant is caught at the
/// coordinator boundary and converted into a logged drop.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// Malformed or non-crawlable URL
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Fetch or render failure
    #[error("Transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    /// robots.txt could not be retrieved (resolved to an allow-all policy)
    #[error("robots.txt unavailable for {domain}: {reason}")]
    PolicyFetch { domain: String, reason: String },

    /// File persistence failure
    #[error("Failed to persist {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The crawl could not be started or a worker died
    #[error("Bootstrap error: {0}")]
    Bootstrap(String),
}

impl CrawlError {
    pub fn invalid_url(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error must abort the whole crawl
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Bootstrap(_))
    }
}

/// Convenience alias for Result with `CrawlError`
pub type CrawlResult<T> = Result<T, CrawlError>;

/// Failure reported by a `Fetcher` collaborator
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Request(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("fetch cancelled")]
    Cancelled,
}

/// Why a URL was dropped before or during processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    InvalidUrl,
    OutOfScope,
    RobotsDisallowed,
    AlreadyVisited,
    Transport,
    DuplicateContent,
    Io,
    Cancelled,
}

impl DropReason {
    pub const COUNT: usize = 8;

    pub const ALL: [DropReason; Self::COUNT] = [
        Self::InvalidUrl,
        Self::OutOfScope,
        Self::RobotsDisallowed,
        Self::AlreadyVisited,
        Self::Transport,
        Self::DuplicateContent,
        Self::Io,
        Self::Cancelled,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::OutOfScope => "out_of_scope",
            Self::RobotsDisallowed => "robots_disallowed",
            Self::AlreadyVisited => "already_visited",
            Self::Transport => "transport",
            Self::DuplicateContent => "duplicate_content",
            Self::Io => "io",
            Self::Cancelled => "cancelled",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final outcome of one dequeued URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageOutcome {
    /// HTML page passed the content gate and its links were extracted
    Processed {
        links_found: usize,
        links_enqueued: usize,
        images_found: usize,
    },
    /// Sitemap document whose entries were enqueued
    Sitemap { urls_found: usize, urls_enqueued: usize },
    /// Downloadable file persisted to the store
    Downloaded { path: std::path::PathBuf },
    /// Dropped with a reason, no further work for this URL
    Dropped(DropReason),
}

impl PageOutcome {
    #[must_use]
    pub fn drop_reason(&self) -> Option<DropReason> {
        match self {
            Self::Dropped(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Content class of a fetched document, decides the dispatch path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    Download,
    Xml,
    Html,
}
