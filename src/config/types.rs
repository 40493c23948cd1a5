//! Core configuration types for a crawl
//!
//! This module contains the main `CrawlConfig` struct. Durations are stored as
//! integer seconds or milliseconds so the struct round-trips through JSON config
//! files unchanged.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::builder::{CrawlConfigBuilder, WithStartUrls};

use crate::utils::{
    DEFAULT_CONCURRENCY, DEFAULT_CRAWL_DELAY_MS, DEFAULT_DOWNLOAD_DIR,
    DEFAULT_DOWNLOADABLE_EXTENSIONS, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_CONCURRENT_PER_DOMAIN,
    DEFAULT_POP_TIMEOUT_SECS, DEFAULT_ROBOTS_TIMEOUT_SECS, FRONTIER_USER_AGENT,
};

/// Main configuration struct for a crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub(crate) start_urls: Vec<String>,

    /// Hosts (and their subdomains) the crawl may visit, `*.` prefix accepted.
    ///
    /// Derived from the hosts of `start_urls` when left empty.
    pub(crate) allowed_domains: Vec<String>,

    /// Glob patterns (`*` matches any sequence) matched against full canonical URLs
    pub(crate) excluded_patterns: Vec<String>,

    /// Compiled regex patterns from `excluded_patterns`
    /// Pre-compiled at config creation to avoid hot-path regex compilation
    #[serde(skip)]
    pub(crate) excluded_patterns_compiled: Vec<regex::Regex>,

    /// Number of worker tasks
    pub(crate) concurrency: usize,

    /// Maximum concurrent fetches per domain (prevents rate limiting)
    pub(crate) max_concurrent_per_domain: usize,

    /// How long an idle worker waits on the frontier before re-checking termination
    pub(crate) pop_timeout_secs: u64,

    /// Timeout for one page fetch, including rendering
    pub(crate) fetch_timeout_secs: u64,

    /// Timeout for one robots.txt fetch; expiry resolves to an allow-all policy
    pub(crate) robots_timeout_secs: u64,

    /// Pause between a worker's dequeues when robots.txt names no crawl-delay
    pub(crate) default_crawl_delay_ms: u64,

    pub(crate) respect_robots: bool,

    /// Render HTML in a headless browser (requires the `browser` feature)
    pub(crate) render_html: bool,

    pub(crate) user_agent: String,

    /// Directory downloadable files are written to
    pub(crate) download_dir: PathBuf,

    /// Lowercase path extensions routed to the file store
    pub(crate) downloadable_extensions: Vec<String>,

    /// Optional cap on queued frontier entries
    pub(crate) max_queue_size: Option<usize>,

    /// Stop after this many processed HTML pages
    pub(crate) limit: Option<usize>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_urls: Vec::new(),
            allowed_domains: Vec::new(),
            excluded_patterns: Vec::new(),
            excluded_patterns_compiled: Vec::new(),
            concurrency: DEFAULT_CONCURRENCY,
            max_concurrent_per_domain: DEFAULT_MAX_CONCURRENT_PER_DOMAIN,
            pop_timeout_secs: DEFAULT_POP_TIMEOUT_SECS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            robots_timeout_secs: DEFAULT_ROBOTS_TIMEOUT_SECS,
            default_crawl_delay_ms: DEFAULT_CRAWL_DELAY_MS,
            respect_robots: true,
            render_html: false,
            user_agent: FRONTIER_USER_AGENT.to_string(),
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            downloadable_extensions: DEFAULT_DOWNLOADABLE_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            max_queue_size: None,
            limit: None,
        }
    }
}

impl CrawlConfig {
    /// Load a config from a JSON file.
    ///
    /// Missing fields take their defaults; the loaded config goes through the same
    /// validation as [`CrawlConfigBuilder::build`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or fails
    /// validation.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        CrawlConfigBuilder::<WithStartUrls>::from_json_file(path)?.build()
    }

    /// Parse a config from JSON text
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON or a config that fails validation.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        CrawlConfigBuilder::<WithStartUrls>::from_json_str(raw)?.build()
    }
}
