//! Getter methods for `CrawlConfig`
//!
//! This module provides all the accessor methods for retrieving configuration
//! values from a `CrawlConfig` instance.

use std::path::Path;
use std::time::Duration;

use super::types::CrawlConfig;

impl CrawlConfig {
    #[must_use]
    pub fn start_urls(&self) -> &[String] {
        &self.start_urls
    }

    #[must_use]
    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }

    #[must_use]
    pub fn excluded_patterns(&self) -> &[String] {
        &self.excluded_patterns
    }

    /// Get the pre-compiled excluded patterns
    ///
    /// These patterns are compiled once at config creation time
    /// to avoid repeated regex compilation in the hot path.
    #[must_use]
    pub fn excluded_patterns_compiled(&self) -> &[regex::Regex] {
        &self.excluded_patterns_compiled
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    #[must_use]
    pub fn max_concurrent_per_domain(&self) -> usize {
        self.max_concurrent_per_domain
    }

    #[must_use]
    pub fn pop_timeout(&self) -> Duration {
        Duration::from_secs(self.pop_timeout_secs)
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    #[must_use]
    pub fn robots_timeout(&self) -> Duration {
        Duration::from_secs(self.robots_timeout_secs)
    }

    #[must_use]
    pub fn default_crawl_delay(&self) -> Duration {
        Duration::from_millis(self.default_crawl_delay_ms)
    }

    #[must_use]
    pub fn respect_robots(&self) -> bool {
        self.respect_robots
    }

    #[must_use]
    pub fn render_html(&self) -> bool {
        self.render_html
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    #[must_use]
    pub fn downloadable_extensions(&self) -> &[String] {
        &self.downloadable_extensions
    }

    /// Whether a lowercase path extension routes to the file store
    #[must_use]
    pub fn is_downloadable_extension(&self, extension: &str) -> bool {
        self.downloadable_extensions.iter().any(|ext| ext == extension)
    }

    #[must_use]
    pub fn max_queue_size(&self) -> Option<usize> {
        self.max_queue_size
    }

    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}
