//! Builder methods available for all states
//!
//! This module contains methods that can be called on the builder
//! regardless of its current type state.

use std::path::PathBuf;
use std::time::Duration;

use super::builder::CrawlConfigBuilder;

impl<State> CrawlConfigBuilder<State> {
    /// Restrict the crawl to these hosts and their subdomains
    ///
    /// A leading `*.` is accepted and means the same as the bare domain. When never
    /// set, the allow-list is derived from the seed hosts.
    #[must_use]
    pub fn allowed_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.allowed_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Skip URLs matching any of these globs (`*` matches any sequence)
    ///
    /// # Example
    /// ```rust
    /// # use kodegen_tools_frontier::config::CrawlConfig;
    /// # fn main() -> anyhow::Result<()> {
    /// let config = CrawlConfig::builder()
    ///     .start_url("https://example.com")
    ///     .excluded_patterns(["*/login*", "*.zip"])
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn excluded_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.excluded_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Number of worker tasks (must be at least 1)
    #[must_use]
    pub fn concurrency(mut self, workers: usize) -> Self {
        self.config.concurrency = workers;
        self
    }

    #[must_use]
    pub fn max_concurrent_per_domain(mut self, max: usize) -> Self {
        self.config.max_concurrent_per_domain = max;
        self
    }

    /// How long an idle worker waits for new work before re-checking termination
    ///
    /// Idle workers are also woken as soon as the crawl drains, so this only bounds
    /// how long a worker sleeps between checks.
    #[must_use]
    pub fn pop_timeout(mut self, timeout: Duration) -> Self {
        self.config.pop_timeout_secs = timeout.as_secs();
        self
    }

    #[must_use]
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch_timeout_secs = timeout.as_secs();
        self
    }

    #[must_use]
    pub fn robots_timeout(mut self, timeout: Duration) -> Self {
        self.config.robots_timeout_secs = timeout.as_secs();
        self
    }

    /// Pause between a worker's dequeues when robots.txt gives no crawl-delay
    #[must_use]
    pub fn default_crawl_delay(mut self, delay: Duration) -> Self {
        self.config.default_crawl_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Fetch and obey robots.txt (default: true)
    #[must_use]
    pub fn respect_robots(mut self, respect: bool) -> Self {
        self.config.respect_robots = respect;
        self
    }

    /// Render HTML documents in a headless browser before link extraction
    ///
    /// Only takes effect when the crate is built with the `browser` feature.
    #[must_use]
    pub fn render_html(mut self, render: bool) -> Self {
        self.config.render_html = render;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.download_dir = dir.into();
        self
    }

    /// Path extensions routed to the file store (a leading `.` is ignored)
    #[must_use]
    pub fn downloadable_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.downloadable_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Cap the number of queued frontier entries; pushes beyond it are dropped
    #[must_use]
    pub fn max_queue_size(mut self, max: usize) -> Self {
        self.config.max_queue_size = Some(max);
        self
    }

    /// Stop the crawl after this many processed HTML pages
    #[must_use]
    pub fn limit(mut self, pages: usize) -> Self {
        self.config.limit = Some(pages);
        self
    }
}
