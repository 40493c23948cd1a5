//! Type-safe builder for `CrawlConfig` using the typestate pattern
//!
//! This module provides a fluent builder interface with compile-time validation
//! ensuring that the seed URLs are set before building a `CrawlConfig`.

use anyhow::{Context, Result, anyhow, bail};
use regex::Regex;
use std::marker::PhantomData;
use std::path::Path;

use super::types::CrawlConfig;
use crate::canonical::canonicalize;

/// Compile a glob pattern into a regex
///
/// Converts glob patterns (where * matches any sequence) into proper regex patterns.
/// This is done once at config creation time to avoid repeated compilation in hot paths.
///
/// # Errors
///
/// Returns an error if the resulting regex pattern is invalid.
pub(crate) fn compile_glob_pattern(pattern: &str) -> Result<Regex> {
    // Everything except `*` is literal
    let regex_pattern = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    // Anchor pattern to match full string
    let anchored = format!("^{regex_pattern}$");

    Regex::new(&anchored).map_err(|e| anyhow!("Invalid glob pattern '{pattern}': {e}"))
}

/// Add `https://` to a seed that carries no scheme
fn normalize_seed(raw: impl Into<String>) -> String {
    let seed = raw.into().trim().to_string();
    if seed.contains("://") {
        seed
    } else {
        format!("https://{seed}")
    }
}

// Type states for the builder
pub struct WithStartUrls;

pub struct CrawlConfigBuilder<State = ()> {
    pub(crate) config: CrawlConfig,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for CrawlConfigBuilder<()> {
    fn default() -> Self {
        Self {
            config: CrawlConfig::default(),
            _phantom: PhantomData,
        }
    }
}

impl CrawlConfig {
    /// Create a builder for configuring a `CrawlConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> CrawlConfigBuilder<()> {
        CrawlConfigBuilder::default()
    }

    /// Compile patterns, derive the allow-list and validate limits
    pub(crate) fn normalized(mut self) -> Result<Self> {
        self.start_urls = self.start_urls.into_iter().map(normalize_seed).collect();

        self.excluded_patterns_compiled = self
            .excluded_patterns
            .iter()
            .map(|p| compile_glob_pattern(p))
            .collect::<Result<Vec<_>>>()?;

        if self.allowed_domains.is_empty() {
            let mut hosts: Vec<String> = self
                .start_urls
                .iter()
                .filter_map(|seed| canonicalize(seed).ok())
                .map(|url| url.host().to_string())
                .collect();
            hosts.sort();
            hosts.dedup();
            self.allowed_domains = hosts;
        } else {
            self.allowed_domains = self
                .allowed_domains
                .iter()
                .map(|domain| domain.trim().to_ascii_lowercase())
                .filter(|domain| !domain.is_empty())
                .collect();
        }

        self.downloadable_extensions = self
            .downloadable_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        if self.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        if self.max_concurrent_per_domain == 0 {
            bail!("max_concurrent_per_domain must be at least 1");
        }
        if self.pop_timeout_secs == 0 {
            bail!("pop_timeout_secs must be greater than zero");
        }
        if self.fetch_timeout_secs == 0 || self.robots_timeout_secs == 0 {
            bail!("fetch and robots timeouts must be greater than zero");
        }
        if self.max_queue_size == Some(0) {
            bail!("max_queue_size must be greater than zero when set");
        }

        Ok(self)
    }
}

impl<State> CrawlConfigBuilder<State> {
    /// Seed URLs; a seed without a scheme is treated as `https://`
    ///
    /// Replaces any seeds set earlier.
    pub fn start_urls<I, S>(self, urls: I) -> CrawlConfigBuilder<WithStartUrls>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = self.config;
        config.start_urls = urls.into_iter().map(Into::into).collect();
        CrawlConfigBuilder {
            config,
            _phantom: PhantomData,
        }
    }

    /// Single seed URL
    pub fn start_url(self, url: impl Into<String>) -> CrawlConfigBuilder<WithStartUrls> {
        self.start_urls([url.into()])
    }
}

impl CrawlConfigBuilder<WithStartUrls> {
    /// Start from a JSON config file; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Start from JSON config text
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: CrawlConfig = serde_json::from_str(raw).context("Failed to parse config JSON")?;
        Ok(Self {
            config,
            _phantom: PhantomData,
        })
    }
}

// Build method only available when all required fields are set
impl CrawlConfigBuilder<WithStartUrls> {
    /// Validate and build the config
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid excluded pattern or a zero concurrency, timeout
    /// or queue cap.
    pub fn build(self) -> Result<CrawlConfig> {
        self.config.normalized()
    }
}
