//! Domain-allow filter

use regex::Regex;

use super::Scope;
use crate::canonical::CanonicalUrl;
use crate::config::CrawlConfig;
use crate::utils::host_matches_domain;

/// Accepts URLs whose host is an allowed domain or one of its subdomains and
/// that match none of the excluded patterns
#[derive(Debug, Clone)]
pub struct DomainScope {
    allowed_domains: Vec<String>,
    excluded: Vec<Regex>,
}

impl DomainScope {
    #[must_use]
    pub fn new(allowed_domains: Vec<String>, excluded: Vec<Regex>) -> Self {
        Self {
            allowed_domains,
            excluded,
        }
    }

    #[must_use]
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(
            config.allowed_domains().to_vec(),
            config.excluded_patterns_compiled().to_vec(),
        )
    }

    #[must_use]
    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }
}

impl Scope for DomainScope {
    fn is_in_scope(&self, url: &CanonicalUrl) -> bool {
        let host = url.host();
        if !self
            .allowed_domains
            .iter()
            .any(|domain| host_matches_domain(host, domain))
        {
            return false;
        }

        // Excluded patterns are compiled once at config creation
        !self.excluded.iter().any(|regex| regex.is_match(url.as_str()))
    }
}
