//! robots.txt parsing and rule evaluation for the wildcard user agent
//!
//! Supports `User-agent`, `Allow`, `Disallow`, `Crawl-delay` and `Sitemap`
//! directives. Matching follows the longest-match convention: among all rules whose
//! pattern matches the path, the longest pattern wins and `Allow` wins ties.
//! Patterns may contain `*` wildcards and a trailing `$` anchor.

use std::time::Duration;

use crate::canonical::{self, CanonicalUrl};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Allow,
    Disallow,
}

/// One `Allow`/`Disallow` line from the wildcard group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsRule {
    pub kind: RuleKind,
    pub pattern: String,
}

impl RobotsRule {
    fn new(kind: RuleKind, raw_pattern: &str) -> Self {
        Self {
            kind,
            pattern: normalize_pattern(raw_pattern),
        }
    }

    fn matches(&self, path: &str) -> bool {
        pattern_matches(&self.pattern, path)
    }
}

/// Parsed, immutable robots policy for one domain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotsPolicy {
    rules: Vec<RobotsRule>,
    crawl_delay: Option<Duration>,
    sitemaps: Vec<String>,
}

impl RobotsPolicy {
    /// Policy used when robots.txt is missing or unreachable
    #[must_use]
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Parse robots.txt content, keeping the rules of groups that name `*`
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut policy = Self::default();
        let mut in_wildcard_group = false;
        let mut previous_was_agent = false;

        for raw_line in content.lines() {
            let line = raw_line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    // Consecutive User-agent lines share one group
                    if !previous_was_agent {
                        in_wildcard_group = false;
                    }
                    if value == "*" {
                        in_wildcard_group = true;
                    }
                    previous_was_agent = true;
                    continue;
                }
                "sitemap" | "site-map" => {
                    if !value.is_empty() {
                        policy.sitemaps.push(value.to_string());
                    }
                }
                "allow" if in_wildcard_group && !value.is_empty() => {
                    policy.rules.push(RobotsRule::new(RuleKind::Allow, value));
                }
                "disallow" if in_wildcard_group && !value.is_empty() => {
                    policy.rules.push(RobotsRule::new(RuleKind::Disallow, value));
                }
                "crawl-delay" if in_wildcard_group => {
                    if let Ok(secs) = value.parse::<f64>()
                        && secs.is_finite()
                        && secs >= 0.0
                    {
                        policy.crawl_delay = Some(Duration::from_secs_f64(secs));
                    }
                }
                _ => {}
            }
            previous_was_agent = false;
        }

        policy
    }

    /// Evaluate a path (with optional `?query`) against the rule set
    #[must_use]
    pub fn is_path_allowed(&self, path: &str) -> bool {
        let mut best: Option<&RobotsRule> = None;
        for rule in self.rules.iter().filter(|rule| rule.matches(path)) {
            best = match best {
                None => Some(rule),
                Some(current) if rule.pattern.len() > current.pattern.len() => Some(rule),
                Some(current)
                    if rule.pattern.len() == current.pattern.len()
                        && rule.kind == RuleKind::Allow =>
                {
                    Some(rule)
                }
                keep => keep,
            };
        }
        best.is_none_or(|rule| rule.kind == RuleKind::Allow)
    }

    #[must_use]
    pub fn rules(&self) -> &[RobotsRule] {
        &self.rules
    }

    #[must_use]
    pub fn crawl_delay(&self) -> Option<Duration> {
        self.crawl_delay
    }

    #[must_use]
    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }

    /// True when no rule can ever disallow a path
    #[must_use]
    pub fn is_allow_all(&self) -> bool {
        self.rules.iter().all(|rule| rule.kind == RuleKind::Allow)
    }
}

/// Check a canonical URL against a domain policy
#[must_use]
pub fn is_allowed(policy: &RobotsPolicy, url: &CanonicalUrl) -> bool {
    policy.is_path_allowed(&url.path_and_query())
}

/// Bring a rule pattern into the same percent-encoding form as canonical paths
fn normalize_pattern(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii() {
            encoded.push(ch);
        } else {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).bytes() {
                encoded.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    canonical::normalize_percent_encoding(&encoded)
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
    let (pattern, anchored) = match pattern.strip_suffix('$') {
        Some(stripped) => (stripped, true),
        None => (pattern, false),
    };

    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or_default();
    if !path.starts_with(first) {
        return false;
    }
    let mut pos = first.len();

    let rest: Vec<&str> = parts.collect();
    if rest.is_empty() {
        return !anchored || pos == path.len();
    }

    for (i, part) in rest.iter().enumerate() {
        if anchored && i == rest.len() - 1 {
            return path.len() >= pos + part.len() && path[pos..].ends_with(part);
        }
        match path[pos..].find(part) {
            Some(idx) => pos += idx + part.len(),
            None => return false,
        }
    }
    true
}
