//! Canonical URL representation for crawl deduplication.
//!
//! Every URL that enters the frontier is first reduced to a `CanonicalUrl` so that
//! equivalent spellings of the same resource compare equal in the visited registry.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;
use url::Url;

use crate::crawl_engine::CrawlError;
use crate::utils::is_crawlable_href;

/// An immutable, cheaply-cloneable canonical URL.
///
/// Only constructible through [`canonicalize`] / [`canonicalize_relative`], so holding
/// one proves the normalization rules have been applied.
#[derive(Clone, Debug)]
pub struct CanonicalUrl {
    url_str: Arc<str>,
    url: Arc<Url>,
}

impl CanonicalUrl {
    fn from_normalized(url: Url) -> Self {
        Self {
            url_str: Arc::from(url.as_str()),
            url: Arc::new(url),
        }
    }

    pub fn parse(input: &str) -> Result<Self, CrawlError> {
        canonicalize(input)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url_str
    }

    #[must_use]
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// Host is guaranteed present for canonical URLs
    #[must_use]
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    #[must_use]
    pub fn domain_key(&self) -> DomainKey {
        DomainKey::of(self)
    }

    /// Path plus `?query`, the part robots rules are matched against
    #[must_use]
    pub fn path_and_query(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        }
    }

    /// Resolve an href found on this page into a canonical URL
    pub fn join(&self, href: &str) -> Result<Self, CrawlError> {
        canonicalize_relative(&self.url, href)
    }
}

impl PartialEq for CanonicalUrl {
    fn eq(&self, other: &Self) -> bool {
        self.url_str == other.url_str
    }
}

impl Eq for CanonicalUrl {}

impl Hash for CanonicalUrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url_str.hash(state);
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url_str)
    }
}

impl FromStr for CanonicalUrl {
    type Err = CrawlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        canonicalize(s)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.url_str
    }
}

impl Serialize for CanonicalUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.url_str)
    }
}

impl<'de> Deserialize<'de> for CanonicalUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        canonicalize(&raw).map_err(serde::de::Error::custom)
    }
}

/// Scheme + host (+ non-default port) of a URL, the key for per-site state
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DomainKey(String);

impl DomainKey {
    #[must_use]
    pub fn of(url: &CanonicalUrl) -> Self {
        Self(url.url.origin().ascii_serialization())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn robots_url(&self) -> String {
        format!("{}/robots.txt", self.0)
    }
}

impl fmt::Display for DomainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a raw absolute URL into its canonical form.
///
/// # Errors
///
/// Returns `CrawlError::InvalidUrl` when the input does not parse, has no host,
/// or uses a scheme other than http/https.
pub fn canonicalize(raw: &str) -> Result<CanonicalUrl, CrawlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CrawlError::invalid_url(raw, "empty URL"));
    }
    let parsed = Url::parse(trimmed).map_err(|e| CrawlError::invalid_url(raw, e))?;
    normalize(parsed).map_err(|reason| CrawlError::invalid_url(raw, reason))
}

/// Resolve `href` against `base` and canonicalize the result.
///
/// Fragment-only hrefs and non-navigational schemes (`mailto:`, `javascript:`, ...)
/// are rejected.
pub fn canonicalize_relative(base: &Url, href: &str) -> Result<CanonicalUrl, CrawlError> {
    let href = href.trim();
    if !is_crawlable_href(href) {
        return Err(CrawlError::invalid_url(href, "no navigable target"));
    }
    let joined = base
        .join(href)
        .map_err(|e| CrawlError::invalid_url(href, e))?;
    normalize(joined).map_err(|reason| CrawlError::invalid_url(href, reason))
}

fn normalize(mut url: Url) -> Result<CanonicalUrl, &'static str> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err("unsupported scheme");
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err("missing host");
    }

    // Host lowercasing and default-port removal are applied by the parser for
    // special schemes; everything else is done here.
    url.set_fragment(None);

    // set_path re-resolves dot segments exposed by decoding
    for _ in 0..4 {
        let path = normalize_path(url.path());
        if path == url.path() {
            break;
        }
        url.set_path(&path);
    }

    let query = url.query().map(normalize_query);
    url.set_query(query.as_deref().filter(|q| !q.is_empty()));

    Ok(CanonicalUrl::from_normalized(url))
}

/// Decode unreserved escapes and collapse repeated slashes; `/dir/` stays distinct from `/dir`
fn normalize_path(path: &str) -> String {
    let decoded = normalize_percent_encoding(path);
    let mut out = String::with_capacity(decoded.len());
    for ch in decoded.chars() {
        if ch == '/' && out.ends_with('/') {
            continue;
        }
        out.push(ch);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

fn normalize_query(query: &str) -> String {
    let mut pairs: Vec<String> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(normalize_percent_encoding)
        .collect();
    pairs.sort();
    pairs.join("&")
}

/// Decode escapes of unreserved characters and upper-case the remaining ones
pub(crate) fn normalize_percent_encoding(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2]))
        {
            let value = hi * 16 + lo;
            if is_unreserved(value) {
                out.push(char::from(value));
            } else {
                out.push('%');
                out.push(char::from(bytes[i + 1].to_ascii_uppercase()));
                out.push(char::from(bytes[i + 2].to_ascii_uppercase()));
            }
            i += 3;
            continue;
        }
        // Url serialization is ASCII, anything else is passed through untouched
        match input[i..].chars().next() {
            Some(ch) => {
                out.push(ch);
                i += ch.len_utf8();
            }
            None => break,
        }
    }
    out
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

const fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}
