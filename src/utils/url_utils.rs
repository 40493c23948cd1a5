//! URL and path helpers shared by the collaborators.

use std::path::{Path, PathBuf};

use super::constants::NON_CRAWLABLE_SCHEMES;

/// Whether an href can name a crawlable resource at all
///
/// Rejects empty values, fragment-only anchors and non-navigational schemes.
#[must_use]
pub fn is_crawlable_href(href: &str) -> bool {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return false;
    }
    let lowered = href.to_ascii_lowercase();
    !NON_CRAWLABLE_SCHEMES
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
}

/// Whether `host` equals `domain` or is one of its subdomains.
///
/// A leading `*.` on `domain` is accepted and means the same thing.
#[must_use]
pub fn host_matches_domain(host: &str, domain: &str) -> bool {
    let domain = domain.trim().trim_start_matches("*.").trim_end_matches('.');
    if domain.is_empty() {
        return false;
    }
    let host = host.trim_end_matches('.').as_bytes();
    let domain = domain.as_bytes();
    if host.eq_ignore_ascii_case(domain) {
        return true;
    }
    host.len() > domain.len()
        && host[host.len() - domain.len()..].eq_ignore_ascii_case(domain)
        && host[host.len() - domain.len() - 1] == b'.'
}

/// Lower-cased extension of the last path segment, if any
#[must_use]
pub fn path_extension(path: &str) -> Option<String> {
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Destination of a downloaded file: the sanitized last path segment under `dir`
#[must_use]
pub fn download_path(dir: &Path, url_path: &str, fallback: &str) -> PathBuf {
    let segment = url_path.rsplit('/').next().unwrap_or_default();
    let name = sanitize_filename::sanitize(segment);
    if name.is_empty() {
        dir.join(sanitize_filename::sanitize(fallback))
    } else {
        dir.join(name)
    }
}
