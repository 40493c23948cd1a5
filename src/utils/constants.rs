//! Shared configuration constants for the frontier engine
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Default number of concurrent crawl workers
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default cap on simultaneous requests to one domain
pub const DEFAULT_MAX_CONCURRENT_PER_DOMAIN: usize = 2;

/// Seconds an idle worker waits on the frontier before re-checking termination
pub const DEFAULT_POP_TIMEOUT_SECS: u64 = 10;

/// Page fetch timeout in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;

/// robots.txt fetch timeout in seconds
pub const DEFAULT_ROBOTS_TIMEOUT_SECS: u64 = 5;

/// Delay between a worker's dequeues when robots.txt names no crawl-delay
///
/// Two seconds per worker keeps the aggregate request rate against a single
/// site in the low single digits per second for the default pool size.
pub const DEFAULT_CRAWL_DELAY_MS: u64 = 2_000;

/// Directory downloadable files are written to
pub const DEFAULT_DOWNLOAD_DIR: &str = "data/";

/// Path extensions routed to the file store instead of the HTML pipeline
pub const DEFAULT_DOWNLOADABLE_EXTENSIONS: [&str; 7] =
    ["pdf", "doc", "docx", "ppt", "pptx", "mp4", "mp3"];

/// Schemes that can appear in an href but never name a crawlable resource
pub const NON_CRAWLABLE_SCHEMES: [&str; 5] =
    ["mailto:", "javascript:", "tel:", "data:", "about:"];

/// User agent sent with every request
pub const FRONTIER_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; kodegen-frontier/",
    env!("CARGO_PKG_VERSION"),
    "; +https://kodegen.ai)"
);

/// Chrome user agent string used when pages are rendered in the browser
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
