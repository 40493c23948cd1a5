pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{download_path, host_matches_domain, is_crawlable_href, path_extension};
