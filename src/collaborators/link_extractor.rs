//! HTML link and image extraction with scraper

use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use super::LinkExtractor;
use crate::utils::url_utils::is_crawlable_href;

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href]").expect("BUG: hardcoded CSS selector 'a[href]' is invalid")
});

static IMAGE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("img[src]").expect("BUG: hardcoded CSS selector 'img[src]' is invalid")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl HtmlLinkExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, body: &str) -> Vec<String> {
        let document = Html::parse_document(body);
        document
            .select(&ANCHOR_SELECTOR)
            .filter_map(|element| element.value().attr("href"))
            .map(str::trim)
            .filter(|href| is_crawlable_href(href))
            .map(str::to_string)
            .collect()
    }

    fn extract_image_sources(&self, body: &str, base: &Url) -> Vec<String> {
        let document = Html::parse_document(body);
        document
            .select(&IMAGE_SELECTOR)
            .filter_map(|element| element.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty() && !src.starts_with("data:"))
            .filter_map(|src| match base.join(src) {
                Ok(resolved) => Some(resolved.to_string()),
                Err(e) => {
                    log::debug!(target: "frontier::links", "Could not parse image link {src}: {e}");
                    None
                }
            })
            .collect()
    }
}
