//! XML sitemap parsing with the `sitemap` crate
//!
//! Stream-parses both `<urlset>` sitemaps and `<sitemapindex>` documents; entries
//! of an index are returned like page URLs so the crawl fetches them as XML later.

use sitemap::reader::{SiteMapEntity, SiteMapReader};
use std::io::Cursor;

use super::SitemapParser;

#[derive(Debug, Clone, Copy, Default)]
pub struct XmlSitemapParser;

impl SitemapParser for XmlSitemapParser {
    fn parse_sitemap(&self, xml: &[u8]) -> Vec<String> {
        let mut urls = Vec::new();
        for entity in SiteMapReader::new(Cursor::new(xml)) {
            match entity {
                SiteMapEntity::Url(entry) => {
                    if let Some(url) = entry.loc.get_url() {
                        urls.push(url.to_string());
                    }
                }
                SiteMapEntity::SiteMap(entry) => {
                    if let Some(url) = entry.loc.get_url() {
                        urls.push(url.to_string());
                    }
                }
                SiteMapEntity::Err(e) => {
                    // XML reader errors are sticky, nothing after this point is readable
                    log::debug!(target: "frontier::sitemap", "Stopping at malformed sitemap: {e:?}");
                    break;
                }
            }
        }
        urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_urlset() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>http://example.test/a</loc></url>
  <url><loc>http://example.test/b</loc><lastmod>2024-01-01</lastmod></url>
</urlset>"#;
        let urls = XmlSitemapParser.parse_sitemap(xml);
        assert_eq!(
            urls,
            vec!["http://example.test/a".to_string(), "http://example.test/b".to_string()]
        );
    }

    #[test]
    fn test_parse_sitemap_index() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>http://example.test/sitemap-pages.xml</loc></sitemap>
</sitemapindex>"#;
        let urls = XmlSitemapParser.parse_sitemap(xml);
        assert_eq!(urls, vec!["http://example.test/sitemap-pages.xml".to_string()]);
    }

    #[test]
    fn test_non_sitemap_xml_yields_nothing() {
        let xml = br#"<?xml version="1.0"?><rss><channel><title>t</title></channel></rss>"#;
        assert!(XmlSitemapParser.parse_sitemap(xml).is_empty());
    }
}
