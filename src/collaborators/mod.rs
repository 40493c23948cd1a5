//! External collaborators of the frontier engine
//!
//! The crawl core only talks to transport, parsing, storage and scoping through
//! the traits in this module. Each trait is dyn-compatible so a crawl can mix the
//! default implementations with test doubles.

pub mod file_store;
pub mod http_fetcher;
pub mod link_extractor;
pub mod scope;
pub mod sitemap_parser;

#[cfg(feature = "browser")]
pub mod browser;

use bytes::Bytes;
use futures::future::BoxFuture;
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

use crate::canonical::CanonicalUrl;
use crate::config::CrawlConfig;
use crate::crawl_engine::{CrawlResult, TransportError};

pub use file_store::FsFileStore;
pub use http_fetcher::HttpFetcher;
pub use link_extractor::HtmlLinkExtractor;
pub use scope::DomainScope;
pub use sitemap_parser::XmlSitemapParser;

#[cfg(feature = "browser")]
pub use browser::{BrowserRenderer, RenderingFetcher};

/// Response handed back by a [`Fetcher`]
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
    /// Where the document was actually served from after redirects
    pub final_url: Option<Url>,
}

impl FetchResponse {
    #[must_use]
    pub fn new(status: u16, content_type: Option<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
            final_url: None,
        }
    }

    /// Record the post-redirect location
    #[must_use]
    pub fn with_final_url(mut self, url: Url) -> Self {
        self.final_url = Some(url);
        self
    }

    /// Base for resolving relative links: the post-redirect URL when known
    #[must_use]
    pub fn base_url<'a>(&'a self, requested: &'a CanonicalUrl) -> &'a Url {
        self.final_url.as_ref().unwrap_or_else(|| requested.as_url())
    }

    /// 200 response with an HTML content type
    #[must_use]
    pub fn html(body: impl Into<Bytes>) -> Self {
        Self::new(200, Some("text/html; charset=utf-8".to_string()), body)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Content type mentions `xml` (`text/xml`, `application/xml`, `application/rss+xml`, ...)
    #[must_use]
    pub fn is_xml(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("xml"))
    }

    /// Body decoded as UTF-8, invalid sequences replaced
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Retrieves a document; for HTML the body may be the rendered DOM
pub trait Fetcher: Send + Sync {
    fn fetch<'a>(
        &'a self,
        url: &'a CanonicalUrl,
    ) -> BoxFuture<'a, Result<FetchResponse, TransportError>>;
}

/// Pulls raw link and image references out of an HTML document
pub trait LinkExtractor: Send + Sync {
    /// Raw `href` values, unresolved
    fn extract_links(&self, body: &str) -> Vec<String>;

    /// Image sources resolved against `base`, unresolvable ones skipped
    fn extract_image_sources(&self, body: &str, base: &Url) -> Vec<String>;
}

/// Turns a sitemap or sitemap index into the URLs it lists
pub trait SitemapParser: Send + Sync {
    fn parse_sitemap(&self, xml: &[u8]) -> Vec<String>;
}

/// Persists downloadable files
pub trait FileStore: Send + Sync {
    fn save<'a>(
        &'a self,
        url: &'a CanonicalUrl,
        bytes: Bytes,
    ) -> BoxFuture<'a, std::io::Result<PathBuf>>;
}

/// Domain-allow filter
pub trait Scope: Send + Sync {
    fn is_in_scope(&self, url: &CanonicalUrl) -> bool;
}

/// The full set of collaborators a crawl runs against
#[derive(Clone)]
pub struct Collaborators {
    pub fetcher: Arc<dyn Fetcher>,
    pub link_extractor: Arc<dyn LinkExtractor>,
    pub sitemap_parser: Arc<dyn SitemapParser>,
    pub file_store: Arc<dyn FileStore>,
    pub scope: Arc<dyn Scope>,
}

impl Collaborators {
    /// Default collaborators for `config`, with a caller-provided fetcher
    #[must_use]
    pub fn with_fetcher(config: &CrawlConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            link_extractor: Arc::new(HtmlLinkExtractor::new()),
            sitemap_parser: Arc::new(XmlSitemapParser),
            file_store: Arc::new(FsFileStore::new(config.download_dir())),
            scope: Arc::new(DomainScope::from_config(config)),
        }
    }

    /// Build the default collaborators for `config`.
    ///
    /// Launches a headless browser when `render_html` is set and the `browser`
    /// feature is enabled.
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::Bootstrap` when the HTTP client cannot be built or the
    /// browser cannot be launched.
    pub async fn from_config(config: &CrawlConfig) -> CrawlResult<Self> {
        let http = Arc::new(HttpFetcher::new(config.user_agent(), config.fetch_timeout())?);

        #[cfg(feature = "browser")]
        let fetcher: Arc<dyn Fetcher> = if config.render_html() {
            let renderer = BrowserRenderer::launch(config.fetch_timeout()).await?;
            Arc::new(RenderingFetcher::new(http, Arc::new(renderer)))
        } else {
            http
        };

        #[cfg(not(feature = "browser"))]
        let fetcher: Arc<dyn Fetcher> = {
            if config.render_html() {
                log::warn!(
                    target: "frontier::coordinator",
                    "render_html requested but the browser feature is disabled, using plain HTTP"
                );
            }
            http
        };

        Ok(Self::with_fetcher(config, fetcher))
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
