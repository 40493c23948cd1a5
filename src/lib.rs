pub mod canonical;
pub mod collaborators;
pub mod config;
pub mod crawl_engine;
pub mod utils;

pub use canonical::{CanonicalUrl, DomainKey, canonicalize, canonicalize_relative};
pub use collaborators::{
    Collaborators, DomainScope, FetchResponse, Fetcher, FileStore, FsFileStore, HtmlLinkExtractor,
    HttpFetcher, LinkExtractor, Scope, SitemapParser, XmlSitemapParser,
};
#[cfg(feature = "browser")]
pub use collaborators::{BrowserRenderer, RenderingFetcher};
pub use config::CrawlConfig;
pub use crawl_engine::{
    CrawlError, CrawlObserver, CrawlReport, CrawlResult, Crawler, DropReason, NoOpObserver,
    PageOutcome, TransportError, run,
};

pub use tokio_util::sync::CancellationToken;
