//! Plain HTTP fetcher backed by reqwest

use bytes::Bytes;
use futures::future::BoxFuture;
use log::debug;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

use super::{FetchResponse, Fetcher};
use crate::canonical::CanonicalUrl;
use crate::crawl_engine::{CrawlError, CrawlResult, TransportError};

/// Maximum redirects followed per request
const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Build a client with the crawler's user agent and request timeout.
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::Bootstrap` when the TLS backend cannot be initialised.
    pub fn new(user_agent: &str, timeout: Duration) -> CrawlResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()
            .map_err(|e| CrawlError::Bootstrap(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, timeout })
    }

    /// Wrap an existing client
    #[must_use]
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn get(&self, url: &CanonicalUrl) -> Result<FetchResponse, TransportError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let final_url = response.url().clone();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body: Bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        debug!(
            target: "frontier::coordinator",
            "Fetched {url} ({} bytes, {})",
            body.len(),
            content_type.as_deref().unwrap_or("no content type")
        );

        Ok(FetchResponse::new(status.as_u16(), content_type, body).with_final_url(final_url))
    }

    fn classify(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if let Some(status) = error.status() {
            TransportError::Status(status.as_u16())
        } else {
            TransportError::Request(error.to_string())
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(
        &'a self,
        url: &'a CanonicalUrl,
    ) -> BoxFuture<'a, Result<FetchResponse, TransportError>> {
        Box::pin(self.get(url))
    }
}
