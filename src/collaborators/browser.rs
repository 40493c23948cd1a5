//! Headless Chromium rendering for HTML documents
//!
//! `BrowserRenderer` owns a chromiumoxide browser and the task driving its CDP
//! connection. `RenderingFetcher` pairs it with the HTTP fetcher: the HTTP response
//! decides status and content class, and HTML bodies are replaced with the
//! post-script DOM.

use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use futures::future::BoxFuture;
use log::{debug, error, info, trace, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::{FetchResponse, Fetcher, HttpFetcher};
use crate::canonical::CanonicalUrl;
use crate::crawl_engine::page_timeout::with_timeout;
use crate::crawl_engine::{CrawlError, CrawlResult, TransportError};
use crate::utils::constants::CHROME_USER_AGENT;

/// Find a Chrome/Chromium executable, honouring `CHROMIUM_PATH` first.
///
/// Returns `None` to let chromiumoxide fall back to its own detection.
fn find_browser_executable() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Using browser from CHROMIUM_PATH: {}", path.display());
            return Some(path);
        }
        warn!(
            "CHROMIUM_PATH points to non-existent file: {}",
            path.display()
        );
    }

    let candidates: &[&str] = if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ]
    };

    candidates
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

pub struct BrowserRenderer {
    browser: Browser,
    handler_task: JoinHandle<()>,
    user_data_dir: PathBuf,
    timeout: Duration,
}

impl BrowserRenderer {
    /// Launch a headless browser.
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::Bootstrap` when no browser can be started.
    pub async fn launch(timeout: Duration) -> CrawlResult<Self> {
        let user_data_dir =
            std::env::temp_dir().join(format!("kodegen_frontier_chrome_{}", std::process::id()));
        std::fs::create_dir_all(&user_data_dir).map_err(|e| {
            CrawlError::Bootstrap(format!("Failed to create browser data directory: {e}"))
        })?;

        let mut builder = BrowserConfig::builder()
            .request_timeout(timeout)
            .window_size(1920, 1080)
            .user_data_dir(user_data_dir.clone())
            .arg(format!("--user-agent={CHROME_USER_AGENT}"))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-notifications")
            .arg("--disable-extensions")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--mute-audio");
        if let Some(path) = find_browser_executable() {
            builder = builder.chrome_executable(path);
        }

        let config = builder
            .build()
            .map_err(|e| CrawlError::Bootstrap(format!("Failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| CrawlError::Bootstrap(format!("Failed to launch browser: {e}")))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    let message = e.to_string();
                    // chromiumoxide does not know every CDP event Chrome emits
                    if message.contains("data did not match any variant of untagged enum Message")
                        || message.contains("Failed to deserialize WS response")
                    {
                        trace!("Suppressed benign CDP serialization error: {message}");
                    } else {
                        error!("Browser handler error: {e:?}");
                    }
                }
            }
            debug!("Browser handler task completed");
        });

        info!("Browser launched for HTML rendering");
        Ok(Self {
            browser,
            handler_task,
            user_data_dir,
            timeout,
        })
    }

    /// Load `url` in a fresh tab and return the rendered DOM
    pub async fn render(&self, url: &CanonicalUrl) -> Result<String, TransportError> {
        let render = async {
            let page = self
                .browser
                .new_page(url.as_str())
                .await
                .map_err(|e| TransportError::Render(e.to_string()))?;
            let content = match page.wait_for_navigation().await {
                Ok(page) => page.content().await,
                Err(e) => Err(e),
            };
            if let Err(e) = page.close().await {
                debug!("Failed to close tab for {url}: {e}");
            }
            content.map_err(|e| TransportError::Render(e.to_string()))
        };
        with_timeout(render, self.timeout).await
    }
}

impl Drop for BrowserRenderer {
    fn drop(&mut self) {
        self.handler_task.abort();
        if let Err(e) = std::fs::remove_dir_all(&self.user_data_dir) {
            debug!(
                "Failed to remove browser data directory {}: {e}",
                self.user_data_dir.display()
            );
        }
    }
}

/// HTTP fetch first, then browser rendering for HTML responses
pub struct RenderingFetcher {
    http: Arc<HttpFetcher>,
    renderer: Arc<BrowserRenderer>,
}

impl RenderingFetcher {
    #[must_use]
    pub fn new(http: Arc<HttpFetcher>, renderer: Arc<BrowserRenderer>) -> Self {
        Self { http, renderer }
    }

    async fn fetch_rendered(&self, url: &CanonicalUrl) -> Result<FetchResponse, TransportError> {
        let mut response = self.http.fetch(url).await?;
        let is_html = response
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("html"));
        if is_html {
            let dom = self.renderer.render(url).await?;
            response.body = dom.into();
        }
        Ok(response)
    }
}

impl Fetcher for RenderingFetcher {
    fn fetch<'a>(
        &'a self,
        url: &'a CanonicalUrl,
    ) -> BoxFuture<'a, Result<FetchResponse, TransportError>> {
        Box::pin(self.fetch_rendered(url))
    }
}
