//! Headless Chromium rendering for pages whose content is built client side.
//!
//! A [`BrowserSession`] is launched per extraction and closed before the
//! result is returned, whatever the outcome. Dropping a session without
//! closing it (for example when the caller's timeout cancels the future)
//! still stops the CDP handler task, and chromiumoxide kills the child process.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::config::Timeouts;
use crate::error::FetchError;

const SELECTOR_POLL: Duration = Duration::from_millis(500);

/// What a rendered listing page yielded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedRow {
    pub title: Option<String>,
    pub text: String,
}

#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Renders `url` and returns the text of the first element matching `selector`.
    async fn first_match(&self, url: &str, selector: &str) -> Result<RenderedRow, FetchError>;
}

pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    pub async fn launch(url: &str) -> Result<Self, FetchError> {
        let browser_error = |message: String| FetchError::Browser {
            url: url.to_string(),
            message,
        };
        let config = BrowserConfig::builder().build().map_err(browser_error)?;
        let (browser, mut events) = Browser::launch(config)
            .await
            .map_err(|e| browser_error(e.to_string()))?;
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        debug!("Launched headless browser for {}", url);
        Ok(Self { browser, handler })
    }

    async fn open(&self, url: &str, load_timeout: Duration) -> Result<Page, FetchError> {
        let load = async {
            let page = self.browser.new_page(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(page)
        };
        match timeout(load_timeout, load).await {
            Ok(Ok(page)) => Ok(page),
            Ok(Err(e)) => Err(FetchError::Browser {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(FetchError::Timeout {
                what: format!("page load of {}", url),
                secs: load_timeout.as_secs(),
            }),
        }
    }

    pub async fn read_first(
        &self,
        url: &str,
        selector: &str,
        timeouts: &Timeouts,
    ) -> Result<RenderedRow, FetchError> {
        let page = self.open(url, timeouts.page_load()).await?;
        let title = page.get_title().await.ok().flatten();

        let wait = async {
            loop {
                if let Ok(element) = page.find_element(selector).await {
                    return element;
                }
                sleep(SELECTOR_POLL).await;
            }
        };
        let element = timeout(timeouts.selector(), wait)
            .await
            .map_err(|_| FetchError::Timeout {
                what: format!("{} on {}", selector, url),
                secs: timeouts.selector_timeout_secs,
            })?;
        let text = element
            .inner_text()
            .await
            .map_err(|e| FetchError::Browser {
                url: url.to_string(),
                message: e.to_string(),
            })?
            .unwrap_or_default();
        Ok(RenderedRow { title, text })
    }

    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Browser process did not exit cleanly: {}", e);
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

pub struct ChromiumRenderer {
    timeouts: Timeouts,
}

impl ChromiumRenderer {
    pub fn new(timeouts: Timeouts) -> Self {
        Self { timeouts }
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn first_match(&self, url: &str, selector: &str) -> Result<RenderedRow, FetchError> {
        let session = BrowserSession::launch(url).await?;
        let result = session.read_first(url, selector, &self.timeouts).await;
        session.close().await;
        result
    }
}
