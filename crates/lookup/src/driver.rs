//! Browser control seam.
//!
//! [`PageDriver`] narrows the automation surface to the handful of page
//! operations the search script needs, so the script engine can be tested
//! against a mock without a browser. [`ChromiumDriver`] is the real
//! implementation on top of a Chrome DevTools Protocol session.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventResponseReceived, GetResponseBodyParams,
};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::debug;

use rekkari_core::error::LookupError;
use rekkari_config::LookupConfig;

use crate::interceptor::ResponseInterceptor;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// The page operations the search script is written against.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn goto(&self, url: &str) -> Result<(), LookupError>;

    /// Focus the control matched by `selector` and type `text` into it.
    async fn fill(&self, selector: &str, text: &str) -> Result<(), LookupError>;

    async fn click(&self, selector: &str) -> Result<(), LookupError>;

    /// Press Enter with the control matched by `selector` focused.
    async fn press_enter(&self, selector: &str) -> Result<(), LookupError>;

    /// Do nothing for `duration` while the page works.
    async fn wait(&self, duration: Duration);
}

/// A launched headless browser and its CDP event loop.
///
/// The event handler must be polled for the session to make progress, so
/// launch spawns it onto the runtime. `close` releases the browser process
/// and the handler task; it consumes the handle so release happens exactly
/// once.
pub struct BrowserHandle {
    browser: Browser,
    event_loop: JoinHandle<()>,
}

impl BrowserHandle {
    pub async fn launch(config: &LookupConfig) -> Result<Self, LookupError> {
        let mut builder = BrowserConfig::builder().args(vec![
            "--no-sandbox",
            "--disable-setuid-sandbox",
            "--disable-dev-shm-usage",
            "--disable-gpu",
        ]);
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder
            .build()
            .map_err(LookupError::LaunchFailed)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| LookupError::LaunchFailed(e.to_string()))?;

        let event_loop = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "Browser event loop error");
                }
            }
        });

        Ok(Self {
            browser,
            event_loop,
        })
    }

    /// Open a blank page with network events enabled and a desktop user
    /// agent set.
    pub async fn new_page(&self) -> Result<Page, LookupError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| LookupError::InteractionFailed(e.to_string()))?;
        page.set_user_agent(USER_AGENT)
            .await
            .map_err(|e| LookupError::InteractionFailed(e.to_string()))?;
        page.execute(EnableParams::default())
            .await
            .map_err(|e| LookupError::InteractionFailed(e.to_string()))?;
        Ok(page)
    }

    pub async fn close(mut self) -> Result<(), LookupError> {
        let result = self
            .browser
            .close()
            .await
            .map_err(|e| LookupError::CloseFailed(e.to_string()));
        if let Err(e) = self.browser.wait().await {
            debug!(error = %e, "Browser process wait failed");
        }
        self.event_loop.abort();
        result.map(|_| ())
    }
}

/// Subscribe the interceptor to the page's network responses.
///
/// Must run before navigation so early responses are not missed. The task
/// fetches bodies only for responses the interceptor considers targets and
/// offers them for selection; body fetch failures are logged and skipped.
pub async fn spawn_capture(
    page: Page,
    interceptor: Arc<ResponseInterceptor>,
) -> Result<JoinHandle<()>, LookupError> {
    let mut responses = page
        .event_listener::<EventResponseReceived>()
        .await
        .map_err(|e| LookupError::InteractionFailed(e.to_string()))?;

    Ok(tokio::spawn(async move {
        while let Some(event) = responses.next().await {
            let url = event.response.url.clone();
            if !interceptor.matches_target(&url, &event.response.mime_type) {
                continue;
            }
            let params = GetResponseBodyParams::new(event.request_id.clone());
            match page.execute(params).await {
                Ok(body) => {
                    let raw = if body.base64_encoded {
                        match base64::engine::general_purpose::STANDARD.decode(&body.body) {
                            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                            Err(e) => {
                                debug!(%url, error = %e, "Response body is not valid base64");
                                continue;
                            }
                        }
                    } else {
                        body.body.clone()
                    };
                    interceptor.offer(&url, &raw);
                }
                Err(e) => {
                    // Bodies for responses that raced page teardown are
                    // gone; a later candidate may still qualify.
                    debug!(%url, error = %e, "Response body unavailable");
                }
            }
        }
    }))
}

/// [`PageDriver`] backed by a live CDP page.
pub struct ChromiumDriver {
    page: Page,
}

impl ChromiumDriver {
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn goto(&self, url: &str) -> Result<(), LookupError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| LookupError::NavigationFailed {
                url: url.to_string(),
                details: e.to_string(),
            })?;
        Ok(())
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<(), LookupError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| LookupError::ControlNotFound {
                selector: selector.to_string(),
            })?;
        element
            .click()
            .await
            .map_err(|e| LookupError::InteractionFailed(e.to_string()))?;
        element
            .type_str(text)
            .await
            .map_err(|e| LookupError::InteractionFailed(e.to_string()))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), LookupError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| LookupError::ControlNotFound {
                selector: selector.to_string(),
            })?;
        element
            .click()
            .await
            .map_err(|e| LookupError::InteractionFailed(e.to_string()))?;
        Ok(())
    }

    async fn press_enter(&self, selector: &str) -> Result<(), LookupError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| LookupError::ControlNotFound {
                selector: selector.to_string(),
            })?;
        element
            .press_key("Enter")
            .await
            .map_err(|e| LookupError::InteractionFailed(e.to_string()))?;
        Ok(())
    }

    async fn wait(&self, duration: Duration) {
        // A fixed window, not a readiness signal. The interceptor collects
        // whatever the page fetches during it.
        tokio::time::sleep(duration).await;
    }
}
