//! Headless Chromium backend built on `chromiumoxide`.

use super::{ContextOptions, NavigationResult, RenderContext, Renderer, WaitUntil};
use crate::stealth::fingerprint;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, NavigateParams,
};
use chromiumoxide::Page;
use futures::StreamExt;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Poll interval for readiness checks.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Quiet window after which a page counts as network-idle.
const NETWORK_QUIET: Duration = Duration::from_millis(500);

/// Raise the resource timing buffer above its default of 250 entries so the
/// idle check keeps seeing new requests on heavy pages.
const RESOURCE_BUFFER_SCRIPT: &str = "performance.setResourceTimingBufferSize(100000);";

/// Tracks the resource count between polls and reports when the page has
/// been complete and quiet for [`NETWORK_QUIET`].
#[derive(Debug)]
struct IdleTracker {
    last_count: Option<u64>,
    quiet_since: Instant,
}

impl IdleTracker {
    fn new(now: Instant) -> Self {
        Self {
            last_count: None,
            quiet_since: now,
        }
    }

    /// Feed one poll. `None` means the page could not be read this time.
    fn observe(&mut self, sample: Option<(&str, u64)>, now: Instant) -> bool {
        let Some((state, count)) = sample else {
            self.last_count = None;
            self.quiet_since = now;
            return false;
        };
        if self.last_count != Some(count) {
            self.last_count = Some(count);
            self.quiet_since = now;
            return false;
        }
        state == "complete" && now.duration_since(self.quiet_since) >= NETWORK_QUIET
    }
}

/// Run `check` every [`POLL_INTERVAL`] until it reports ready.
///
/// Errors count as "not ready": evaluation fails while a navigation commits
/// or redirects. The caller's timeout is the only exit.
async fn poll_until<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    loop {
        match check().await {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => debug!("page not readable yet: {e:#}"),
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// A single headless Chromium process shared by every context in a run.
pub struct ChromiumRenderer {
    browser: Mutex<Browser>,
    handler: Mutex<Option<JoinHandle<()>>>,
}

impl ChromiumRenderer {
    /// Launch Chromium with automation signals disabled.
    pub async fn launch(window: (u32, u32)) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(window.0, window.1);
        for arg in fingerprint::LAUNCH_ARGS {
            builder = builder.arg(*arg);
        }
        let config = builder
            .build()
            .map_err(|e| anyhow!("invalid browser config: {e}"))?;

        let (browser, mut events) = Browser::launch(config)
            .await
            .context("launching headless chromium")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    warn!("browser handler stopped: {e}");
                    break;
                }
            }
        });

        debug!("chromium launched");
        Ok(Self {
            browser: Mutex::new(browser),
            handler: Mutex::new(Some(handler)),
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self, options: &ContextOptions) -> Result<Box<dyn RenderContext>> {
        let page = {
            let browser = self.browser.lock().await;
            browser
                .new_page("about:blank")
                .await
                .context("opening browser page")?
        };

        page.set_user_agent(options.user_agent.clone())
            .await
            .context("setting user agent")?;

        page.evaluate_on_new_document(AddScriptToEvaluateOnNewDocumentParams::new(
            RESOURCE_BUFFER_SCRIPT,
        ))
        .await
        .context("raising resource timing buffer")?;

        if let Some((w, h)) = options.viewport {
            page.execute(SetDeviceMetricsOverrideParams::new(
                i64::from(w),
                i64::from(h),
                1.0,
                false,
            ))
            .await
            .context("setting viewport")?;
        }

        if options.stealth {
            page.evaluate_on_new_document(AddScriptToEvaluateOnNewDocumentParams::new(
                fingerprint::stealth_script(),
            ))
            .await
            .context("injecting fingerprint patch")?;
        }

        Ok(Box::new(ChromiumContext { page }))
    }

    async fn shutdown(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        browser.close().await.context("closing browser")?;
        browser.wait().await.context("waiting for browser exit")?;
        if let Some(handler) = self.handler.lock().await.take() {
            handler.abort();
        }
        Ok(())
    }
}

/// One Chromium tab.
pub struct ChromiumContext {
    page: Page,
}

impl ChromiumContext {
    async fn eval<T: serde::de::DeserializeOwned>(&self, js: &str) -> Result<T> {
        let value = self.page.evaluate(js).await?.into_value::<T>()?;
        Ok(value)
    }

    /// Wait for the load event, then until the resource count stops growing
    /// for [`NETWORK_QUIET`].
    async fn wait_network_idle(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("navigating to {url}"))?;

        let mut idle = IdleTracker::new(Instant::now());
        loop {
            let sample = match self.resource_sample().await {
                Ok(sample) => Some(sample),
                Err(e) => {
                    debug!("page not readable yet: {e:#}");
                    None
                }
            };
            let sample = sample.as_ref().map(|(state, count)| (state.as_str(), *count));
            if idle.observe(sample, Instant::now()) {
                return Ok(());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn resource_sample(&self) -> Result<(String, u64)> {
        let state: String = self.eval("document.readyState").await?;
        let count: u64 = self
            .eval("performance.getEntriesByType('resource').length")
            .await?;
        Ok((state, count))
    }

    /// Issue the navigation without waiting for load, then poll until the
    /// new document has parsed.
    async fn wait_dom_loaded(&self, url: &str) -> Result<()> {
        self.page
            .execute(NavigateParams::new(url))
            .await
            .with_context(|| format!("navigating to {url}"))?;

        poll_until(move || {
            self.eval::<bool>("document.readyState !== 'loading' && location.href !== 'about:blank'")
        })
        .await;
        Ok(())
    }
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(
        &mut self,
        url: &str,
        wait: WaitUntil,
        timeout: Duration,
    ) -> Result<NavigationResult> {
        let start = Instant::now();
        let navigation = async {
            match wait {
                WaitUntil::NetworkIdle => self.wait_network_idle(url).await,
                WaitUntil::DomContentLoaded => self.wait_dom_loaded(url).await,
            }
        };

        tokio::time::timeout(timeout, navigation)
            .await
            .map_err(|_| anyhow!("navigation to {url} timed out after {}ms", timeout.as_millis()))??;

        let final_url = self
            .page
            .url()
            .await?
            .unwrap_or_else(|| url.to_string());

        Ok(NavigationResult {
            final_url,
            load_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let poll = async {
            loop {
                if self.page.find_element(selector).await.is_ok() {
                    return;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };
        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| anyhow!("'{selector}' did not appear within {}ms", timeout.as_millis()))
    }

    async fn content(&self) -> Result<String> {
        self.page.content().await.context("reading page content")
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.page.close().await.context("closing page")
    }
}
