//! Two-attempt page render: network-idle with the stealth profile first,
//! then a plainer DOM-loaded retry with a longer timeout.

use crate::config::FetchConfig;
use crate::renderer::{ContextOptions, Renderer, WaitUntil};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Both render attempts failed for a URL.
#[derive(Debug, Clone, Error)]
#[error("{url} unavailable (primary: {primary}; fallback: {fallback})")]
pub struct FetchError {
    pub url: String,
    pub primary: String,
    pub fallback: String,
}

/// Everything one render attempt needs.
#[derive(Debug, Clone)]
struct AttemptPlan {
    options: ContextOptions,
    wait: WaitUntil,
    timeout: Duration,
    settle: Duration,
    /// Require `body` to exist within this window before reading content.
    body_wait: Option<Duration>,
}

/// Renders pages through a [`Renderer`].
pub struct PageFetcher {
    renderer: Arc<dyn Renderer>,
    primary: AttemptPlan,
    fallback: AttemptPlan,
}

impl PageFetcher {
    pub fn new(renderer: Arc<dyn Renderer>, config: &FetchConfig) -> Self {
        let primary = AttemptPlan {
            options: ContextOptions {
                user_agent: config.user_agent.clone(),
                viewport: Some(config.viewport),
                stealth: true,
            },
            wait: WaitUntil::NetworkIdle,
            timeout: config.primary_timeout,
            settle: config.primary_settle,
            body_wait: Some(config.body_wait),
        };
        let fallback = AttemptPlan {
            options: ContextOptions {
                user_agent: config.fallback_user_agent.clone(),
                viewport: None,
                stealth: false,
            },
            wait: WaitUntil::DomContentLoaded,
            timeout: config.fallback_timeout,
            settle: config.fallback_settle,
            body_wait: None,
        };
        Self {
            renderer,
            primary,
            fallback,
        }
    }

    /// Render `url` and return its HTML, trying the fallback once if the
    /// primary attempt fails.
    pub async fn fetch_html(&self, url: &str) -> std::result::Result<String, FetchError> {
        let primary = match self.attempt(url, &self.primary).await {
            Ok(html) => return Ok(html),
            Err(e) => e,
        };
        debug!("primary render of {url} failed, retrying: {primary:#}");

        self.attempt(url, &self.fallback)
            .await
            .map_err(|fallback| FetchError {
                url: url.to_string(),
                primary: format!("{primary:#}"),
                fallback: format!("{fallback:#}"),
            })
    }

    async fn attempt(&self, url: &str, plan: &AttemptPlan) -> Result<String> {
        let mut context = self.renderer.new_context(&plan.options).await?;

        let result = async {
            context.navigate(url, plan.wait, plan.timeout).await?;
            tokio::time::sleep(plan.settle).await;
            if let Some(body_wait) = plan.body_wait {
                context.wait_for_selector("body", body_wait).await?;
            }
            context.content().await
        }
        .await;

        if let Err(e) = context.close().await {
            debug!("closing context for {url} failed: {e}");
        }
        result
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted renderer shared by acquisition and pipeline tests.

    use crate::renderer::{
        ContextOptions, NavigationResult, RenderContext, Renderer, WaitUntil,
    };
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// What a scripted URL does.
    #[derive(Debug, Clone)]
    pub enum Script {
        /// Every attempt succeeds with this HTML.
        Page(String),
        /// The network-idle attempt fails; the DOM-loaded retry succeeds.
        FallbackOnly(String),
        /// Every attempt fails.
        Down,
    }

    /// Renderer that serves canned HTML and counts navigations per URL.
    #[derive(Default)]
    pub struct ScriptedRenderer {
        scripts: HashMap<String, Script>,
        pub navigations: Arc<Mutex<HashMap<String, usize>>>,
        pub contexts: Arc<AtomicUsize>,
        pub profiles: Arc<Mutex<Vec<ContextOptions>>>,
        /// Wait condition and timeout of every navigation, in order.
        pub attempts: Arc<Mutex<Vec<(WaitUntil, Duration)>>>,
    }

    impl ScriptedRenderer {
        pub fn with(mut self, url: &str, script: Script) -> Self {
            self.scripts.insert(url.to_string(), script);
            self
        }

        pub fn page(self, url: &str, html: &str) -> Self {
            self.with(url, Script::Page(html.to_string()))
        }

        pub fn navigations_for(&self, url: &str) -> usize {
            self.navigations
                .lock()
                .unwrap()
                .get(url)
                .copied()
                .unwrap_or(0)
        }
    }

    #[async_trait]
    impl Renderer for ScriptedRenderer {
        async fn new_context(&self, options: &ContextOptions) -> Result<Box<dyn RenderContext>> {
            self.contexts.fetch_add(1, Ordering::SeqCst);
            self.profiles.lock().unwrap().push(options.clone());
            Ok(Box::new(ScriptedContext {
                scripts: self.scripts.clone(),
                navigations: Arc::clone(&self.navigations),
                attempts: Arc::clone(&self.attempts),
                loaded: None,
            }))
        }

        async fn shutdown(&self) -> Result<()> {
            Ok(())
        }
    }

    struct ScriptedContext {
        scripts: HashMap<String, Script>,
        navigations: Arc<Mutex<HashMap<String, usize>>>,
        attempts: Arc<Mutex<Vec<(WaitUntil, Duration)>>>,
        loaded: Option<String>,
    }

    #[async_trait]
    impl RenderContext for ScriptedContext {
        async fn navigate(
            &mut self,
            url: &str,
            wait: WaitUntil,
            timeout: Duration,
        ) -> Result<NavigationResult> {
            self.attempts.lock().unwrap().push((wait, timeout));
            *self
                .navigations
                .lock()
                .unwrap()
                .entry(url.to_string())
                .or_default() += 1;

            match (self.scripts.get(url), wait) {
                (Some(Script::Page(html)), _) => self.loaded = Some(html.clone()),
                (Some(Script::FallbackOnly(html)), WaitUntil::DomContentLoaded) => {
                    self.loaded = Some(html.clone())
                }
                (Some(Script::FallbackOnly(_)), WaitUntil::NetworkIdle) => {
                    bail!("network never went idle")
                }
                (Some(Script::Down), _) | (None, _) => bail!("net::ERR_NAME_NOT_RESOLVED"),
            }
            Ok(NavigationResult {
                final_url: url.to_string(),
                load_time_ms: 0,
            })
        }

        async fn wait_for_selector(&self, _selector: &str, _timeout: Duration) -> Result<()> {
            Ok(())
        }

        async fn content(&self) -> Result<String> {
            match &self.loaded {
                Some(html) => Ok(html.clone()),
                None => bail!("no document loaded"),
            }
        }

        async fn close(self: Box<Self>) -> Result<()> {
            Ok(())
        }
    }
}
