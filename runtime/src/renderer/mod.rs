//! Browser rendering abstraction.
//!
//! The fetch path only talks to [`Renderer`] and [`RenderContext`], so the
//! headless Chromium backend can be swapped for a scripted fake in tests.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Lifecycle point a navigation waits for before it is considered done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    /// Load finished and no network activity for a short quiet window.
    NetworkIdle,
    /// `DOMContentLoaded` fired.
    DomContentLoaded,
}

/// Per-context browser profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    pub user_agent: String,
    pub viewport: Option<(u32, u32)>,
    /// Inject the fingerprint patch before any page script runs.
    pub stealth: bool,
}

/// Outcome of a navigation.
#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub final_url: String,
    pub load_time_ms: u64,
}

/// A rendering backend able to open isolated page contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Open a fresh context configured with `options`.
    async fn new_context(&self, options: &ContextOptions) -> Result<Box<dyn RenderContext>>;

    /// Tear down the backend. Contexts opened earlier become unusable.
    async fn shutdown(&self) -> Result<()>;
}

/// One open page.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to `url`, waiting for `wait` or failing after `timeout`.
    async fn navigate(
        &mut self,
        url: &str,
        wait: WaitUntil,
        timeout: Duration,
    ) -> Result<NavigationResult>;

    /// Wait until `selector` matches an element, or fail after `timeout`.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Serialized outer HTML of the current document.
    async fn content(&self) -> Result<String>;

    /// Close the context and release its resources.
    async fn close(self: Box<Self>) -> Result<()>;
}
