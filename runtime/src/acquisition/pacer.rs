//! Politeness delay between distinct page renders.

use std::time::Duration;
use tracing::debug;

/// Outcome of a distinct fetch, which decides how long to back off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Content,
    Unavailable,
}

/// Sleeps after each distinct fetch. Failures back off longer than
/// successes. Cache hits never reach the pacer.
#[derive(Debug, Clone)]
pub struct Pacer {
    success_delay: Duration,
    failure_delay: Duration,
}

impl Pacer {
    /// Create a new pacer.
    ///
    /// - `success_delay`: pause after a render that produced content
    /// - `failure_delay`: pause after a URL ended up unavailable
    pub fn new(success_delay: Duration, failure_delay: Duration) -> Self {
        Self {
            success_delay,
            failure_delay,
        }
    }

    /// Delay that applies to `outcome`.
    pub fn delay_for(&self, outcome: FetchOutcome) -> Duration {
        match outcome {
            FetchOutcome::Content => self.success_delay,
            FetchOutcome::Unavailable => self.failure_delay,
        }
    }

    /// Sleep for the delay that applies to `outcome` and return it.
    pub async fn pause(&self, outcome: FetchOutcome) -> Duration {
        let delay = self.delay_for(outcome);
        if !delay.is_zero() {
            debug!("pacing {}ms after {:?} fetch", delay.as_millis(), outcome);
            tokio::time::sleep(delay).await;
        }
        delay
    }
}
