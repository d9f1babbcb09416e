//! Pipeline configuration.

use std::time::Duration;

use crate::delivery::DeliveryPolicy;
use crate::domain::DisplayZone;

/// Longest backoff multiplier applied between retries (2^6).
const MAX_BACKOFF_SHIFT: u32 = 6;

/// Default number of upstream requests in flight at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Timeout and retry policy for each upstream query.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Per-attempt timeout (milliseconds).
    pub timeout_ms: u64,

    /// Retries after the first attempt, for transient failures only.
    pub max_retries: u32,

    /// Delay before the first retry (milliseconds); doubles each retry.
    pub backoff_ms: u64,

    /// Requests in flight at once. Waiting for a slot does not count
    /// against the timeout.
    pub max_concurrent: usize,
}

impl FetchPolicy {
    pub fn new(timeout_ms: u64, max_retries: u32, backoff_ms: u64) -> Self {
        Self {
            timeout_ms,
            max_retries,
            backoff_ms,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    /// Set the number of requests in flight at once.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Returns the per-attempt timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(MAX_BACKOFF_SHIFT);
        Duration::from_millis(self.backoff_ms.saturating_mul(1 << shift))
    }

    /// Upper bound on how long one query can take once it holds a slot,
    /// retries included.
    pub fn worst_case(&self) -> Duration {
        let attempts = self.max_retries + 1;
        let waits: Duration = (1..attempts).map(|a| self.backoff(a)).sum();
        self.timeout() * attempts + waits
    }
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_retries: 2,
            backoff_ms: 250,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

/// Configuration for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub fetch: FetchPolicy,

    pub delivery: DeliveryPolicy,

    /// Zone used for the clock time shown on the device.
    pub zone: DisplayZone,
}

impl PipelineConfig {
    /// Set the fetch policy.
    pub fn with_fetch(mut self, fetch: FetchPolicy) -> Self {
        self.fetch = fetch;
        self
    }

    /// Set the delivery policy.
    pub fn with_delivery(mut self, delivery: DeliveryPolicy) -> Self {
        self.delivery = delivery;
        self
    }

    /// Set the display zone.
    pub fn with_zone(mut self, zone: DisplayZone) -> Self {
        self.zone = zone;
        self
    }
}
