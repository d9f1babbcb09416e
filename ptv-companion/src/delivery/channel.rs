//! The device-facing message channel.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::OutboundMessage;

use super::error::SendError;

/// A channel to the device that handles one message at a time.
///
/// `send` resolves once the device acknowledged the message. Callers must
/// not start another send before the previous one resolved.
pub trait Downstream: Send + Sync + 'static {
    fn send(&self, message: &OutboundMessage) -> impl Future<Output = Result<(), SendError>> + Send;
}

impl<D: Downstream> Downstream for Arc<D> {
    fn send(&self, message: &OutboundMessage) -> impl Future<Output = Result<(), SendError>> + Send {
        (**self).send(message)
    }
}

/// Retry policy for unacknowledged sends.
#[derive(Debug, Clone)]
pub struct DeliveryPolicy {
    /// Attempts per message, including the first.
    pub max_attempts: u32,

    /// Delay between attempts (milliseconds).
    pub retry_delay_ms: u64,
}

impl DeliveryPolicy {
    pub fn new(max_attempts: u32, retry_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            retry_delay_ms,
        }
    }

    /// Returns the retry delay as a Duration.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy() {
        let policy = DeliveryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.retry_delay(), Duration::from_millis(500));
    }
}
