//! Delivery error types.

use crate::domain::OutboundMessage;

/// A single send attempt was not acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("send failed: {reason}")]
pub struct SendError {
    reason: String,
}

impl SendError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors from the outbound delivery queue.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// A message kept failing; it and everything queued behind it were not
    /// delivered. `pending` is in queue order.
    #[error("failed to deliver {failed:?} after {attempts} attempts ({} more pending): {source}", .pending.len())]
    Undelivered {
        failed: OutboundMessage,
        pending: Vec<OutboundMessage>,
        attempts: u32,
        #[source]
        source: SendError,
    },

    /// The queue no longer accepts messages because delivery stopped
    #[error("delivery queue closed")]
    Closed(OutboundMessage),

    /// The sender task ended abnormally after `delivered` acknowledgments.
    /// `unsent` is filled in by whoever still holds the messages.
    #[error("delivery task aborted after {delivered} delivered ({} unsent): {reason}", .unsent.len())]
    Aborted {
        reason: String,
        delivered: usize,
        unsent: Vec<OutboundMessage>,
    },
}

impl DeliveryError {
    /// Messages that never reached the device, in queue order.
    pub fn undelivered(&self) -> Vec<OutboundMessage> {
        match self {
            DeliveryError::Undelivered {
                failed, pending, ..
            } => std::iter::once(failed.clone())
                .chain(pending.iter().cloned())
                .collect(),
            DeliveryError::Closed(message) => vec![message.clone()],
            DeliveryError::Aborted { unsent, .. } => unsent.clone(),
        }
    }
}
