//! Backpressured delivery of results to the device.
//!
//! The device accepts one message at a time and acknowledges each. The
//! queue here guarantees there is never a second message in flight, retries
//! unacknowledged sends, and reports anything it could not deliver instead
//! of dropping it.

mod channel;
mod error;
mod queue;

pub use channel::{DeliveryPolicy, Downstream};
pub use error::{DeliveryError, SendError};
pub use queue::{DeliveryQueue, DeliveryReport, DeliveryState};
