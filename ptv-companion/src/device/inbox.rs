//! In-process watch endpoint.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::delivery::{Downstream, SendError};
use crate::domain::OutboundMessage;

use super::screen::DeviceScreen;

/// A watch that receives messages in-process.
///
/// Acknowledges every message while connected. A disconnected inbox
/// rejects sends, which exercises the delivery retry path.
#[derive(Debug, Default)]
pub struct DeviceInbox {
    screen: Mutex<DeviceScreen>,
    received: AtomicUsize,
    in_flight: AtomicBool,
    disconnected: AtomicBool,
}

impl DeviceInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current screen.
    pub fn screen(&self) -> DeviceScreen {
        self.lock().clone()
    }

    /// Messages acknowledged so far.
    pub fn received(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }

    pub fn set_connected(&self, connected: bool) {
        self.disconnected.store(!connected, Ordering::SeqCst);
    }

    /// Reset the screen before a refresh.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, DeviceScreen> {
        self.screen.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Downstream for DeviceInbox {
    async fn send(&self, message: &OutboundMessage) -> Result<(), SendError> {
        if self.disconnected.load(Ordering::SeqCst) {
            return Err(SendError::new("device not connected"));
        }
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(SendError::new("previous message not yet acknowledged"));
        }

        self.lock().apply(message);
        let count = self.received.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(count, message = %message.describe(), "Device acknowledged");

        self.in_flight.store(false, Ordering::SeqCst);
        Ok(())
    }
}
