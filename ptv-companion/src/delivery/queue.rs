//! Outbound delivery queue.
//!
//! Producers `push` messages; a single sender task pops the head, sends it,
//! waits for the acknowledgment, and only then pops the next one. The task
//! ends when the producer side is finished and the queue is empty.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::domain::OutboundMessage;
use crate::pipeline::RunLease;

use super::channel::{DeliveryPolicy, Downstream};
use super::error::{DeliveryError, SendError};

/// What the sender task is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    /// Nothing in flight.
    Idle,
    /// One message sent, waiting for its acknowledgment.
    Sending,
}

/// Summary of a completed delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Messages acknowledged by the device.
    pub delivered: usize,
    /// Send attempts that had to be repeated.
    pub retries: usize,
}

#[derive(Default)]
struct QueueStatus {
    sending: AtomicBool,
    pending: AtomicUsize,
    delivered: AtomicUsize,
}

/// FIFO queue of messages for one run, drained by a single sender task.
///
/// Dropping the queue, or a [`finish`](Self::finish) future that has not
/// completed, aborts the sender task. The task holds the spawning run's
/// [`RunLease`] until it has stopped.
pub struct DeliveryQueue {
    tx: Option<mpsc::UnboundedSender<OutboundMessage>>,
    task: Option<JoinHandle<Result<DeliveryReport, DeliveryError>>>,
    status: Arc<QueueStatus>,
}

impl DeliveryQueue {
    /// Start a sender task delivering to `downstream`.
    pub fn spawn<D: Downstream>(downstream: Arc<D>, policy: DeliveryPolicy) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let status = Arc::new(QueueStatus::default());
        let lease = RunLease::current();
        let drained = drain(downstream, rx, policy, status.clone());
        let task = tokio::spawn(async move {
            let _lease = lease;
            drained.await
        });

        Self {
            tx: Some(tx),
            task: Some(task),
            status,
        }
    }

    /// Append a message to the queue.
    ///
    /// Fails with [`DeliveryError::Closed`], handing the message back, if
    /// delivery has already stopped.
    pub fn push(&self, message: OutboundMessage) -> Result<(), DeliveryError> {
        let Some(tx) = &self.tx else {
            return Err(DeliveryError::Closed(message));
        };

        self.status.pending.fetch_add(1, Ordering::SeqCst);
        tx.send(message).map_err(|e| {
            self.status.pending.fetch_sub(1, Ordering::SeqCst);
            DeliveryError::Closed(e.0)
        })
    }

    /// Current sender state.
    pub fn state(&self) -> DeliveryState {
        if self.status.sending.load(Ordering::SeqCst) {
            DeliveryState::Sending
        } else {
            DeliveryState::Idle
        }
    }

    /// Messages queued but not yet taken by the sender.
    pub fn pending(&self) -> usize {
        self.status.pending.load(Ordering::SeqCst)
    }

    /// Stop accepting messages and wait until the queue is drained.
    pub async fn finish(mut self) -> Result<DeliveryReport, DeliveryError> {
        // Dropping the sender lets the task exit once the queue is empty
        self.tx.take();

        // The handle stays in `self` so that dropping this future aborts the task
        let Some(task) = self.task.as_mut() else {
            return Err(self.aborted("sender task already taken".to_string()));
        };
        let joined = task.await;
        self.task = None;

        match joined {
            Ok(result) => result,
            Err(e) => Err(self.aborted(e.to_string())),
        }
    }

    fn aborted(&self, reason: String) -> DeliveryError {
        DeliveryError::Aborted {
            reason,
            delivered: self.status.delivered.load(Ordering::SeqCst),
            unsent: Vec::new(),
        }
    }
}

impl Drop for DeliveryQueue {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Sender loop: one message in flight at a time.
async fn drain<D: Downstream>(
    downstream: Arc<D>,
    mut rx: mpsc::UnboundedReceiver<OutboundMessage>,
    policy: DeliveryPolicy,
    status: Arc<QueueStatus>,
) -> Result<DeliveryReport, DeliveryError> {
    let mut report = DeliveryReport::default();

    while let Some(message) = rx.recv().await {
        status.pending.fetch_sub(1, Ordering::SeqCst);
        status.sending.store(true, Ordering::SeqCst);
        let result = send_with_retry(downstream.as_ref(), &message, &policy).await;
        status.sending.store(false, Ordering::SeqCst);

        match result {
            Ok(attempts) => {
                trace!(message = %message.describe(), attempts, "Delivered");
                report.delivered += 1;
                status.delivered.fetch_add(1, Ordering::SeqCst);
                report.retries += (attempts - 1) as usize;
            }
            Err((source, attempts)) => {
                // Refuse new messages, then collect what is already queued
                rx.close();
                let mut pending = Vec::new();
                while let Some(next) = rx.recv().await {
                    status.pending.fetch_sub(1, Ordering::SeqCst);
                    pending.push(next);
                }

                warn!(
                    message = %message.describe(),
                    attempts,
                    pending = pending.len(),
                    error = %source,
                    "Delivery failed, stopping queue"
                );
                return Err(DeliveryError::Undelivered {
                    failed: message,
                    pending,
                    attempts,
                    source,
                });
            }
        }
    }

    debug!(
        delivered = report.delivered,
        retries = report.retries,
        "Delivery queue drained"
    );
    Ok(report)
}

/// Send one message, retrying until acknowledged or out of attempts.
///
/// Returns the number of attempts used.
async fn send_with_retry<D: Downstream>(
    downstream: &D,
    message: &OutboundMessage,
    policy: &DeliveryPolicy,
) -> Result<u32, (SendError, u32)> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match downstream.send(message).await {
            Ok(()) => return Ok(attempt),
            Err(e) if attempt < max_attempts => {
                debug!(message = %message.describe(), attempt, error = %e, "Send not acknowledged, retrying");
                tokio::time::sleep(policy.retry_delay()).await;
            }
            Err(e) => return Err((e, attempt)),
        }
    }
}
