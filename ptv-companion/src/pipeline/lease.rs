//! Lifetime tracking for a run and the tasks it spawns.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::oneshot;

tokio::task_local! {
    static CURRENT: RunLease;
}

/// Held by a run and by every task the run spawns.
///
/// The paired [`LeaseReleased`] resolves once the last clone is dropped,
/// i.e. once the run and all of its tasks are gone.
#[derive(Debug, Clone)]
pub struct RunLease(Arc<oneshot::Sender<()>>);

/// Resolves when every clone of a [`RunLease`] has been dropped.
#[derive(Debug)]
pub struct LeaseReleased(oneshot::Receiver<()>);

impl RunLease {
    pub fn new() -> (Self, LeaseReleased) {
        let (tx, rx) = oneshot::channel();
        (RunLease(Arc::new(tx)), LeaseReleased(rx))
    }

    /// Lease of the run driving the current task, if any.
    pub fn current() -> Option<Self> {
        CURRENT.try_with(Clone::clone).ok()
    }

    /// Drive `fut` with this lease as the current one.
    pub fn scope<F: Future>(self, fut: F) -> impl Future<Output = F::Output> {
        CURRENT.scope(self, fut)
    }
}

impl LeaseReleased {
    pub async fn wait(self) {
        // Nothing is ever sent; the channel closes when the sender is dropped
        let _ = self.0.await;
    }
}
