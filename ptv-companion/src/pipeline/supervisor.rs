//! Cancellation of superseded runs.

use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::{AbortHandle, Abortable, BoxFuture, FutureExt, Shared};
use tracing::debug;

use super::lease::RunLease;
use super::run::PipelineError;

/// Resolves once a run, its spawned tasks, and every run before it are gone.
type Released = Shared<BoxFuture<'static, ()>>;

#[derive(Default)]
struct Slot {
    /// Run in progress.
    active: Option<(u64, AbortHandle)>,

    /// Release signal of the most recently started run.
    released: Option<Released>,
}

/// Keeps at most one pipeline run alive.
///
/// Starting a run through [`run_latest`](Self::run_latest) aborts the run
/// that was in progress and waits until it and the tasks it spawned (such
/// as its delivery queue) have stopped before the new run begins.
#[derive(Default)]
pub struct RunSupervisor {
    slot: Mutex<Slot>,
    next_id: AtomicU64,
}

impl RunSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive `run` to completion unless a newer run or [`cancel`](Self::cancel)
    /// interrupts it, in which case [`PipelineError::Superseded`] is returned.
    ///
    /// `run` is driven with a [`RunLease`] in scope; tasks it spawns should
    /// hold a clone so that supersession waits for them too.
    pub async fn run_latest<F, T>(&self, run: F) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, PipelineError>>,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (abort, registration) = AbortHandle::new_pair();
        let (lease, own_release) = RunLease::new();

        let predecessor = {
            let mut slot = self.lock();
            if let Some((previous_id, previous)) = slot.active.take() {
                debug!(previous_id, id, "Superseding previous run");
                previous.abort();
            }

            let earlier = slot.released.take();
            let chained = earlier.clone();
            slot.released = Some(
                async move {
                    own_release.wait().await;
                    if let Some(earlier) = chained {
                        earlier.await;
                    }
                }
                .boxed()
                .shared(),
            );
            slot.active = Some((id, abort));
            earlier
        };

        let result = Abortable::new(
            async move {
                if let Some(released) = predecessor {
                    released.await;
                }
                lease.scope(run).await
            },
            registration,
        )
        .await;

        {
            let mut slot = self.lock();
            if slot.active.as_ref().is_some_and(|(active_id, _)| *active_id == id) {
                slot.active = None;
            }
        }

        match result {
            Ok(output) => output,
            Err(_aborted) => Err(PipelineError::Superseded),
        }
    }

    /// Abort the run in progress, if any.
    ///
    /// Returns immediately; the run stops at its next suspension point.
    pub fn cancel(&self) {
        if let Some((id, handle)) = self.lock().active.take() {
            debug!(id, "Cancelling run");
            handle.abort();
        }
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.lock().active.is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot> {
        // The guarded values are plain handles, so a poisoned lock is still usable
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}
