//! Concurrent fetch of departures for every query.
//!
//! Every query gets its own future; all of them are created up front and
//! joined with `join_all`, so requests overlap on the caller's task. A
//! semaphore caps how many are in flight; a query times only its own
//! request, never the wait for a slot. Each future resolves to either
//! departures or an explicit failure, so the join always completes.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::domain::{Departure, Query};
use crate::ptv::PtvError;

use super::config::FetchPolicy;

/// Source of departures for a query.
///
/// This abstraction lets the pipeline run against the live service, canned
/// data, or a cache.
pub trait DepartureProvider: Send + Sync {
    /// All departures for `query`, in any order.
    fn departures(
        &self,
        token: &str,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<Departure>, PtvError>> + Send;
}

impl<P: DepartureProvider> DepartureProvider for Arc<P> {
    fn departures(
        &self,
        token: &str,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<Departure>, PtvError>> + Send {
        (**self).departures(token, query)
    }
}

/// A query that could not be fetched after all attempts.
#[derive(Debug)]
pub struct FetchFailure {
    pub query: Query,
    pub error: PtvError,
    pub attempts: u32,
}

/// Result of fetching every query of a run.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// All fetched departures, concatenated in no particular order.
    pub departures: Vec<Departure>,

    /// Queries that contributed nothing because they failed.
    pub failures: Vec<FetchFailure>,

    /// Total requests issued, retries included.
    pub requests: usize,
}

/// Fetch every query concurrently and pool the results.
///
/// A failed query is logged and recorded in [`FetchOutcome::failures`];
/// it never fails the whole fetch.
pub async fn fetch_all<P: DepartureProvider>(
    provider: &P,
    token: &str,
    queries: &[Query],
    policy: &FetchPolicy,
) -> FetchOutcome {
    let mut outcome = FetchOutcome::default();
    if queries.is_empty() {
        return outcome;
    }

    let limiter = Semaphore::new(policy.max_concurrent.max(1));
    let futures: Vec<_> = queries
        .iter()
        .map(|query| fetch_with_retry(provider, &limiter, token, query, policy))
        .collect();

    for (query, attempts, result) in join_all(futures).await {
        outcome.requests += attempts as usize;
        match result {
            Ok(deps) => {
                debug!(%query, departures = deps.len(), attempts, "Fetched departures");
                outcome.departures.extend(deps);
            }
            Err(error) => {
                warn!(%query, %error, attempts, "Failed to fetch departures, using empty");
                outcome.failures.push(FetchFailure {
                    query: query.clone(),
                    error,
                    attempts,
                });
            }
        }
    }

    outcome
}

/// Fetch one query, retrying transient failures with backoff.
async fn fetch_with_retry<'q, P: DepartureProvider>(
    provider: &P,
    limiter: &Semaphore,
    token: &str,
    query: &'q Query,
    policy: &FetchPolicy,
) -> (&'q Query, u32, Result<Vec<Departure>, PtvError>) {
    let mut attempt = 0;

    loop {
        attempt += 1;

        // The semaphore is never closed; the slot is released before any backoff
        let permit = limiter.acquire().await.ok();
        let result = match tokio::time::timeout(policy.timeout(), provider.departures(token, query))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(PtvError::Timeout(policy.timeout())),
        };
        drop(permit);

        match result {
            Err(error) if error.is_retryable() && attempt <= policy.max_retries => {
                let delay = policy.backoff(attempt);
                debug!(
                    %query,
                    %error,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying departures request"
                );
                tokio::time::sleep(delay).await;
            }
            result => return (query, attempt, result),
        }
    }
}
