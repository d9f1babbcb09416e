//! One end-to-end pipeline run.
//!
//! Config store -> queries -> concurrent fetch -> filter/sort -> selection
//! -> delivery queue.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::{ConfigError, ConfigStore};
use crate::delivery::{DeliveryError, DeliveryQueue, DeliveryReport, Downstream};
use crate::domain::OutboundMessage;

use super::config::PipelineConfig;
use super::fetch::{DepartureProvider, FetchFailure, fetch_all};
use super::merge::filter_and_sort;
use super::query::build_queries;
use super::select::select_departures;

/// Error from a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Configuration exists but could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Results could not be delivered to the device
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// A newer run replaced this one before it finished
    #[error("run superseded by a newer run")]
    Superseded,
}

/// Messages computed for one run, before delivery.
#[derive(Debug, Default)]
pub struct RunPlan {
    /// What to send, in order.
    pub messages: Vec<OutboundMessage>,

    /// Distinct upstream queries derived from the favourites.
    pub queries: usize,

    /// Upstream requests issued, retries included.
    pub requests: usize,

    /// Queries that failed and contributed no departures.
    pub failures: Vec<FetchFailure>,
}

impl RunPlan {
    fn not_configured() -> Self {
        Self {
            messages: vec![OutboundMessage::NotConfigured],
            ..Default::default()
        }
    }

    /// Whether a configuration document was present.
    pub fn is_configured(&self) -> bool {
        self.messages.first() != Some(&OutboundMessage::NotConfigured)
    }
}

/// Outcome of a delivered run.
#[derive(Debug)]
pub struct RunReport {
    pub plan: RunPlan,
    pub delivery: DeliveryReport,
}

/// The departure aggregation pipeline.
///
/// Holds no per-run state: every call to [`run`](Self::run) gets its own
/// queries, departure pool and delivery queue, so runs never share data.
pub struct Pipeline<P> {
    provider: P,
    store: Arc<dyn ConfigStore>,
    config: PipelineConfig,
}

impl<P: DepartureProvider> Pipeline<P> {
    pub fn new(provider: P, store: Arc<dyn ConfigStore>, config: PipelineConfig) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Compute the messages for a run at `now` without delivering them.
    pub async fn prepare(&self, now: DateTime<Utc>) -> Result<RunPlan, PipelineError> {
        let Some(document) = self.store.get()? else {
            info!("No configuration found, prompting device");
            return Ok(RunPlan::not_configured());
        };

        let queries = build_queries(&document.favourites);
        let fetched = fetch_all(&self.provider, &document.token, &queries, &self.config.fetch).await;

        let pooled = fetched.departures.len();
        let sorted = filter_and_sort(fetched.departures, now);
        let results = select_departures(&document.favourites, &sorted, now, &self.config.zone);

        info!(
            favourites = document.favourites.len(),
            queries = queries.len(),
            failed_queries = fetched.failures.len(),
            departures = pooled,
            upcoming = sorted.len(),
            results = results.len(),
            "Prepared departures"
        );

        Ok(RunPlan {
            messages: results.into_iter().map(OutboundMessage::from).collect(),
            queries: queries.len(),
            requests: fetched.requests,
            failures: fetched.failures,
        })
    }

    /// Run the whole pipeline at `now`, delivering to `downstream`.
    ///
    /// Fetch failures never fail the run. A delivery failure does, and the
    /// error lists every message that did not reach the device.
    pub async fn run<D: Downstream>(
        &self,
        downstream: Arc<D>,
        now: DateTime<Utc>,
    ) -> Result<RunReport, PipelineError> {
        let plan = self.prepare(now).await?;

        let queue = DeliveryQueue::spawn(downstream, self.config.delivery.clone());
        let mut unsent = Vec::new();
        for message in plan.messages.iter().cloned() {
            if let Err(e) = queue.push(message) {
                unsent.extend(e.undelivered());
            }
        }

        let delivery = match queue.finish().await {
            Ok(report) => report,
            Err(DeliveryError::Undelivered {
                failed,
                mut pending,
                attempts,
                source,
            }) => {
                pending.extend(unsent);
                warn!(undelivered = pending.len() + 1, "Run ended with undelivered messages");
                return Err(DeliveryError::Undelivered {
                    failed,
                    pending,
                    attempts,
                    source,
                }
                .into());
            }
            Err(DeliveryError::Aborted {
                reason, delivered, ..
            }) => {
                // Messages are acknowledged in order, so everything past
                // `delivered` is lost, including pushes that were refused
                let unsent = plan.messages.get(delivered..).unwrap_or_default().to_vec();
                warn!(undelivered = unsent.len(), %reason, "Delivery task aborted");
                return Err(DeliveryError::Aborted {
                    reason,
                    delivered,
                    unsent,
                }
                .into());
            }
            Err(e) => {
                warn!(refused = unsent.len(), error = %e, "Delivery stopped");
                return Err(e.into());
            }
        };

        Ok(RunReport { plan, delivery })
    }
}
