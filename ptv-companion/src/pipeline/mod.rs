//! Departure aggregation pipeline.
//!
//! Turns a configuration document into one message per favourite:
//! favourites are projected onto distinct upstream queries, the queries are
//! fetched concurrently, the pooled departures are filtered against the
//! current time and sorted, and each favourite takes its earliest match.

mod config;
mod fetch;
mod lease;
mod merge;
mod query;
mod run;
mod select;
mod supervisor;

pub use config::{DEFAULT_MAX_CONCURRENT, FetchPolicy, PipelineConfig};
pub use fetch::{DepartureProvider, FetchFailure, FetchOutcome, fetch_all};
pub use lease::{LeaseReleased, RunLease};
pub use merge::filter_and_sort;
pub use query::build_queries;
pub use run::{Pipeline, PipelineError, RunPlan, RunReport};
pub use select::{minutes_until, select_departures};
pub use supervisor::RunSupervisor;
