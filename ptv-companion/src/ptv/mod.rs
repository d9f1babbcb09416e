//! Upstream departure service client.
//!
//! The service answers one question: which departures leave a given stop
//! for a given route type. Key characteristics:
//! - Identifiers (`stop_id`, `direction_id`) arrive as numbers; the
//!   configuration stores them as strings
//! - Times are RFC 3339 UTC; `estimated_departure_utc` is null unless the
//!   vehicle is tracked in real time

mod client;
mod error;
mod mock;
mod types;

pub use client::{PtvClient, PtvConfig};
pub use error::PtvError;
pub use mock::MockPtvClient;
pub use types::{DepartureDto, DeparturesResponse};
