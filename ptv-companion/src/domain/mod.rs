//! Domain types for the departure companion.
//!
//! These types are what the pipeline works on once upstream responses and
//! configuration documents have been parsed.

mod departure;
mod favourite;
mod outbound;
mod route_type;
mod zone;

pub use departure::Departure;
pub use favourite::{Favourite, Query};
pub use outbound::{OutboundMessage, OutboundResult};
pub use route_type::{InvalidRouteType, RouteType};
pub use zone::DisplayZone;
