//! Favourites and the upstream queries derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::RouteType;

/// A stop and direction the user tracks.
///
/// Field names on the wire match the configuration document exactly
/// (`name`, `routeType`, `stopID`, `directionID`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favourite {
    /// Label shown on the device.
    pub name: String,

    #[serde(rename = "routeType")]
    pub route_type: RouteType,

    #[serde(rename = "stopID")]
    pub stop_id: String,

    #[serde(rename = "directionID")]
    pub direction_id: String,
}

impl Favourite {
    /// Create a new favourite.
    pub fn new(
        name: impl Into<String>,
        route_type: RouteType,
        stop_id: impl Into<String>,
        direction_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            route_type,
            stop_id: stop_id.into(),
            direction_id: direction_id.into(),
        }
    }

    /// The upstream query that covers this favourite.
    pub fn query(&self) -> Query {
        Query::new(self.route_type, self.stop_id.clone())
    }
}

/// One upstream request: all departures of a route type at a stop.
///
/// Several favourites (e.g. both directions at one stop) share a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    pub route_type: RouteType,
    pub stop_id: String,
}

impl Query {
    pub fn new(route_type: RouteType, stop_id: impl Into<String>) -> Self {
        Self {
            route_type,
            stop_id: stop_id.into(),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.route_type, self.stop_id)
    }
}
