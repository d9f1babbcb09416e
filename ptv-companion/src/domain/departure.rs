//! Departure events reported by the upstream service.

use chrono::{DateTime, Utc};

/// One upstream-reported departure.
///
/// Only the fields the pipeline consumes are kept. Identifiers are
/// normalised to strings so they compare directly with a favourite's
/// `stop_id` and `direction_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub stop_id: String,
    pub direction_id: String,
    pub scheduled: DateTime<Utc>,
    /// Real-time estimate, when the vehicle is being tracked.
    pub estimated: Option<DateTime<Utc>>,
}

impl Departure {
    /// Create a departure with no real-time estimate.
    pub fn scheduled(
        stop_id: impl Into<String>,
        direction_id: impl Into<String>,
        scheduled: DateTime<Utc>,
    ) -> Self {
        Self {
            stop_id: stop_id.into(),
            direction_id: direction_id.into(),
            scheduled,
            estimated: None,
        }
    }

    /// Attach a real-time estimate.
    pub fn with_estimate(mut self, estimated: DateTime<Utc>) -> Self {
        self.estimated = Some(estimated);
        self
    }

    /// Best known departure time: the estimate if present, else the timetable.
    pub fn effective(&self) -> DateTime<Utc> {
        self.estimated.unwrap_or(self.scheduled)
    }

    /// Whether this departure still lies ahead of `now`.
    ///
    /// A departure is upcoming if its scheduled time is in the future, or if
    /// it has an estimate that is. A late-running service (scheduled past,
    /// estimate future) is kept; a past service without an estimate is not.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.scheduled > now || self.estimated.is_some_and(|e| e > now)
    }

    /// Whether this departure serves the given stop in the given direction.
    pub fn serves(&self, stop_id: &str, direction_id: &str) -> bool {
        self.stop_id == stop_id && self.direction_id == direction_id
    }
}
