//! Departure API response DTOs.
//!
//! Only the fields the pipeline consumes are declared; everything else in
//! the response is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::domain::Departure;

/// Response body of a departures request.
#[derive(Debug, Clone, Deserialize)]
pub struct DeparturesResponse {
    /// Departures at the requested stop, any direction.
    #[serde(default)]
    pub departures: Vec<DepartureDto>,
}

/// A single departure as reported upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct DepartureDto {
    /// Stop identifier. Sent as a number, kept as a string.
    #[serde(deserialize_with = "id_string")]
    pub stop_id: String,

    /// Direction identifier. Sent as a number, kept as a string.
    #[serde(deserialize_with = "id_string")]
    pub direction_id: String,

    /// Timetabled departure time (UTC).
    pub scheduled_departure_utc: DateTime<Utc>,

    /// Real-time estimate (UTC); absent or null when not tracked.
    #[serde(default)]
    pub estimated_departure_utc: Option<DateTime<Utc>>,
}

impl From<DepartureDto> for Departure {
    fn from(dto: DepartureDto) -> Self {
        Departure {
            stop_id: dto.stop_id,
            direction_id: dto.direction_id,
            scheduled: dto.scheduled_departure_utc,
            estimated: dto.estimated_departure_utc,
        }
    }
}

impl DeparturesResponse {
    /// Convert into domain departures.
    pub fn into_departures(self) -> Vec<Departure> {
        self.departures.into_iter().map(Departure::from).collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}
