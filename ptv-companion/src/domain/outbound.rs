//! Messages delivered to the device.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Summary of the next departure for one favourite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundResult {
    /// Favourite name.
    pub name: String,

    /// Scheduled departure as minutes since local midnight (0..1440).
    pub time: u16,

    /// Minutes until departure; fractional, negative if already gone.
    pub minutes: f64,
}

impl OutboundResult {
    /// Scheduled clock time as `H:MM`.
    pub fn clock(&self) -> String {
        format!("{}:{:02}", self.time / 60, self.time % 60)
    }
}

/// One message on the device channel.
///
/// Serialises to `{"notConfigured": true}` or `{"name", "time", "minutes"}`.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// No configuration exists yet; the device should prompt the user.
    NotConfigured,

    /// Next departure for one favourite.
    Departure(OutboundResult),
}

impl OutboundMessage {
    /// Short description for log lines.
    pub fn describe(&self) -> String {
        match self {
            OutboundMessage::NotConfigured => "notConfigured".to_string(),
            OutboundMessage::Departure(r) => format!("{} @ {}", r.name, r.clock()),
        }
    }
}

impl From<OutboundResult> for OutboundMessage {
    fn from(result: OutboundResult) -> Self {
        OutboundMessage::Departure(result)
    }
}

impl Serialize for OutboundMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OutboundMessage::NotConfigured => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("notConfigured", &true)?;
                map.end()
            }
            OutboundMessage::Departure(result) => result.serialize(serializer),
        }
    }
}
