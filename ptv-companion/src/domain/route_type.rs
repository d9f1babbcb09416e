//! Route type identifiers.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when parsing an invalid route type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route type: {reason}")]
pub struct InvalidRouteType {
    reason: &'static str,
}

/// Upstream route type (train, tram, bus, ...).
///
/// The upstream service identifies modes by small integers. Unknown values
/// are kept as-is so a newer mode never breaks an existing configuration.
///
/// # Examples
///
/// ```
/// use ptv_companion::domain::RouteType;
///
/// let tram = RouteType::parse("1").unwrap();
/// assert_eq!(tram, RouteType::TRAM);
/// assert_eq!(tram.label(), Some("Tram"));
///
/// assert!(RouteType::parse("tram").is_err());
/// assert!(RouteType::parse("").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteType(u32);

impl RouteType {
    pub const TRAIN: RouteType = RouteType(0);
    pub const TRAM: RouteType = RouteType(1);
    pub const BUS: RouteType = RouteType(2);
    pub const VLINE: RouteType = RouteType(3);
    pub const NIGHT_BUS: RouteType = RouteType(4);

    /// Create a route type from its numeric identifier.
    pub fn new(id: u32) -> Self {
        RouteType(id)
    }

    /// Parse a route type from its decimal string form.
    pub fn parse(s: &str) -> Result<Self, InvalidRouteType> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InvalidRouteType {
                reason: "must not be empty",
            });
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidRouteType {
                reason: "must be a non-negative integer",
            });
        }
        s.parse().map(RouteType).map_err(|_| InvalidRouteType {
            reason: "out of range",
        })
    }

    /// Numeric identifier as sent upstream.
    pub fn id(&self) -> u32 {
        self.0
    }

    /// Human-readable mode name for well-known identifiers.
    pub fn label(&self) -> Option<&'static str> {
        match self.0 {
            0 => Some("Train"),
            1 => Some("Tram"),
            2 => Some("Bus"),
            3 => Some("V/Line"),
            4 => Some("Night Bus"),
            _ => None,
        }
    }
}

impl fmt::Debug for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteType({})", self.0)
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for RouteType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

/// The configuration page stores form values, so the route type may arrive
/// as either `1` or `"1"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRouteType {
    Number(u32),
    Text(String),
}

impl<'de> Deserialize<'de> for RouteType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawRouteType::deserialize(deserializer)? {
            RawRouteType::Number(n) => Ok(RouteType(n)),
            RawRouteType::Text(s) => RouteType::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}
