//! The persisted configuration document.

use serde::{Deserialize, Serialize};

use crate::domain::Favourite;

use super::error::ConfigError;

/// `{ token, favourites }` as stored on the phone and exchanged with the
/// configuration page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompanionConfig {
    /// Access token passed to the upstream departure service.
    pub token: String,

    /// Tracked favourites, in display order.
    #[serde(default)]
    pub favourites: Vec<Favourite>,
}

impl CompanionConfig {
    pub fn new(token: impl Into<String>, favourites: Vec<Favourite>) -> Self {
        Self {
            token: token.into(),
            favourites,
        }
    }

    /// Parse a document from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })
    }

    /// Serialise to compact JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })
    }
}
