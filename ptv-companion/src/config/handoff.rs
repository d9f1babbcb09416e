//! URL-based exchange with the configuration web view.
//!
//! The companion opens the configuration page with the current document
//! percent-encoded in a `config` query parameter. When the page closes it
//! hands back the edited document, percent-encoded, as the close response.

use tracing::info;

use super::document::CompanionConfig;
use super::error::ConfigError;
use super::store::ConfigStore;

/// Response the web view reports when the user dismissed the page.
const CANCELLED_RESPONSE: &str = "CANCELLED";

/// Build the URL that opens the configuration page.
///
/// ```
/// use ptv_companion::config::{CompanionConfig, configuration_url};
///
/// let url = configuration_url("http://localhost:8080/", None).unwrap();
/// assert_eq!(url, "http://localhost:8080/");
///
/// let config = CompanionConfig::new("t", vec![]);
/// let url = configuration_url("http://localhost:8080/", Some(&config)).unwrap();
/// assert!(url.starts_with("http://localhost:8080/?config=%7B"));
/// ```
pub fn configuration_url(
    page: &str,
    current: Option<&CompanionConfig>,
) -> Result<String, ConfigError> {
    let Some(config) = current else {
        return Ok(page.to_string());
    };

    let json = config.to_json()?;
    let separator = if page.contains('?') { '&' } else { '?' };
    Ok(format!(
        "{page}{separator}config={}",
        urlencoding::encode(&json)
    ))
}

/// Decode the web view's close response.
///
/// Returns `None` when the user dismissed the page without saving.
pub fn decode_response(response: &str) -> Result<Option<CompanionConfig>, ConfigError> {
    let response = response.trim();
    if response.is_empty() || response == CANCELLED_RESPONSE {
        return Ok(None);
    }

    let json = urlencoding::decode(response).map_err(|e| ConfigError::Encoding {
        message: e.to_string(),
    })?;

    CompanionConfig::from_json(&json).map(Some)
}

/// Decode a close response and persist it.
///
/// Returns the stored document, or `None` if nothing changed.
pub fn apply_response(
    store: &dyn ConfigStore,
    response: &str,
) -> Result<Option<CompanionConfig>, ConfigError> {
    let Some(config) = decode_response(response)? else {
        info!("Configuration dismissed without changes");
        return Ok(None);
    };

    store.set(&config)?;
    info!(
        favourites = config.favourites.len(),
        "Configuration updated"
    );
    Ok(Some(config))
}
