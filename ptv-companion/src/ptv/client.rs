//! Departure service HTTP client.
//!
//! One request per (route type, stop); the token travels as a query
//! parameter.

use std::time::Duration;

use tracing::trace;

use crate::domain::{Departure, Query};
use crate::pipeline::DepartureProvider;

use super::error::PtvError;
use super::types::DeparturesResponse;

/// Default request timeout, matching the pipeline's per-attempt timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Longest body excerpt kept in error messages.
const BODY_EXCERPT_CHARS: usize = 500;

/// Configuration for the departure client.
#[derive(Debug, Clone)]
pub struct PtvConfig {
    /// Departures endpoint, e.g. `https://example.org/departures`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl PtvConfig {
    /// Create a new config for the given endpoint.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Departure API client.
///
/// Concurrency is capped by the caller (see `FetchPolicy::max_concurrent`).
#[derive(Debug, Clone)]
pub struct PtvClient {
    http: reqwest::Client,
    base_url: String,
}

impl PtvClient {
    /// Create a new client with the given configuration.
    pub fn new(config: PtvConfig) -> Result<Self, PtvError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Fetch departures for one query.
    pub async fn get_departures(
        &self,
        token: &str,
        query: &Query,
    ) -> Result<Vec<Departure>, PtvError> {
        trace!(%query, "Requesting departures");

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("token", token.to_string()),
                ("routeType", query.route_type.to_string()),
                ("stopID", query.stop_id.clone()),
            ])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(PtvError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PtvError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PtvError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let parsed: DeparturesResponse =
            serde_json::from_str(&body).map_err(|e| PtvError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(BODY_EXCERPT_CHARS).collect()),
            })?;

        Ok(parsed.into_departures())
    }
}

impl DepartureProvider for PtvClient {
    async fn departures(&self, token: &str, query: &Query) -> Result<Vec<Departure>, PtvError> {
        self.get_departures(token, query).await
    }
}
