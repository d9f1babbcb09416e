//! Mock departure client for running without API access.
//!
//! Loads sample responses from JSON files and serves them as if they were
//! live API responses.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::{Departure, Query, RouteType};
use crate::pipeline::DepartureProvider;

use super::error::PtvError;
use super::types::DeparturesResponse;

/// Mock client that serves canned departures per query.
///
/// Useful for development and tests without an upstream endpoint.
#[derive(Clone, Default)]
pub struct MockPtvClient {
    departures: Arc<HashMap<Query, Vec<Departure>>>,
    calls: Arc<AtomicUsize>,
}

impl MockPtvClient {
    /// Create a mock serving the given departures.
    pub fn from_map(departures: HashMap<Query, Vec<Departure>>) -> Self {
        Self {
            departures: Arc::new(departures),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock client by loading JSON files from a directory.
    ///
    /// Expects files named `{routeType}-{stopID}.json` (e.g. `1-2504.json`),
    /// each holding a departures response body.
    pub fn load(data_dir: impl AsRef<Path>) -> Result<Self, PtvError> {
        let data_dir = data_dir.as_ref();
        let mut departures = HashMap::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| PtvError::ApiError {
            status: 0,
            message: format!("Failed to read mock data directory: {}", e),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| PtvError::ApiError {
                status: 0,
                message: format!("Failed to read directory entry: {}", e),
            })?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let query = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(parse_query_stem)
                .ok_or_else(|| PtvError::ApiError {
                    status: 0,
                    message: format!("Invalid mock filename: {:?}", path),
                })?;

            let json = std::fs::read_to_string(&path).map_err(|e| PtvError::ApiError {
                status: 0,
                message: format!("Failed to read {:?}: {}", path, e),
            })?;

            let response: DeparturesResponse =
                serde_json::from_str(&json).map_err(|e| PtvError::Json {
                    message: format!("Failed to parse {:?}: {}", path, e),
                    body: None,
                })?;

            departures.insert(query, response.into_departures());
        }

        if departures.is_empty() {
            return Err(PtvError::ApiError {
                status: 0,
                message: format!("No mock departure files found in {:?}", data_dir),
            });
        }

        Ok(Self::from_map(departures))
    }

    /// Number of requests served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Queries that have canned data.
    pub fn available_queries(&self) -> Vec<Query> {
        self.departures.keys().cloned().collect()
    }

    /// Mimics `PtvClient::get_departures`. The token is ignored.
    pub async fn get_departures(
        &self,
        _token: &str,
        query: &Query,
    ) -> Result<Vec<Departure>, PtvError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        self.departures
            .get(query)
            .cloned()
            .ok_or_else(|| PtvError::ApiError {
                status: 404,
                message: format!("No mock data for {query}"),
            })
    }
}

impl DepartureProvider for MockPtvClient {
    async fn departures(&self, token: &str, query: &Query) -> Result<Vec<Departure>, PtvError> {
        self.get_departures(token, query).await
    }
}

/// Parse `"1-2504"` into a query.
fn parse_query_stem(stem: &str) -> Option<Query> {
    let (route_type, stop_id) = stem.split_once('-')?;
    let route_type = RouteType::parse(route_type).ok()?;
    if stop_id.is_empty() {
        return None;
    }
    Some(Query::new(route_type, stop_id))
}
