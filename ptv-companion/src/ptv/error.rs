//! Departure service error types.

use std::fmt;
use std::time::Duration;

/// Errors from the upstream departure service.
#[derive(Debug)]
pub enum PtvError {
    /// HTTP request failed (connection refused, reset, etc.)
    Http(reqwest::Error),

    /// Request did not finish within the configured timeout
    Timeout(Duration),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code
    ApiError { status: u16, message: String },

    /// Rate limited by the API
    RateLimited,

    /// Token rejected
    Unauthorized,
}

impl PtvError {
    /// Whether the same request may succeed if tried again.
    ///
    /// Network failures, timeouts, rate limiting and server errors are
    /// transient. Rejected tokens, client errors and malformed bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            PtvError::Http(e) => !e.is_builder() && !e.is_decode(),
            PtvError::Timeout(_) => true,
            PtvError::RateLimited => true,
            PtvError::ApiError { status, .. } => *status >= 500,
            PtvError::Json { .. } | PtvError::Unauthorized => false,
        }
    }
}

impl fmt::Display for PtvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PtvError::Http(e) => write!(f, "HTTP error: {e}"),
            PtvError::Timeout(d) => write!(f, "request timed out after {}ms", d.as_millis()),
            PtvError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            PtvError::ApiError { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            PtvError::RateLimited => write!(f, "rate limited by departure API"),
            PtvError::Unauthorized => write!(f, "unauthorized (token rejected)"),
        }
    }
}

impl std::error::Error for PtvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PtvError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PtvError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not expose the configured timeout
            return PtvError::Timeout(Duration::ZERO);
        }
        PtvError::Http(err)
    }
}
