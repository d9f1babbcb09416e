//! Application state for the configuration page.

use std::sync::Arc;

/// Close URL of the phone's web view.
pub const DEFAULT_RETURN_TO: &str = "pebblejs://close#";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Redirect target used when the page was opened without `return_to`.
    pub default_return_to: Arc<str>,
}

impl AppState {
    pub fn new(default_return_to: impl Into<Arc<str>>) -> Self {
        Self {
            default_return_to: default_return_to.into(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_RETURN_TO)
    }
}
