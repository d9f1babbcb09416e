//! Web layer for the configuration page.
//!
//! Serves the form the phone opens to edit the token and favourites, and
//! redirects back to the companion with the edited document.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::{ConfigPageRequest, SaveRequest, format_favourites, parse_favourites};
pub use routes::{AppError, create_router};
pub use state::{AppState, DEFAULT_RETURN_TO};
