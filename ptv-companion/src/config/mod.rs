//! Configuration document, its storage, and the web view handoff.
//!
//! The pipeline treats configuration as read-only input: a token for the
//! upstream service and the list of favourites to track.

mod document;
mod error;
mod handoff;
mod store;

pub use document::CompanionConfig;
pub use error::ConfigError;
pub use handoff::{apply_response, configuration_url, decode_response};
pub use store::{ConfigStore, FileConfigStore, MemoryConfigStore};
