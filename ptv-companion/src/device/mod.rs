//! Model of the watch application.
//!
//! Used as the delivery target by the command line and in tests.

mod inbox;
mod screen;

pub use inbox::DeviceInbox;
pub use screen::{DeviceScreen, MAX_NAME_BYTES, MAX_ROWS, Row};
