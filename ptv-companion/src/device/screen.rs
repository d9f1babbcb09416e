//! What the watch shows.

use std::fmt;

use tracing::{error, info};

use crate::domain::OutboundMessage;

/// Rows the watch can hold.
pub const MAX_ROWS: usize = 20;

/// Longest name the watch keeps, in bytes.
pub const MAX_NAME_BYTES: usize = 63;

const LOADING: &str = "Loading...";
const NOT_CONFIGURED: &str = "Configure the app on your phone.";

/// One departure row as stored on the watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub name: String,

    /// Minutes since local midnight.
    pub time: i32,

    /// Whole minutes until departure.
    pub minutes: i32,
}

impl Row {
    /// Left column: scheduled clock time.
    pub fn clock(&self) -> String {
        format!("{}:{:02}", self.time / 60, self.time % 60)
    }

    /// Right column: countdown.
    pub fn countdown(&self) -> String {
        match self.minutes {
            m if m < 0 => "N/A".to_string(),
            0 => "Now".to_string(),
            m => format!("{m} min"),
        }
    }
}

/// Screen state of the watch application.
#[derive(Debug, Clone, Default)]
pub struct DeviceScreen {
    rows: Vec<Row>,
    not_configured: bool,
}

impl DeviceScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one received message.
    pub fn apply(&mut self, message: &OutboundMessage) {
        match message {
            OutboundMessage::NotConfigured => {
                info!("Device asked to prompt for configuration");
                self.not_configured = true;
            }
            OutboundMessage::Departure(result) => {
                if self.rows.len() >= MAX_ROWS {
                    error!(name = %result.name, "Maximum number of departures reached");
                    return;
                }
                self.rows.push(Row {
                    name: truncate(&result.name, MAX_NAME_BYTES).to_string(),
                    time: i32::from(result.time),
                    // Saturating float-to-int cast truncates toward zero
                    minutes: result.minutes as i32,
                });
            }
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Centre text shown instead of the list, if any.
    ///
    /// The list covers the centre text as soon as it has a row.
    pub fn banner(&self) -> Option<&'static str> {
        if !self.rows.is_empty() {
            None
        } else if self.not_configured {
            Some(NOT_CONFIGURED)
        } else {
            Some(LOADING)
        }
    }

    /// Drop all rows and return to the loading state.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.not_configured = false;
    }

    /// Render the screen as text, one line per row.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DeviceScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(banner) = self.banner() {
            return writeln!(f, "{banner}");
        }
        for row in &self.rows {
            writeln!(f, "{:<6}{:>8}  {}", row.clock(), row.countdown(), row.name)?;
        }
        Ok(())
    }
}

/// Cut `s` to at most `max` bytes on a character boundary.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
