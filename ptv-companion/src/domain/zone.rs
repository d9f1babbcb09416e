//! Wall-clock zone used for the `time` field shown on the device.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, Timelike, Utc};
use chrono_tz::Tz;

/// Time zone in which departure clock times are displayed.
///
/// Defaults to the host's local zone, which is what the phone shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    #[default]
    Local,
    Named(Tz),
}

impl DisplayZone {
    /// Minutes since local midnight of `t` in this zone.
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use ptv_companion::domain::DisplayZone;
    ///
    /// let zone: DisplayZone = "Australia/Melbourne".parse().unwrap();
    /// // 22:30 UTC on 15 March 2024 is 09:30 AEDT the next morning.
    /// let t = Utc.with_ymd_and_hms(2024, 3, 15, 22, 30, 0).unwrap();
    /// assert_eq!(zone.minutes_since_midnight(t), 9 * 60 + 30);
    /// ```
    pub fn minutes_since_midnight(&self, t: DateTime<Utc>) -> u16 {
        let (hour, minute) = match self {
            DisplayZone::Local => {
                let local = t.with_timezone(&Local);
                (local.hour(), local.minute())
            }
            DisplayZone::Named(tz) => {
                let local = t.with_timezone(tz);
                (local.hour(), local.minute())
            }
        };
        (hour * 60 + minute) as u16
    }
}

impl FromStr for DisplayZone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("local") {
            return Ok(DisplayZone::Local);
        }
        s.parse::<Tz>()
            .map(DisplayZone::Named)
            .map_err(|_| format!("unknown time zone: {s}"))
    }
}

impl fmt::Display for DisplayZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayZone::Local => f.write_str("local"),
            DisplayZone::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}
