//! Request types and the favourites text format.

use serde::Deserialize;

use crate::config::CompanionConfig;
use crate::domain::{Favourite, RouteType};

/// Query string of the configuration page.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigPageRequest {
    /// Current document as JSON (already percent-decoded).
    pub config: Option<String>,

    /// Where to send the browser after saving.
    pub return_to: Option<String>,
}

/// Submitted configuration form.
#[derive(Debug, Default, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub token: String,

    /// One favourite per line, `name|routeType|stopID|directionID`.
    #[serde(default)]
    pub favourites: String,

    pub return_to: Option<String>,
}

impl SaveRequest {
    /// Validate the form into a configuration document.
    pub fn into_config(self) -> Result<CompanionConfig, String> {
        let token = self.token.trim();
        if token.is_empty() {
            return Err("A developer token is required".to_string());
        }
        let favourites = parse_favourites(&self.favourites)?;
        Ok(CompanionConfig::new(token, favourites))
    }
}

/// Parse the favourites text area. Blank lines are skipped.
pub fn parse_favourites(text: &str) -> Result<Vec<Favourite>, String> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_line(line).map_err(|e| format!("Line {}: {e}", i + 1)))
        .collect()
}

fn parse_line(line: &str) -> Result<Favourite, String> {
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    let [name, route_type, stop_id, direction_id] = fields[..] else {
        return Err(format!(
            "expected name|routeType|stopID|directionID, got {} field(s)",
            fields.len()
        ));
    };

    if name.is_empty() {
        return Err("name must not be empty".to_string());
    }
    let route_type = RouteType::parse(route_type).map_err(|e| e.to_string())?;
    if stop_id.is_empty() {
        return Err("stopID must not be empty".to_string());
    }
    if direction_id.is_empty() {
        return Err("directionID must not be empty".to_string());
    }

    Ok(Favourite::new(name, route_type, stop_id, direction_id))
}

/// Inverse of [`parse_favourites`].
pub fn format_favourites(favourites: &[Favourite]) -> String {
    favourites
        .iter()
        .map(|f| {
            format!(
                "{}|{}|{}|{}",
                f.name, f.route_type, f.stop_id, f.direction_id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lines_and_skips_blanks() {
        let favs = parse_favourites("Home | 1 | 2100 | 5\n\n  \nWork|0|1071|1\n").unwrap();
        assert_eq!(
            favs,
            vec![
                Favourite::new("Home", RouteType::TRAM, "2100", "5"),
                Favourite::new("Work", RouteType::TRAIN, "1071", "1"),
            ]
        );
    }

    #[test]
    fn reports_line_numbers() {
        let err = parse_favourites("A|1|2|3\nB|tram|2|3").unwrap_err();
        assert!(err.starts_with("Line 2:"), "{err}");

        let err = parse_favourites("A|1|2").unwrap_err();
        assert!(err.contains("3 field(s)"), "{err}");

        let err = parse_favourites("|1|2|3").unwrap_err();
        assert!(err.contains("name"), "{err}");
    }

    #[test]
    fn format_matches_parse() {
        let favs = vec![
            Favourite::new("Home", RouteType::TRAM, "2100", "5"),
            Favourite::new("Night", RouteType::NIGHT_BUS, "77", "12"),
        ];
        let text = format_favourites(&favs);
        assert_eq!(text, "Home|1|2100|5\nNight|4|77|12");
        assert_eq!(parse_favourites(&text).unwrap(), favs);
    }

    #[test]
    fn token_required() {
        let req = SaveRequest {
            token: "  ".into(),
            favourites: String::new(),
            return_to: None,
        };
        assert!(req.into_config().is_err());
    }
}
