//! Askama templates for the configuration page.

use askama::Template;

use crate::domain::RouteType;

/// Configuration form.
#[derive(Template)]
#[template(path = "config.html")]
pub struct ConfigTemplate {
    pub token: String,
    pub favourites: String,
    pub return_to: String,
    pub error: Option<String>,
    pub route_types: Vec<RouteTypeView>,
}

impl ConfigTemplate {
    pub fn new(token: String, favourites: String, return_to: String) -> Self {
        Self {
            token,
            favourites,
            return_to,
            error: None,
            route_types: RouteTypeView::known(),
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Route type legend entry.
#[derive(Debug, Clone)]
pub struct RouteTypeView {
    pub id: u32,
    pub label: &'static str,
}

impl RouteTypeView {
    fn known() -> Vec<Self> {
        [
            RouteType::TRAIN,
            RouteType::TRAM,
            RouteType::BUS,
            RouteType::VLINE,
            RouteType::NIGHT_BUS,
        ]
        .into_iter()
        .filter_map(|rt| {
            rt.label().map(|label| RouteTypeView {
                id: rt.id(),
                label,
            })
        })
        .collect()
    }
}
