//! HTTP route handlers.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::CompanionConfig;

use super::dto::{ConfigPageRequest, SaveRequest, format_favourites};
use super::state::AppState;
use super::templates::ConfigTemplate;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(config_page))
        .route("/health", get(health))
        .route("/save", post(save_config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Configuration form, pre-filled from the `config` parameter.
async fn config_page(
    State(state): State<AppState>,
    Query(req): Query<ConfigPageRequest>,
) -> Response {
    let return_to = req
        .return_to
        .unwrap_or_else(|| state.default_return_to.to_string());

    let current = match req.config.as_deref().map(CompanionConfig::from_json) {
        None => None,
        Some(Ok(config)) => Some(config),
        Some(Err(e)) => {
            warn!(error = %e, "Ignoring unreadable config parameter");
            let page = ConfigTemplate::new(String::new(), String::new(), return_to)
                .with_error(format!("The current configuration could not be read: {e}"));
            return render(StatusCode::OK, page);
        }
    };

    let page = match current {
        Some(config) => ConfigTemplate::new(
            config.token,
            format_favourites(&config.favourites),
            return_to,
        ),
        None => ConfigTemplate::new(String::new(), String::new(), return_to),
    };
    render(StatusCode::OK, page)
}

/// Validate the form and hand the document back to the companion.
async fn save_config(
    State(state): State<AppState>,
    Form(req): Form<SaveRequest>,
) -> Result<Response, AppError> {
    let return_to = req
        .return_to
        .clone()
        .unwrap_or_else(|| state.default_return_to.to_string());
    let token = req.token.clone();
    let favourites = req.favourites.clone();

    let config = match req.into_config() {
        Ok(config) => config,
        Err(message) => {
            let page = ConfigTemplate::new(token, favourites, return_to).with_error(message);
            return Ok(render(StatusCode::BAD_REQUEST, page));
        }
    };

    let json = config.to_json().map_err(|e| AppError::Internal {
        message: e.to_string(),
    })?;
    let location = format!("{return_to}{}", urlencoding::encode(&json));
    let location = HeaderValue::from_str(&location).map_err(|_| AppError::BadRequest {
        message: "return_to is not a valid redirect target".to_string(),
    })?;

    info!(favourites = config.favourites.len(), "Configuration saved");
    Ok((StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response())
}

fn render(status: StatusCode, template: impl Template) -> Response {
    let body = template
        .render()
        .unwrap_or_else(|e| format!("Template error: {}", e));
    (status, Html(body)).into_response()
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Internal { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!(%status, %message, "Request failed");
        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Favourite, RouteType};

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> String {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn empty_page_renders_form() {
        let response = config_page(State(AppState::default()), Query(ConfigPageRequest::default())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("<form"));
        assert!(body.contains("pebblejs:"));
        assert!(body.contains("Night Bus"));
    }

    #[tokio::test]
    async fn page_prefills_current_config() {
        let config = CompanionConfig::new(
            "secret",
            vec![Favourite::new("Home", RouteType::TRAM, "2100", "5")],
        );
        let req = ConfigPageRequest {
            config: Some(config.to_json().unwrap()),
            return_to: Some("http://return/".into()),
        };

        let body = body_text(config_page(State(AppState::default()), Query(req)).await).await;
        assert!(body.contains("value=\"secret\""));
        assert!(body.contains("Home|1|2100|5"));
        assert!(body.contains("name=\"return_to\" value=\"http:"));
    }

    #[tokio::test]
    async fn unreadable_config_shows_error() {
        let req = ConfigPageRequest {
            config: Some("{not json".into()),
            return_to: None,
        };
        let body = body_text(config_page(State(AppState::default()), Query(req)).await).await;
        assert!(body.contains("could not be read"));
    }

    #[tokio::test]
    async fn save_redirects_with_encoded_document() {
        let req = SaveRequest {
            token: "secret".into(),
            favourites: "Home|1|2100|5".into(),
            return_to: None,
        };

        let response = save_config(State(AppState::default()), Form(req)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = location(&response);
        let encoded = location.strip_prefix("pebblejs://close#").unwrap();
        let decoded = crate::config::decode_response(encoded).unwrap().unwrap();
        assert_eq!(decoded.token, "secret");
        assert_eq!(
            decoded.favourites,
            vec![Favourite::new("Home", RouteType::TRAM, "2100", "5")]
        );
    }

    #[tokio::test]
    async fn save_uses_explicit_return_to() {
        let req = SaveRequest {
            token: "t".into(),
            favourites: String::new(),
            return_to: Some("http://localhost/done#".into()),
        };
        let response = save_config(State(AppState::default()), Form(req)).await.unwrap();
        assert!(location(&response).starts_with("http://localhost/done#%7B"));
    }

    #[tokio::test]
    async fn invalid_form_rerenders_with_400() {
        let req = SaveRequest {
            token: "t".into(),
            favourites: "Home|tram|2100|5".into(),
            return_to: None,
        };
        let response = save_config(State(AppState::default()), Form(req)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_text(response).await;
        assert!(body.contains("Line 1:"));
        assert!(body.contains("Home|tram|2100|5"));
    }

    #[tokio::test]
    async fn bad_return_to_is_rejected() {
        let req = SaveRequest {
            token: "t".into(),
            favourites: String::new(),
            return_to: Some("http://x/\n".into()),
        };
        let result = save_config(State(AppState::default()), Form(req)).await;
        assert!(matches!(result, Err(AppError::BadRequest { .. })));
    }
}
