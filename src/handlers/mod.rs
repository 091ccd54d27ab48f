mod projects;
mod results;
mod votes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderName, Method, StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
    routing::get,
};
use log::warn;
use serde_json::{Value, json};
use subtle::ConstantTimeEq;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::error::AppError;
use crate::service::VotingService;

pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

pub struct AppState {
    pub service: VotingService,
    pub config: Config,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(ADMIN_SECRET_HEADER)])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route(
            "/projects",
            get(projects::list_projects)
                .post(projects::add_project)
                .delete(projects::delete_project)
                .fallback(method_not_allowed),
        )
        .route(
            "/votes",
            get(votes::list_votes)
                .post(votes::submit_vote)
                .delete(votes::clear_votes)
                .fallback(method_not_allowed),
        )
        .route("/results", get(results::results).fallback(method_not_allowed))
        .route("/criteria", get(results::criteria).fallback(method_not_allowed))
        .route("/health", get(health).fallback(method_not_allowed))
        .layer(cors)
        .with_state(state)
}

async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, Json(json!({ "error": "Method not allowed" })))
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "ok": true, "store": state.service.backend_tag() }))
}

// Shared-secret gate for admin and results routes; open when no secret is configured
pub fn require_admin(config: &Config, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(secret) = config.admin_secret.as_deref() else {
        return Ok(());
    };
    let supplied = headers.get(ADMIN_SECRET_HEADER).map(|v| v.as_bytes()).unwrap_or_default();
    if bool::from(supplied.ct_eq(secret.as_bytes())) {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

// An unreadable body is treated like one with every field missing
fn read_json<T: Default>(payload: Result<Json<T>, JsonRejection>) -> T {
    match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!("Ignoring unreadable request body: {}", rejection.body_text());
            T::default()
        }
    }
}

// Absent, null and empty strings all count as missing; numbers are taken as text
fn present(field: Option<Value>) -> Option<String> {
    match field? {
        Value::String(text) if !text.is_empty() => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
