use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::AppError;
use crate::handlers::{AppState, present, read_json, require_admin};
use crate::models::Project;

#[derive(Debug, Default, Deserialize)]
pub struct NewProject {
    name: Option<Value>,
    owner: Option<Value>,
    description: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectName {
    name: Option<Value>,
}

pub async fn list_projects(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Project>>, AppError> {
    Ok(Json(state.service.list_projects().await?))
}

pub async fn add_project(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<NewProject>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    require_admin(&state.config, &headers)?;
    let payload: NewProject = read_json(payload);

    let (Some(name), Some(owner)) = (present(payload.name), present(payload.owner)) else {
        return Err(AppError::Validation("name and owner required".to_string()));
    };

    state
        .service
        .add_project(name, owner, present(payload.description).unwrap_or_default())
        .await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ProjectName>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    require_admin(&state.config, &headers)?;
    let payload: ProjectName = read_json(payload);

    let Some(name) = present(payload.name) else {
        return Err(AppError::Validation("name required".to_string()));
    };

    state.service.delete_project(&name).await?;
    Ok(Json(json!({ "ok": true })))
}
