use std::sync::Arc;

use axum::{Json, extract::State, http::HeaderMap};
use serde_json::{Value, json};

use crate::error::AppError;
use crate::handlers::{AppState, require_admin};
use crate::voting::{CRITERIA, ResultsBoard, SCORE_LABELS, max_weighted_score};

pub async fn results(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Json<ResultsBoard>, AppError> {
    require_admin(&state.config, &headers)?;
    Ok(Json(state.service.results().await?))
}

pub async fn criteria() -> Json<Value> {
    let labels: Vec<Value> = SCORE_LABELS
        .iter()
        .map(|(score, label)| json!({ "score": score, "label": label }))
        .collect();
    Json(json!({
        "max": max_weighted_score(),
        "criteria": CRITERIA,
        "labels": labels,
    }))
}
