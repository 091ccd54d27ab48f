use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};
use log::warn;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::AppError;
use crate::handlers::{AppState, present, read_json, require_admin};
use crate::models::{Scores, Vote};
use crate::service::Ballot;
use crate::voting::{CRITERIA_COUNT, MAX_SCORE, MIN_SCORE};

#[derive(Debug, Default, Deserialize)]
pub struct VotePayload {
    voter: Option<Value>,
    project: Option<Value>,
    scores: Option<Value>,
    weighted_score: Option<Value>,
}

pub async fn list_votes(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Vote>>, AppError> {
    Ok(Json(state.service.list_votes().await?))
}

pub async fn submit_vote(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VotePayload>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let payload: VotePayload = read_json(payload);

    let (Some(voter), Some(project), Some(scores)) =
        (present(payload.voter), present(payload.project), payload.scores.filter(|s| !s.is_null()))
    else {
        return Err(AppError::Validation("voter, project, scores required".to_string()));
    };
    let scores = match scores {
        Value::Array(raw) => parse_scores(&raw)?,
        _ => return Err(invalid_scores()),
    };
    let weighted_score = payload.weighted_score.filter(|w| !w.is_null()).and_then(|raw| {
        let parsed = whole_number(&raw);
        if parsed.is_none() {
            warn!("Ignoring unusable weighted_score {} from '{}'; recomputing", raw, voter);
        }
        parsed
    });

    state
        .service
        .submit_vote(Ballot {
            voter,
            project,
            scores,
            weighted_score,
        })
        .await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn clear_votes(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Json<Value>, AppError> {
    require_admin(&state.config, &headers)?;
    state.service.clear_votes().await?;
    Ok(Json(json!({ "ok": true })))
}

fn invalid_scores() -> AppError {
    AppError::Validation(format!(
        "scores must be {} integers between {} and {}",
        CRITERIA_COUNT, MIN_SCORE, MAX_SCORE
    ))
}

// Exactly one integer score per criterion, each within the rating scale
fn parse_scores(raw: &[Value]) -> Result<Scores, AppError> {
    if raw.len() != CRITERIA_COUNT {
        return Err(invalid_scores());
    }
    let mut scores: Scores = [0; CRITERIA_COUNT];
    for (slot, value) in scores.iter_mut().zip(raw) {
        let score = value.as_i64().ok_or_else(invalid_scores)?;
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(invalid_scores());
        }
        *slot = score;
    }
    Ok(scores)
}

// Integers, whole-number floats and numeric strings such as 21, 21.0 or "21"
fn whole_number(raw: &Value) -> Option<i64> {
    let as_float = |f: f64| (f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64);
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(as_float)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>().ok().or_else(|| text.parse::<f64>().ok().and_then(as_float))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_must_be_four_in_range_integers() {
        assert_eq!(parse_scores(&[json!(5), json!(1), json!(3), json!(4)]).unwrap(), [5, 1, 3, 4]);
        assert!(parse_scores(&[json!(5), json!(1), json!(3)]).is_err());
        assert!(parse_scores(&[json!(5), json!(1), json!(3), json!(4), json!(2)]).is_err());
        assert!(parse_scores(&[json!(0), json!(1), json!(3), json!(4)]).is_err());
        assert!(parse_scores(&[json!(6), json!(1), json!(3), json!(4)]).is_err());
        assert!(parse_scores(&[json!(4.5), json!(1), json!(3), json!(4)]).is_err());
        assert!(parse_scores(&[json!("4"), json!(1), json!(3), json!(4)]).is_err());
    }

    #[test]
    fn weighted_score_accepts_whole_numbers_only() {
        assert_eq!(whole_number(&json!(21)), Some(21));
        assert_eq!(whole_number(&json!(21.0)), Some(21));
        assert_eq!(whole_number(&json!("21")), Some(21));
        assert_eq!(whole_number(&json!(" 21.0 ")), Some(21));
        assert_eq!(whole_number(&json!(21.5)), None);
        assert_eq!(whole_number(&json!("many")), None);
        assert_eq!(whole_number(&json!([21])), None);
        assert_eq!(whole_number(&json!(1e300)), None);
    }
}
