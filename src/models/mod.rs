use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::voting::CRITERIA_COUNT;

pub type Scores = [i64; CRITERIA_COUNT];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub owner: String,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub voter: String,
    pub project: String,
    pub scores: Scores,
    pub weighted_score: i64,
    pub timestamp: String,
}

impl Project {
    pub fn new(name: String, owner: String, description: String) -> Self {
        Self {
            name,
            owner,
            description,
            created_at: now_timestamp(),
        }
    }
}

impl Vote {
    pub fn new(voter: String, project: String, scores: Scores, weighted_score: i64) -> Self {
        Self {
            voter,
            project,
            scores,
            weighted_score,
            timestamp: now_timestamp(),
        }
    }

    // True when this vote belongs to the given (voter, project) key
    pub fn is_keyed_by(&self, voter: &str, project: &str) -> bool {
        self.voter == voter && self.project == project
    }
}

// RFC 3339 in UTC with millisecond precision, e.g. 2026-02-19T10:00:00.000Z
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
