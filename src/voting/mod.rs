pub mod weighted;

use serde::Serialize;

use crate::models::{Project, Scores};

pub const CRITERIA_COUNT: usize = 4;

// Lowest and highest score a voter may give on one criterion
pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 5;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Criterion {
    pub name: &'static str,
    pub description: &'static str,
    pub weight: i64,
}

pub const CRITERIA: [Criterion; CRITERIA_COUNT] = [
    Criterion {
        name: "Production Readiness",
        description: "How close is the app to a production rollout? Does it work reliably, handle errors and cope with real data?",
        weight: 3,
    },
    Criterion {
        name: "Business Value",
        description: "How much time and work does the app actually save? Nice-to-have or game changer?",
        weight: 2,
    },
    Criterion {
        name: "Solution Quality",
        description: "Is the app usable and clear? Would a colleague understand it without an explanation?",
        weight: 1,
    },
    Criterion {
        name: "Growth Potential",
        description: "Can the app be built upon? Are there further use cases or improvements?",
        weight: 1,
    },
];

pub const SCORE_LABELS: [(i64, &str); 5] = [
    (1, "Weak"),
    (2, "Below average"),
    (3, "Average"),
    (4, "Good"),
    (5, "Excellent"),
];

// Highest attainable weighted score, every criterion rated MAX_SCORE
pub fn max_weighted_score() -> i64 {
    CRITERIA.iter().map(|c| MAX_SCORE * c.weight).sum()
}

// Saturates rather than wrapping on cells read back from a hand-edited sheet
pub fn weighted_score(scores: &Scores) -> i64 {
    scores
        .iter()
        .zip(CRITERIA.iter())
        .fold(0i64, |acc, (score, criterion)| acc.saturating_add(score.saturating_mul(criterion.weight)))
}

// Share of the maximum as a whole percentage
pub fn score_percent(weighted: f64) -> i64 {
    (weighted / max_weighted_score() as f64 * 100.0).round() as i64
}

// Aggregate standing of one project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub project: Project,
    pub avg: f64,
    pub pct: i64,
    pub voters: usize,
    pub avgs: [f64; CRITERIA_COUNT],
}

// Everything the results view needs in one payload
#[derive(Debug, Clone, Serialize)]
pub struct ResultsBoard {
    pub max: i64,
    pub total_votes: usize,
    pub total_voters: usize,
    pub results: Vec<RankedResult>,
}
