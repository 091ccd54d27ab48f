use crate::models::{Project, Vote};
use crate::voting::{max_weighted_score, score_percent, RankedResult, ResultsBoard, CRITERIA, CRITERIA_COUNT};
use std::collections::HashSet;

pub fn calculate_results(projects: &[Project], votes: &[Vote]) -> ResultsBoard {
    // Distinct voters across the whole event, not per project
    let unique_voters: HashSet<&str> = votes.iter().map(|vote| vote.voter.as_str()).collect();

    ResultsBoard {
        max: max_weighted_score(),
        total_votes: votes.len(),
        total_voters: unique_voters.len(),
        results: rank_projects(projects, votes),
    }
}

pub fn rank_projects(projects: &[Project], votes: &[Vote]) -> Vec<RankedResult> {
    let mut results: Vec<RankedResult> = projects
        .iter()
        .map(|project| {
            let project_votes: Vec<&Vote> = votes
                .iter()
                .filter(|vote| vote.project == project.name)
                .collect();
            score_project(project, &project_votes)
        })
        .collect();

    // sort_by is stable, so equal averages keep the project list order
    results.sort_by(|a, b| b.avg.partial_cmp(&a.avg).unwrap_or(std::cmp::Ordering::Equal));
    results
}

fn score_project(project: &Project, votes: &[&Vote]) -> RankedResult {
    if votes.is_empty() {
        return RankedResult {
            project: project.clone(),
            avg: 0.0,
            pct: 0,
            voters: 0,
            avgs: [0.0; CRITERIA_COUNT],
        };
    }

    let n = votes.len() as f64;
    let mut avgs = [0.0; CRITERIA_COUNT];
    for (i, slot) in avgs.iter_mut().enumerate() {
        // Summed as floats; stored cells are not range-checked
        let total: f64 = votes.iter().map(|vote| vote.scores[i] as f64).sum();
        *slot = round_tenth(total / n);
    }

    // Weighted sum over the already rounded means
    let weighted: f64 = avgs
        .iter()
        .zip(CRITERIA.iter())
        .map(|(mean, criterion)| mean * criterion.weight as f64)
        .sum();
    let avg = round_tenth(weighted);

    let voters: HashSet<&str> = votes.iter().map(|vote| vote.voter.as_str()).collect();

    RankedResult {
        project: project.clone(),
        avg,
        pct: score_percent(avg),
        voters: voters.len(),
        avgs,
    }
}

// Half-up at the first decimal; inputs are never negative
fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
