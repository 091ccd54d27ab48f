use crate::models::{Project, Scores, Vote};
use crate::store::{Row, RowStore, Sheet, StoreError};
use crate::voting::CRITERIA_COUNT;
use log::{info, warn};
use std::sync::Arc;

// Typed access to the project and vote sheets
pub struct Database {
    store: Arc<dyn RowStore>,
}

impl Database {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    pub fn backend_tag(&self) -> &'static str {
        self.store.backend_tag()
    }

    // Write the header of any sheet that has no rows yet
    pub async fn ensure_headers(&self) -> Result<(), StoreError> {
        for sheet in [Sheet::Projects, Sheet::Votes] {
            let rows = self.store.read_rows(sheet).await?;
            match rows.first() {
                None => {
                    info!("Writing header row for empty sheet '{}'", sheet.name());
                    self.store.write_header(sheet, sheet.header()).await?;
                }
                Some(first) if *first != sheet.header() => {
                    warn!(
                        "Sheet '{}' has unexpected header {:?}, expected {:?}",
                        sheet.name(),
                        first,
                        sheet.header()
                    );
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    pub async fn load_projects(&self) -> Result<Vec<Project>, StoreError> {
        let rows = self.store.read_rows(Sheet::Projects).await?;
        Ok(rows.iter().skip(1).map(project_from_row).collect())
    }

    pub async fn append_project(&self, project: &Project) -> Result<(), StoreError> {
        self.store.append_row(Sheet::Projects, project_to_row(project)).await
    }

    // Delete every project row with this exact name
    pub async fn delete_projects_named(&self, name: &str) -> Result<usize, StoreError> {
        self.delete_where(Sheet::Projects, |row| cell(row, 0) == name).await
    }

    pub async fn load_votes(&self) -> Result<Vec<Vote>, StoreError> {
        let rows = self.store.read_rows(Sheet::Votes).await?;
        Ok(rows.iter().skip(1).map(vote_from_row).collect())
    }

    pub async fn append_vote(&self, vote: &Vote) -> Result<(), StoreError> {
        self.store.append_row(Sheet::Votes, vote_to_row(vote)).await
    }

    pub async fn delete_votes_where<F>(&self, predicate: F) -> Result<usize, StoreError>
    where
        F: Fn(&Vote) -> bool,
    {
        self.delete_where(Sheet::Votes, |row| predicate(&vote_from_row(row))).await
    }

    // Wipe all votes and put the header back
    pub async fn clear_votes(&self) -> Result<(), StoreError> {
        self.store.clear(Sheet::Votes).await?;
        self.store.write_header(Sheet::Votes, Sheet::Votes.header()).await
    }

    // Scan the sheet and delete matching data rows, highest index first.
    // Deleting a range shifts every later row up, so going downwards keeps
    // the indices still to be deleted valid.
    async fn delete_where<F>(&self, sheet: Sheet, matches: F) -> Result<usize, StoreError>
    where
        F: Fn(&Row) -> bool,
    {
        let rows = self.store.read_rows(sheet).await?;
        let indices: Vec<usize> = rows
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, row)| matches(row))
            .map(|(i, _)| i)
            .collect();

        for (start, end) in descending_ranges(&indices) {
            self.store.delete_rows(sheet, start, end).await?;
        }

        if !indices.is_empty() {
            info!("Deleted {} row(s) from '{}'", indices.len(), sheet.name());
        }
        Ok(indices.len())
    }
}

// Group ascending row indices into half-open contiguous ranges, last range first
pub fn descending_ranges(indices: &[usize]) -> Vec<(usize, usize)> {
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for &index in indices {
        if let Some(last) = ranges.last_mut() {
            if last.1 == index {
                last.1 += 1;
                continue;
            }
        }
        ranges.push((index, index + 1));
    }
    ranges.reverse();
    ranges
}

fn cell(row: &Row, i: usize) -> &str {
    row.get(i).map(String::as_str).unwrap_or("")
}

// Leading integer of a cell, 0 when there is none
fn int_cell(row: &Row, i: usize) -> i64 {
    let text = cell(row, i).trim();
    let digits_end = text
        .char_indices()
        .find(|&(pos, c)| !(c.is_ascii_digit() || (pos == 0 && (c == '-' || c == '+'))))
        .map(|(pos, _)| pos)
        .unwrap_or(text.len());
    text[..digits_end].parse().unwrap_or(0)
}

fn project_from_row(row: &Row) -> Project {
    Project {
        name: cell(row, 0).to_string(),
        owner: cell(row, 1).to_string(),
        description: cell(row, 2).to_string(),
        created_at: cell(row, 3).to_string(),
    }
}

fn project_to_row(project: &Project) -> Row {
    vec![
        project.name.clone(),
        project.owner.clone(),
        project.description.clone(),
        project.created_at.clone(),
    ]
}

fn vote_from_row(row: &Row) -> Vote {
    let mut scores: Scores = [0; CRITERIA_COUNT];
    for (i, score) in scores.iter_mut().enumerate() {
        *score = int_cell(row, 2 + i);
    }
    Vote {
        voter: cell(row, 0).to_string(),
        project: cell(row, 1).to_string(),
        scores,
        weighted_score: int_cell(row, 2 + CRITERIA_COUNT),
        timestamp: cell(row, 3 + CRITERIA_COUNT).to_string(),
    }
}

fn vote_to_row(vote: &Vote) -> Row {
    let mut row = vec![vote.voter.clone(), vote.project.clone()];
    row.extend(vote.scores.iter().map(|s| s.to_string()));
    row.push(vote.weighted_score.to_string());
    row.push(vote.timestamp.clone());
    row
}
