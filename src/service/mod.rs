use crate::db::Database;
use crate::error::AppError;
use crate::models::{Project, Scores, Vote};
use crate::voting::{weighted::calculate_results, weighted_score, ResultsBoard};
use log::{error, info, warn};
use tokio::sync::Mutex;

// A vote as submitted, before it gets a timestamp
#[derive(Debug, Clone)]
pub struct Ballot {
    pub voter: String,
    pub project: String,
    pub scores: Scores,
    pub weighted_score: Option<i64>,
}

pub struct VotingService {
    database: Database,
    // Serializes read-delete-append sequences within this process
    write_lock: Mutex<()>,
    reject_duplicate_projects: bool,
}

impl VotingService {
    pub fn new(database: Database, reject_duplicate_projects: bool) -> Self {
        Self {
            database,
            write_lock: Mutex::new(()),
            reject_duplicate_projects,
        }
    }

    pub fn backend_tag(&self) -> &'static str {
        self.database.backend_tag()
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        Ok(self.database.load_projects().await?)
    }

    pub async fn add_project(&self, name: String, owner: String, description: String) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;

        if self.reject_duplicate_projects {
            let existing = self.database.load_projects().await?;
            if existing.iter().any(|p| p.name == name) {
                return Err(AppError::Conflict(format!("project '{}' already exists", name)));
            }
        }

        let project = Project::new(name, owner, description);
        self.database.append_project(&project).await?;
        info!("Added project '{}' owned by '{}'", project.name, project.owner);
        Ok(())
    }

    // Delete the project rows, then every vote cast for it
    pub async fn delete_project(&self, name: &str) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;

        let removed_projects = self.database.delete_projects_named(name).await.map_err(|e| {
            error!("Deleting project rows for '{}' failed: {}", name, e);
            e
        })?;

        let removed_votes = self
            .database
            .delete_votes_where(|vote| vote.project == name)
            .await
            .map_err(|e| {
                error!(
                    "Partial cascade: removed {} project row(s) for '{}' but deleting its votes failed: {}",
                    removed_projects, name, e
                );
                e
            })?;

        info!(
            "Deleted project '{}' ({} row(s)) and {} vote(s)",
            name, removed_projects, removed_votes
        );
        Ok(())
    }

    pub async fn list_votes(&self) -> Result<Vec<Vote>, AppError> {
        Ok(self.database.load_votes().await?)
    }

    // Replace any earlier vote by the same voter for the same project
    pub async fn submit_vote(&self, ballot: Ballot) -> Result<Vote, AppError> {
        let computed = weighted_score(&ballot.scores);
        let weighted = match ballot.weighted_score {
            Some(supplied) => {
                if supplied != computed {
                    warn!(
                        "Vote by '{}' for '{}' carries weighted score {} but its scores weigh {}; storing as given",
                        ballot.voter, ballot.project, supplied, computed
                    );
                }
                supplied
            }
            None => computed,
        };

        let _guard = self.write_lock.lock().await;

        let replaced = self
            .database
            .delete_votes_where(|vote| vote.is_keyed_by(&ballot.voter, &ballot.project))
            .await?;

        let vote = Vote::new(ballot.voter, ballot.project, ballot.scores, weighted);
        self.database.append_vote(&vote).await?;

        if replaced > 0 {
            info!("Replaced {} earlier vote(s) by '{}' for '{}'", replaced, vote.voter, vote.project);
        } else {
            info!("Recorded vote by '{}' for '{}'", vote.voter, vote.project);
        }
        Ok(vote)
    }

    pub async fn clear_votes(&self) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        self.database.clear_votes().await?;
        warn!("All votes cleared");
        Ok(())
    }

    pub async fn results(&self) -> Result<ResultsBoard, AppError> {
        let projects = self.database.load_projects().await?;
        let votes = self.database.load_votes().await?;
        Ok(calculate_results(&projects, &votes))
    }
}
