pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryRowStore;
pub use sqlite::SqliteRowStore;

pub type Row = Vec<String>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row store failure: {0}")]
    Backend(String),

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("row encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// A named collection of rows in the external store.
///
/// Row 0 of every sheet is the header; data rows start at index 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sheet {
    Projects,
    Votes,
}

const PROJECT_COLUMNS: [&str; 4] = ["name", "owner", "description", "created_at"];

const VOTE_COLUMNS: [&str; 8] = [
    "voter",
    "project",
    "score_1",
    "score_2",
    "score_3",
    "score_4",
    "weighted_score",
    "timestamp",
];

impl Sheet {
    pub fn name(&self) -> &'static str {
        match self {
            Sheet::Projects => "projects",
            Sheet::Votes => "votes",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Sheet::Projects => &PROJECT_COLUMNS,
            Sheet::Votes => &VOTE_COLUMNS,
        }
    }

    pub fn header(&self) -> Row {
        self.columns().iter().map(|c| c.to_string()).collect()
    }
}

/// Row-level access to a spreadsheet-like store.
///
/// Indices are absolute (the header is index 0). Deleting a range shifts
/// every later row up, so callers removing several ranges must go from the
/// highest index down.
#[async_trait]
pub trait RowStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    /// All rows of the sheet including the header, in row order.
    async fn read_rows(&self, sheet: Sheet) -> Result<Vec<Row>, StoreError>;

    async fn append_row(&self, sheet: Sheet, row: Row) -> Result<(), StoreError>;

    /// Removes rows `start..end`.
    async fn delete_rows(&self, sheet: Sheet, start: usize, end: usize) -> Result<(), StoreError>;

    /// Removes every row, header included.
    async fn clear(&self, sheet: Sheet) -> Result<(), StoreError>;

    /// Overwrites row 0, creating it when the sheet is empty.
    async fn write_header(&self, sheet: Sheet, header: Row) -> Result<(), StoreError>;
}
