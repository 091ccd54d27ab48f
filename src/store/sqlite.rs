use crate::store::{Row, RowStore, Sheet, StoreError};
use async_trait::async_trait;
use sqlx::{migrate::MigrateDatabase, sqlite::{SqlitePool, SqlitePoolOptions}, Row as _, Sqlite};

// Sheets persisted in SQLite, one table row per sheet row. `position` is kept
// contiguous from 0 so range deletes behave like a spreadsheet's.
pub struct SqliteRowStore {
    pool: SqlitePool,
}

impl SqliteRowStore {
    pub async fn connect(db_url: &str) -> Result<Self, StoreError> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            Sqlite::create_database(db_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        Self::init_schema(&pool).await?;
        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sheet_rows (
                sheet TEXT NOT NULL,
                position INTEGER NOT NULL,
                cells TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sheet_rows_position ON sheet_rows(sheet, position);")
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl RowStore for SqliteRowStore {
    fn backend_tag(&self) -> &'static str {
        "sqlite"
    }

    async fn read_rows(&self, sheet: Sheet) -> Result<Vec<Row>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT cells
            FROM sheet_rows
            WHERE sheet = ?
            ORDER BY position
            "#,
        )
        .bind(sheet.name())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let cells = row.get::<String, _>("cells");
                serde_json::from_str::<Row>(&cells).map_err(StoreError::from)
            })
            .collect()
    }

    async fn append_row(&self, sheet: Sheet, row: Row) -> Result<(), StoreError> {
        let cells = serde_json::to_string(&row)?;
        sqlx::query(
            r#"
            INSERT INTO sheet_rows (sheet, position, cells)
            SELECT ?, COALESCE(MAX(position) + 1, 0), ?
            FROM sheet_rows
            WHERE sheet = ?
            "#,
        )
        .bind(sheet.name())
        .bind(cells)
        .bind(sheet.name())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_rows(&self, sheet: Sheet, start: usize, end: usize) -> Result<(), StoreError> {
        if start > end {
            return Err(StoreError::Backend(format!("invalid range {}..{}", start, end)));
        }
        let (start, end) = (start as i64, end as i64);

        let mut tx = self.pool.begin().await?;

        let count: i64 = sqlx::query("SELECT COUNT(*) FROM sheet_rows WHERE sheet = ?")
            .bind(sheet.name())
            .fetch_one(&mut *tx)
            .await?
            .get(0);
        if end > count {
            return Err(StoreError::Backend(format!(
                "range {}..{} out of bounds for {} ({} rows)",
                start,
                end,
                sheet.name(),
                count
            )));
        }

        sqlx::query("DELETE FROM sheet_rows WHERE sheet = ? AND position >= ? AND position < ?")
            .bind(sheet.name())
            .bind(start)
            .bind(end)
            .execute(&mut *tx)
            .await?;

        // Close the gap
        sqlx::query("UPDATE sheet_rows SET position = position - ? WHERE sheet = ? AND position >= ?")
            .bind(end - start)
            .bind(sheet.name())
            .bind(end)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn clear(&self, sheet: Sheet) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sheet_rows WHERE sheet = ?")
            .bind(sheet.name())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn write_header(&self, sheet: Sheet, header: Row) -> Result<(), StoreError> {
        let cells = serde_json::to_string(&header)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM sheet_rows WHERE sheet = ? AND position = 0")
            .bind(sheet.name())
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO sheet_rows (sheet, position, cells) VALUES (?, 0, ?)")
            .bind(sheet.name())
            .bind(cells)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
