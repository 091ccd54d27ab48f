use crate::store::{Row, RowStore, Sheet, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

// In-process sheets; also used by tests to inject backend failures
pub struct MemoryRowStore {
    pub sheets: Mutex<HashMap<Sheet, Vec<Row>>>,
    pub delete_calls: AtomicU64,
    pub fail_reads: Mutex<Option<Sheet>>,
    pub fail_deletes: Mutex<Option<Sheet>>,
}

impl Default for MemoryRowStore {
    fn default() -> Self {
        Self {
            sheets: Mutex::new(HashMap::new()),
            delete_calls: AtomicU64::new(0),
            fail_reads: Mutex::new(None),
            fail_deletes: Mutex::new(None),
        }
    }
}

impl MemoryRowStore {
    // Store with both headers already in place
    #[cfg(test)]
    pub fn with_headers() -> Self {
        let mut sheets = HashMap::new();
        sheets.insert(Sheet::Projects, vec![Sheet::Projects.header()]);
        sheets.insert(Sheet::Votes, vec![Sheet::Votes.header()]);
        Self {
            sheets: Mutex::new(sheets),
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub async fn rows(&self, sheet: Sheet) -> Vec<Row> {
        self.sheets.lock().await.get(&sheet).cloned().unwrap_or_default()
    }

    #[cfg(test)]
    pub async fn set_rows(&self, sheet: Sheet, rows: Vec<Row>) {
        self.sheets.lock().await.insert(sheet, rows);
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn read_rows(&self, sheet: Sheet) -> Result<Vec<Row>, StoreError> {
        if *self.fail_reads.lock().await == Some(sheet) {
            return Err(StoreError::Backend(format!("{} is unreachable", sheet.name())));
        }
        Ok(self.sheets.lock().await.get(&sheet).cloned().unwrap_or_default())
    }

    async fn append_row(&self, sheet: Sheet, row: Row) -> Result<(), StoreError> {
        self.sheets.lock().await.entry(sheet).or_default().push(row);
        Ok(())
    }

    async fn delete_rows(&self, sheet: Sheet, start: usize, end: usize) -> Result<(), StoreError> {
        self.delete_calls.fetch_add(1, Ordering::Relaxed);
        if *self.fail_deletes.lock().await == Some(sheet) {
            return Err(StoreError::Backend(format!("{} rejected the delete", sheet.name())));
        }

        let mut sheets = self.sheets.lock().await;
        let rows = sheets.entry(sheet).or_default();
        if start > end || end > rows.len() {
            return Err(StoreError::Backend(format!(
                "range {}..{} out of bounds for {} ({} rows)",
                start,
                end,
                sheet.name(),
                rows.len()
            )));
        }
        rows.drain(start..end);
        Ok(())
    }

    async fn clear(&self, sheet: Sheet) -> Result<(), StoreError> {
        self.sheets.lock().await.insert(sheet, Vec::new());
        Ok(())
    }

    async fn write_header(&self, sheet: Sheet, header: Row) -> Result<(), StoreError> {
        let mut sheets = self.sheets.lock().await;
        let rows = sheets.entry(sheet).or_default();
        if rows.is_empty() {
            rows.push(header);
        } else {
            rows[0] = header;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn delete_shifts_later_rows_up() {
        let store = MemoryRowStore::default();
        store
            .set_rows(Sheet::Projects, vec![row(&["h"]), row(&["a"]), row(&["b"]), row(&["c"])])
            .await;

        store.delete_rows(Sheet::Projects, 1, 2).await.unwrap();
        assert_eq!(store.rows(Sheet::Projects).await, vec![row(&["h"]), row(&["b"]), row(&["c"])]);
    }

    #[tokio::test]
    async fn out_of_range_delete_is_an_error() {
        let store = MemoryRowStore::with_headers();
        let err = store.delete_rows(Sheet::Votes, 1, 3).await.unwrap_err();
        assert!(err.to_string().contains("out of bounds"));
    }

    #[tokio::test]
    async fn header_write_replaces_only_first_row() {
        let store = MemoryRowStore::default();
        store.write_header(Sheet::Votes, row(&["x"])).await.unwrap();
        store.append_row(Sheet::Votes, row(&["data"])).await.unwrap();
        store.write_header(Sheet::Votes, Sheet::Votes.header()).await.unwrap();

        let rows = store.rows(Sheet::Votes).await;
        assert_eq!(rows[0], Sheet::Votes.header());
        assert_eq!(rows[1], row(&["data"]));
    }

    #[tokio::test]
    async fn injected_read_failure_is_reported() {
        let store = MemoryRowStore::with_headers();
        *store.fail_reads.lock().await = Some(Sheet::Projects);
        assert!(store.read_rows(Sheet::Projects).await.is_err());
        assert!(store.read_rows(Sheet::Votes).await.is_ok());
    }
}
