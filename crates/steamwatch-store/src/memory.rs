//! In-memory record store.

use async_trait::async_trait;
use steamwatch_core::{CatalogEntry, EntryUpdate};
use tokio::sync::Mutex;

use crate::{Page, RecordStore, StoreError};

const DEFAULT_PAGE_SIZE: usize = 100;

/// A [`RecordStore`] held in memory, paginated by offset cursors.
pub struct MemoryStore {
    entries: Mutex<Vec<CatalogEntry>>,
    page_size: usize,
}

impl MemoryStore {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self::with_page_size(entries, DEFAULT_PAGE_SIZE)
    }

    /// Create a store that returns at most `page_size` entries per page.
    pub fn with_page_size(entries: Vec<CatalogEntry>, page_size: usize) -> Self {
        Self {
            entries: Mutex::new(entries),
            page_size: page_size.max(1),
        }
    }

    /// Look up one entry by its store handle.
    pub async fn get(&self, record_id: &str) -> Option<CatalogEntry> {
        self.entries
            .lock()
            .await
            .iter()
            .find(|e| e.record_id == record_id)
            .cloned()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn query_page(&self, cursor: Option<&str>) -> Result<Page, StoreError> {
        let offset = match cursor {
            None => 0,
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| StoreError::Other(format!("invalid cursor: {c}")))?,
        };
        let entries = self.entries.lock().await;
        let end = (offset + self.page_size).min(entries.len());
        let page = entries.get(offset..end).unwrap_or_default().to_vec();
        let next_cursor = (end < entries.len()).then(|| end.to_string());
        Ok(Page {
            entries: page,
            next_cursor,
        })
    }

    async fn update(&self, record_id: &str, update: &EntryUpdate) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        let entry = entries
            .iter_mut()
            .find(|e| e.record_id == record_id)
            .ok_or_else(|| StoreError::NotFound(record_id.to_string()))?;
        update.apply_to(entry);
        Ok(())
    }
}
