//! Record store layer: the `RecordStore` contract, paginated listing, and the
//! Notion and in-memory adapters.

mod error;
pub use error::StoreError;

mod memory;
mod notion;
mod pagination;

pub use memory::MemoryStore;
pub use notion::{NotionConfig, NotionStore};
pub use pagination::list_all;

use async_trait::async_trait;
use steamwatch_core::{CatalogEntry, EntryUpdate};

/// One page of a store listing.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub entries: Vec<CatalogEntry>,
    /// Opaque cursor for the next page; `None` on the last page.
    pub next_cursor: Option<String>,
}

/// Persistent catalog of tracked entries.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch one page. `None` starts from the first page.
    async fn query_page(&self, cursor: Option<&str>) -> Result<Page, StoreError>;

    /// Overwrite exactly the fields in `update` on the record `record_id`.
    ///
    /// Must be idempotent.
    async fn update(&self, record_id: &str, update: &EntryUpdate) -> Result<(), StoreError>;
}
