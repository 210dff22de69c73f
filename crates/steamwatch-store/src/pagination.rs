//! Lazy walk over every page of a store listing.

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use steamwatch_core::CatalogEntry;
use tracing::debug;

use crate::{RecordStore, StoreError};

enum Cursor {
    Start,
    At(String),
    Done,
}

/// Stream every entry in the store, following page cursors until the last page.
///
/// Pages are fetched on demand. A failed page query ends the stream with that
/// error. Calling again restarts from the first page.
pub fn list_all<S>(store: &S) -> BoxStream<'_, Result<CatalogEntry, StoreError>>
where
    S: RecordStore + ?Sized,
{
    stream::try_unfold(Cursor::Start, move |cursor| async move {
        let cursor = match cursor {
            Cursor::Done => return Ok::<_, StoreError>(None),
            Cursor::Start => None,
            Cursor::At(c) => Some(c),
        };
        let page = store.query_page(cursor.as_deref()).await?;
        debug!(
            count = page.entries.len(),
            has_more = page.next_cursor.is_some(),
            "fetched store page"
        );
        let next = match page.next_cursor {
            Some(c) => Cursor::At(c),
            None => Cursor::Done,
        };
        Ok(Some((page.entries, next)))
    })
    .map_ok(|entries| stream::iter(entries.into_iter().map(Ok)))
    .try_flatten()
    .boxed()
}
