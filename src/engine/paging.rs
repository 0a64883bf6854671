use std::{future::Future, ops::ControlFlow};

use tracing::trace;

use crate::{engine::library::Page, error::SyncResult};

/// Walks an offset-paginated collection page by page, handing every item to
/// `visit` in the order the remote returns them.
///
/// The first page's `total` fixes how many pages are requested; later totals
/// are ignored, so a collection that grows or shrinks mid-read is neither
/// chased nor allowed to end the walk early. A page may come back with fewer
/// items than requested, or none at all: the library drops entries it cannot
/// represent (local files, unavailable tracks) while they still count toward
/// `total`, and a shrunk collection yields empty trailing pages. Neither ends
/// the walk; only reaching the planned total does. `visit` returning
/// [`ControlFlow::Break`] stops immediately without fetching further pages.
///
/// Any fetch error aborts the whole read.
pub async fn read_pages<T, F, Fut, V>(page_size: u32, mut fetch: F, mut visit: V) -> SyncResult<()>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = SyncResult<Page<T>>>,
    V: FnMut(T) -> ControlFlow<()>,
{
    let page_size = page_size.max(1);
    let mut offset = 0;
    let mut planned_total: Option<u32> = None;

    loop {
        let page = fetch(offset, page_size).await?;
        let total = *planned_total.get_or_insert(page.total);
        trace!(offset, page_size, total, items = page.items.len(), "fetched page");

        for item in page.items {
            if visit(item).is_break() {
                return Ok(());
            }
        }

        offset = offset.saturating_add(page_size);
        if offset >= total {
            return Ok(());
        }
    }
}

/// Collects a whole paginated collection into memory.
pub async fn read_all<T, F, Fut>(page_size: u32, fetch: F) -> SyncResult<Vec<T>>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = SyncResult<Page<T>>>,
{
    let mut items = Vec::new();
    read_pages(page_size, fetch, |item| {
        items.push(item);
        ControlFlow::Continue(())
    })
    .await?;
    Ok(items)
}
