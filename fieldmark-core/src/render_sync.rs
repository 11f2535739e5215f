//! Render sync: replays Model Store entries onto page surfaces.
//!
//! Page surfaces are destroyed and redrawn by the viewer (zoom, scroll
//! virtualisation), taking their field elements with them. After a page is
//! rendered every record on it is emitted again with a freshly created
//! element carrying the record's existing index, so nothing is appended.

use crate::element::{create_field, FieldId};
use crate::error::{FieldError, FieldResult};
use crate::event::FieldUpdate;
use crate::layout::{StreamContext, ViewerLayout};
use crate::model::{FieldRecord, ModelStore};

/// The render sync stream.
#[derive(Debug, Clone, Default)]
pub struct RenderSync {
    disabled: bool,
}

impl RenderSync {
    /// Create an enabled render sync stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a fault has stopped this stream.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Stop the stream for the rest of the session.
    pub fn disable(&mut self) {
        self.disabled = true;
    }

    /// Replay of every record, emitted once when a document loads.
    ///
    /// Records whose page the viewer does not know yield
    /// [`FieldError::PageNotFound`] in their slot.
    #[must_use]
    pub fn initial<L: ViewerLayout + ?Sized>(
        &self,
        ctx: &StreamContext<'_, L>,
    ) -> Vec<FieldResult<FieldUpdate>> {
        if self.disabled {
            return Vec::new();
        }
        ctx.store
            .iter()
            .map(|(id, record)| {
                if ctx.layout.page(record.page_number).is_none() {
                    Err(FieldError::PageNotFound(record.page_number))
                } else {
                    Ok(replay(ctx.store, id, record))
                }
            })
            .collect()
    }

    /// Replay of the records on one freshly rendered page.
    #[must_use]
    pub fn page_rendered<L: ViewerLayout + ?Sized>(
        &self,
        page_number: u32,
        ctx: &StreamContext<'_, L>,
    ) -> Vec<FieldResult<FieldUpdate>> {
        if self.disabled {
            return Vec::new();
        }
        if ctx.layout.page(page_number).is_none() {
            return vec![Err(FieldError::PageNotFound(page_number))];
        }
        let updates: Vec<_> = ctx
            .store
            .on_page(page_number)
            .map(|(id, record)| Ok(replay(ctx.store, id, record)))
            .collect();
        tracing::debug!(page = page_number, fields = updates.len(), "page replay");
        updates
    }
}

fn replay(store: &ModelStore, id: FieldId, record: &FieldRecord) -> FieldUpdate {
    FieldUpdate {
        element: create_field(store, Some(id)),
        page: record.page_number,
        properties: record.properties(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{FieldProperties, PageSize};
    use crate::layout::ContainerMetrics;
    use crate::memory::MemoryViewer;

    fn store() -> ModelStore {
        let mut store = ModelStore::new();
        for (i, page) in [1, 2, 1, 5].into_iter().enumerate() {
            store
                .append(
                    FieldId::new(i),
                    FieldRecord::new(page, FieldProperties::new(1.0, 2.0, 3.0, 4.0)),
                )
                .expect("append");
        }
        store
    }

    #[test]
    fn page_replay_keeps_indices() {
        let viewer = MemoryViewer::stacked(2, PageSize::new(800.0, 600.0), 10.0, 0.0);
        let store = store();
        let ctx = StreamContext::new(&viewer, ContainerMetrics::default(), &store);
        let updates: Vec<_> = RenderSync::new()
            .page_rendered(1, &ctx)
            .into_iter()
            .map(|result| result.expect("update"))
            .collect();
        let ids: Vec<_> = updates.iter().map(|u| u.field().index()).collect();
        assert_eq!(ids, vec![0, 2]);
        assert!(updates.iter().all(|u| u.page == 1));
        assert_ne!(updates[0].element.id, updates[1].element.id);
    }

    #[test]
    fn replay_creates_fresh_elements_each_time() {
        let viewer = MemoryViewer::stacked(2, PageSize::new(800.0, 600.0), 10.0, 0.0);
        let store = store();
        let ctx = StreamContext::new(&viewer, ContainerMetrics::default(), &store);
        let sync = RenderSync::new();
        let first = sync.page_rendered(2, &ctx).remove(0).expect("first");
        let second = sync.page_rendered(2, &ctx).remove(0).expect("second");
        assert_eq!(first.field(), second.field());
        assert_ne!(first.element.id, second.element.id);
        assert_eq!(first.properties, second.properties);
    }

    #[test]
    fn initial_replay_flags_missing_pages() {
        let viewer = MemoryViewer::stacked(2, PageSize::new(800.0, 600.0), 10.0, 0.0);
        let store = store();
        let ctx = StreamContext::new(&viewer, ContainerMetrics::default(), &store);
        let results = RenderSync::new().initial(&ctx);
        assert_eq!(results.len(), 4);
        assert!(results[..3].iter().all(Result::is_ok));
        assert!(matches!(results[3], Err(FieldError::PageNotFound(5))));
    }

    #[test]
    fn unknown_page_render_is_an_error() {
        let viewer = MemoryViewer::stacked(1, PageSize::new(800.0, 600.0), 10.0, 0.0);
        let store = store();
        let ctx = StreamContext::new(&viewer, ContainerMetrics::default(), &store);
        let results = RenderSync::new().page_rendered(9, &ctx);
        assert!(matches!(results.as_slice(), [Err(FieldError::PageNotFound(9))]));
    }

    #[test]
    fn disabled_sync_is_silent() {
        let viewer = MemoryViewer::stacked(1, PageSize::new(800.0, 600.0), 10.0, 0.0);
        let store = store();
        let ctx = StreamContext::new(&viewer, ContainerMetrics::default(), &store);
        let mut sync = RenderSync::new();
        sync.disable();
        assert!(sync.initial(&ctx).is_empty());
        assert!(sync.page_rendered(1, &ctx).is_empty());
    }
}
