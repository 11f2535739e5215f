//! The render sink: the single consumer of merged field updates.
//!
//! For every update, in this order: append a Model Store record if the
//! field is new, attach the element if it is not on its page, apply the
//! percentage geometry, and merge the geometry back into the store.

use crate::error::FieldResult;
use crate::event::FieldUpdate;
use crate::layout::FieldSurface;
use crate::model::{FieldRecord, ModelStore};

/// Applies field updates to a host surface and the Model Store.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderSink {
    applied: u64,
    created: u64,
}

impl RenderSink {
    /// Create a sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates applied so far.
    #[must_use]
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Records appended so far.
    #[must_use]
    pub fn created(&self) -> u64 {
        self.created
    }

    /// Apply one update.
    ///
    /// # Errors
    ///
    /// Fails if the update would leave a gap in the Model Store or the
    /// surface rejects the element. Nothing after the failing step runs.
    pub fn apply<S: FieldSurface + ?Sized>(
        &mut self,
        update: &FieldUpdate,
        store: &mut ModelStore,
        surface: &mut S,
    ) -> FieldResult<()> {
        let field = update.field();
        if !store.contains(field) {
            store.append(field, FieldRecord::new(update.page, update.properties))?;
            self.created += 1;
            tracing::info!(%field, page = update.page, "field created");
        }
        if !surface.is_attached(&update.element) {
            surface.attach(&update.element, update.page)?;
        }
        surface.apply_style(&update.element, &update.properties)?;
        store.merge(field, update.properties)?;
        self.applied += 1;
        Ok(())
    }
}
