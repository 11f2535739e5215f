//! Container-wide move stream.
//!
//! A pointer-down on a field body starts a move drag. Every sample displaces
//! the field's pointer-down geometry by the cumulative pointer travel in
//! content space and clamps it onto its page; the size never changes.
//!
//! The origin is kept in page percentages and resolved against the page's
//! size at each sample, so a zoom mid-drag does not rescale the field.

use crate::drag::{DragComposer, Finished};
use crate::element::{FieldElement, FieldId};
use crate::error::{FieldError, FieldResult};
use crate::event::FieldUpdate;
use crate::geometry::{
    clamp_position, to_percent, to_pixels, FieldProperties, PixelRect, Point,
};
use crate::layout::{StreamContext, ViewerLayout};

/// Captured at pointer-down for a move drag.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOrigin {
    /// Element being moved.
    pub element: FieldElement,
    /// Page holding the field.
    pub page: u32,
    /// Field geometry at pointer-down.
    pub props: FieldProperties,
    /// Pointer position at pointer-down, content space.
    pub start: Point,
}

/// The move stream.
#[derive(Debug, Clone, Default)]
pub struct MoveStream {
    drag: DragComposer<MoveOrigin>,
    disabled: bool,
}

impl MoveStream {
    /// Create an idle move stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a move drag is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.drag.is_active()
    }

    /// Page of the field being moved.
    #[must_use]
    pub fn active_page(&self) -> Option<u32> {
        self.drag.origin().map(|origin| origin.page)
    }

    /// Whether a fault has stopped this stream.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Stop the stream for the rest of the session.
    pub fn disable(&mut self) {
        self.drag.abort();
        self.disabled = true;
    }

    /// Start moving `field`.
    ///
    /// The field's page comes from its Model Store record.
    ///
    /// # Errors
    ///
    /// Fails if the stream is disabled, the field has no record or attached
    /// element, or its page cannot serve as a percentage basis.
    pub fn begin<L: ViewerLayout + ?Sized>(
        &mut self,
        field: FieldId,
        client: Point,
        ctx: &StreamContext<'_, L>,
    ) -> FieldResult<FieldElement> {
        if self.disabled {
            return Err(FieldError::StreamDisabled);
        }
        let record = ctx.store.get(field).ok_or(FieldError::FieldNotFound(field))?;
        ctx.page(record.page_number)?;
        let element = ctx
            .layout
            .field_element(field)
            .ok_or(FieldError::FieldNotFound(field))?;
        tracing::debug!(page = record.page_number, %field, "move drag started");
        self.drag.begin(MoveOrigin {
            element,
            page: record.page_number,
            props: record.properties(),
            start: ctx.container.to_content(client),
        });
        Ok(element)
    }

    /// Sample a pointer-move.
    pub fn pointer_moved<L: ViewerLayout + ?Sized>(
        &mut self,
        client: Point,
        ctx: &StreamContext<'_, L>,
    ) -> Option<FieldResult<FieldUpdate>> {
        let sample = self.drag.pointer_moved(client)?;
        Some(compose(sample.origin, sample.pointer, ctx))
    }

    /// Re-sample the last pointer against new scroll offsets.
    pub fn rescroll<L: ViewerLayout + ?Sized>(
        &mut self,
        ctx: &StreamContext<'_, L>,
    ) -> Option<FieldResult<FieldUpdate>> {
        let sample = self.drag.rescroll()?;
        Some(compose(sample.origin, sample.pointer, ctx))
    }

    /// End the active drag.
    pub fn release(&mut self) -> Option<Finished<MoveOrigin>> {
        self.drag.release()
    }

    /// Drop the active drag.
    pub fn abort(&mut self) -> Option<MoveOrigin> {
        self.drag.abort()
    }
}

fn compose<L: ViewerLayout + ?Sized>(
    origin: &MoveOrigin,
    pointer: Point,
    ctx: &StreamContext<'_, L>,
) -> FieldResult<FieldUpdate> {
    let page = ctx.page(origin.page)?;
    let size = page.size();
    let current = ctx.container.to_content(pointer);
    let rect = to_pixels(origin.props, size);
    let left = clamp_position(
        rect.left + current.x - origin.start.x,
        rect.width,
        size.width,
    );
    let top = clamp_position(
        rect.top + current.y - origin.start.y,
        rect.height,
        size.height,
    );
    let moved = to_percent(PixelRect::new(top, left, rect.width, rect.height), size);
    Ok(FieldUpdate {
        element: origin.element,
        page: origin.page,
        properties: FieldProperties {
            width: origin.props.width,
            height: origin.props.height,
            ..moved
        },
    })
}
