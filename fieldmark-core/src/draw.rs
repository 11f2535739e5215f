//! Per-page draw and edit stream.
//!
//! Each page surface owns one of these. A pointer-down on the bare page
//! starts a creation drag anchored where the pointer went down; a
//! pointer-down on a corner handle starts a resize drag anchored at the
//! opposite corner. Either way every sample spans the anchor and the current
//! pointer, clamped to the page, and comes out as page percentages.
//!
//! Anchors are kept in container content space. Content space does not move
//! when the container scrolls, so a scroll mid-drag keeps the anchor pinned
//! to the page while the pointer's content position shifts.

use crate::drag::{DragComposer, Finished};
use crate::element::{create_field, Corner, FieldElement, FieldId};
use crate::error::{FieldError, FieldResult};
use crate::event::{FieldUpdate, OperationKind};
use crate::geometry::{clamped_span, to_percent, to_pixels, PixelRect, Point};
use crate::layout::{StreamContext, ViewerLayout};

/// Captured at pointer-down for a draw or edit drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOrigin {
    /// Fixed corner of the span, in content space.
    pub anchor: Point,
    /// Element every sample of this drag targets.
    pub element: FieldElement,
    /// Create or resize.
    pub kind: OperationKind,
}

/// Draw/edit stream of one page surface.
#[derive(Debug, Clone)]
pub struct PageDrawStream {
    page: u32,
    drag: DragComposer<DrawOrigin>,
    disabled: bool,
}

impl PageDrawStream {
    /// Create an idle stream for a page.
    #[must_use]
    pub fn new(page: u32) -> Self {
        Self {
            page,
            drag: DragComposer::new(),
            disabled: false,
        }
    }

    /// Page this stream belongs to.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Kind of the active drag, if any.
    #[must_use]
    pub fn active_kind(&self) -> Option<OperationKind> {
        self.drag.origin().map(|origin| origin.kind)
    }

    /// Whether a creation drag is in progress.
    #[must_use]
    pub fn is_creating(&self) -> bool {
        self.active_kind() == Some(OperationKind::Create)
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

    /// Start drawing a new field at the pointer.
    ///
    /// The element gets the next append index; the Model Store entry is
    /// created when the first sample reaches the render sink.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::StreamDisabled`] after an earlier fault.
    pub fn begin_create<L: ViewerLayout + ?Sized>(
        &mut self,
        client: Point,
        ctx: &StreamContext<'_, L>,
    ) -> FieldResult<FieldElement> {
        self.ensure_enabled()?;
        let element = create_field(ctx.store, None);
        let anchor = ctx.container.to_content(client);
        tracing::debug!(page = self.page, field = %element.field, "creation drag started");
        self.drag.begin(DrawOrigin {
            anchor,
            element,
            kind: OperationKind::Create,
        });
        Ok(element)
    }

    /// Start resizing `field` from one of its corner handles.
    ///
    /// # Errors
    ///
    /// Fails if the field has no Model Store entry or attached element, or if
    /// this page cannot serve as a percentage basis.
    pub fn begin_resize<L: ViewerLayout + ?Sized>(
        &mut self,
        field: FieldId,
        corner: Corner,
        ctx: &StreamContext<'_, L>,
    ) -> FieldResult<FieldElement> {
        self.ensure_enabled()?;
        let record = ctx.store.get(field).ok_or(FieldError::FieldNotFound(field))?;
        let page = ctx.page(self.page)?;
        let element = ctx
            .layout
            .field_element(field)
            .ok_or(FieldError::FieldNotFound(field))?;
        let rect = to_pixels(record.properties(), page.size());
        let anchor = page.local_to_content(corner.anchor(rect));
        tracing::debug!(page = self.page, %field, ?corner, "resize drag started");
        self.drag.begin(DrawOrigin {
            anchor,
            element,
            kind: OperationKind::Resize(corner),
        });
        Ok(element)
    }

    /// Sample a pointer-move.
    ///
    /// Returns `None` when no drag is active.
    pub fn pointer_moved<L: ViewerLayout + ?Sized>(
        &mut self,
        client: Point,
        ctx: &StreamContext<'_, L>,
    ) -> Option<FieldResult<FieldUpdate>> {
        let page = self.page;
        let sample = self.drag.pointer_moved(client)?;
        Some(compose(page, sample.origin, sample.pointer, ctx))
    }

    /// Re-sample the last pointer against new scroll offsets.
    pub fn rescroll<L: ViewerLayout + ?Sized>(
        &mut self,
        ctx: &StreamContext<'_, L>,
    ) -> Option<FieldResult<FieldUpdate>> {
        let page = self.page;
        let sample = self.drag.rescroll()?;
        Some(compose(page, sample.origin, sample.pointer, ctx))
    }

    /// End the active drag.
    pub fn release(&mut self) -> Option<Finished<DrawOrigin>> {
        self.drag.release()
    }

    /// Drop the active drag.
    pub fn abort(&mut self) -> Option<DrawOrigin> {
        self.drag.abort()
    }

    fn ensure_enabled(&self) -> FieldResult<()> {
        if self.disabled {
            Err(FieldError::StreamDisabled)
        } else {
            Ok(())
        }
    }
}

fn compose<L: ViewerLayout + ?Sized>(
    page_number: u32,
    origin: &DrawOrigin,
    pointer: Point,
    ctx: &StreamContext<'_, L>,
) -> FieldResult<FieldUpdate> {
    let page = ctx.page(page_number)?;
    let size = page.size();
    let anchor = page.content_to_local(origin.anchor);
    let current = page.content_to_local(ctx.container.to_content(pointer));
    let (left, width) = clamped_span(anchor.x, current.x, size.width);
    let (top, height) = clamped_span(anchor.y, current.y, size.height);
    Ok(FieldUpdate {
        element: origin.element,
        page: page_number,
        properties: to_percent(PixelRect::new(top, left, width, height), size),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{FieldProperties, PageSize};
    use crate::layout::ContainerMetrics;
    use crate::memory::MemoryViewer;
    use crate::model::{FieldRecord, ModelStore};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn viewer() -> MemoryViewer {
        MemoryViewer::stacked(1, PageSize::new(800.0, 600.0), 0.0, 0.0)
    }

    #[test]
    fn creation_drag_spans_anchor_and_pointer() {
        let viewer = viewer();
        let store = ModelStore::new();
        let ctx = StreamContext::new(&viewer, ContainerMetrics::default(), &store);
        let mut stream = PageDrawStream::new(1);

        let element = stream
            .begin_create(Point::new(100.0, 100.0), &ctx)
            .expect("begin");
        assert_eq!(element.field, FieldId::new(0));
        assert!(stream.is_creating());

        let update = stream
            .pointer_moved(Point::new(300.0, 250.0), &ctx)
            .expect("active")
            .expect("update");
        assert_eq!(update.element, element);
        assert!(close(update.properties.top, 100.0 / 6.0));
        assert!(close(update.properties.left, 12.5));
        assert!(close(update.properties.width, 25.0));
        assert!(close(update.properties.height, 25.0));
    }

    #[test]
    fn pointer_left_of_anchor_grows_backward() {
        let viewer = viewer();
        let store = ModelStore::new();
        let ctx = StreamContext::new(&viewer, ContainerMetrics::default(), &store);
        let mut stream = PageDrawStream::new(1);
        stream
            .begin_create(Point::new(400.0, 300.0), &ctx)
            .expect("begin");
        let update = stream
            .pointer_moved(Point::new(200.0, 150.0), &ctx)
            .expect("active")
            .expect("update");
        assert!(close(update.properties.left, 25.0));
        assert!(close(update.properties.width, 25.0));
        assert!(close(update.properties.top, 25.0));
    }

    #[test]
    fn resize_anchors_opposite_corner() {
        let mut viewer = viewer();
        let store = ModelStore::seeded(Some(FieldRecord::new(
            1,
            FieldProperties::new(50.0, 50.0, 10.0, 10.0),
        )));
        let element = FieldElement::new(FieldId::new(0));
        viewer.mount(element, 1);
        let ctx = StreamContext::new(&viewer, ContainerMetrics::default(), &store);
        let mut stream = PageDrawStream::new(1);

        stream
            .begin_resize(FieldId::new(0), Corner::TopLeft, &ctx)
            .expect("begin");
        let update = stream
            .pointer_moved(Point::new(300.0, 200.0), &ctx)
            .expect("active")
            .expect("update");
        // bottom-right stays at (480, 360)
        assert!(close(update.properties.left + update.properties.width, 60.0));
        assert!(close(update.properties.top + update.properties.height, 60.0));
        assert!(close(update.properties.left, 37.5));
    }

    #[test]
    fn resize_without_element_fails() {
        let viewer = viewer();
        let store = ModelStore::seeded(Some(FieldRecord::default()));
        let ctx = StreamContext::new(&viewer, ContainerMetrics::default(), &store);
        let mut stream = PageDrawStream::new(1);
        assert!(matches!(
            stream.begin_resize(FieldId::new(0), Corner::BottomRight, &ctx),
            Err(FieldError::FieldNotFound(_))
        ));
        assert!(stream.active_kind().is_none());
    }

    #[test]
    fn unlaid_page_fails_the_sample() {
        let viewer = MemoryViewer::stacked(1, PageSize::new(0.0, 0.0), 0.0, 0.0);
        let store = ModelStore::new();
        let ctx = StreamContext::new(&viewer, ContainerMetrics::default(), &store);
        let mut stream = PageDrawStream::new(1);
        stream
            .begin_create(Point::new(10.0, 10.0), &ctx)
            .expect("begin");
        let result = stream
            .pointer_moved(Point::new(20.0, 20.0), &ctx)
            .expect("active");
        assert!(matches!(result, Err(FieldError::PageNotLaidOut(1))));
    }

    #[test]
    fn scroll_keeps_anchor_on_page() {
        let viewer = viewer();
        let store = ModelStore::new();
        let ctx = StreamContext::new(&viewer, ContainerMetrics::default(), &store);
        let mut stream = PageDrawStream::new(1);
        stream
            .begin_create(Point::new(100.0, 100.0), &ctx)
            .expect("begin");
        stream.pointer_moved(Point::new(200.0, 200.0), &ctx);

        let scrolled = ContainerMetrics::default().with_scroll(0.0, 60.0);
        let ctx = StreamContext::new(&viewer, scrolled, &store);
        let update = stream.rescroll(&ctx).expect("active").expect("update");
        assert!(close(update.properties.top, 100.0 / 6.0));
        // pointer now sits at content y 260
        assert!(close(update.properties.height, 160.0 / 6.0));
    }

    #[test]
    fn disabled_stream_refuses_drags() {
        let viewer = viewer();
        let store = ModelStore::new();
        let ctx = StreamContext::new(&viewer, ContainerMetrics::default(), &store);
        let mut stream = PageDrawStream::new(1);
        stream.disable();
        assert!(matches!(
            stream.begin_create(Point::new(1.0, 1.0), &ctx),
            Err(FieldError::StreamDisabled)
        ));
        assert!(stream.pointer_moved(Point::new(2.0, 2.0), &ctx).is_none());
    }
}
