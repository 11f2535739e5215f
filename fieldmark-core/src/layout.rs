//! Host viewer abstraction.
//!
//! The engine never touches a windowing system directly. Hosts describe the
//! scroll container and page surfaces through [`ViewerLayout`] and apply
//! render instructions through [`FieldSurface`]. The browser host backs both
//! with DOM elements; [`crate::MemoryViewer`] backs them with plain data.

use serde::{Deserialize, Serialize};

use crate::element::{FieldElement, FieldId};
use crate::error::{FieldError, FieldResult};
use crate::geometry::{FieldProperties, PageSize, PixelRect, Point};
use crate::model::ModelStore;

/// Position and scroll state of the scrollable viewer container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerMetrics {
    /// Container left offset within the window.
    pub offset_left: f64,
    /// Container top offset within the window.
    pub offset_top: f64,
    /// Horizontal scroll of the container.
    pub scroll_left: f64,
    /// Vertical scroll of the container.
    pub scroll_top: f64,
}

impl ContainerMetrics {
    /// Map a window-client point into the container's scrolled content space.
    #[must_use]
    pub fn to_content(&self, client: Point) -> Point {
        Point {
            x: client.x - self.offset_left + self.scroll_left,
            y: client.y - self.offset_top + self.scroll_top,
        }
    }

    /// Same container with different scroll offsets.
    #[must_use]
    pub fn with_scroll(self, scroll_left: f64, scroll_top: f64) -> Self {
        Self {
            scroll_left,
            scroll_top,
            ..self
        }
    }
}

/// Placement and size of one page surface inside the container content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetrics {
    /// 1-based page number.
    pub page_number: u32,
    /// Page left offset within the container content.
    pub offset_left: f64,
    /// Page top offset within the container content.
    pub offset_top: f64,
    /// Border width around the page surface.
    pub border: f64,
    /// Rendered client width (percentage basis).
    pub client_width: f64,
    /// Rendered client height (percentage basis).
    pub client_height: f64,
}

impl PageMetrics {
    /// Client size of the page.
    #[must_use]
    pub fn size(&self) -> PageSize {
        PageSize::new(self.client_width, self.client_height)
    }

    /// Whether the page has a non-zero client size.
    #[must_use]
    pub fn is_laid_out(&self) -> bool {
        self.size().is_laid_out()
    }

    /// Map a content point into page-local pixels.
    #[must_use]
    pub fn content_to_local(&self, content: Point) -> Point {
        Point {
            x: content.x - self.offset_left - self.border,
            y: content.y - self.offset_top - self.border,
        }
    }

    /// Map a page-local point into content space.
    #[must_use]
    pub fn local_to_content(&self, local: Point) -> Point {
        Point {
            x: local.x + self.offset_left + self.border,
            y: local.y + self.offset_top + self.border,
        }
    }

    /// The page box (border included) in content space.
    #[must_use]
    pub fn outer_rect(&self) -> PixelRect {
        PixelRect::new(
            self.offset_top,
            self.offset_left,
            self.client_width + 2.0 * self.border,
            self.client_height + 2.0 * self.border,
        )
    }
}

/// Read-only queries against the hosting viewer.
pub trait ViewerLayout {
    /// Current container metrics.
    fn container(&self) -> ContainerMetrics;

    /// Page numbers of every page surface, in document order.
    fn page_numbers(&self) -> Vec<u32>;

    /// Metrics for one page surface.
    fn page(&self, page_number: u32) -> Option<PageMetrics>;

    /// The element currently attached for a field, if any.
    fn field_element(&self, field: FieldId) -> Option<FieldElement>;
}

/// Element writes applied by the render sink.
pub trait FieldSurface {
    /// Whether this exact element is attached to a page.
    fn is_attached(&self, element: &FieldElement) -> bool;

    /// Attach the element to a page surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the page surface does not exist.
    fn attach(&mut self, element: &FieldElement, page_number: u32) -> FieldResult<()>;

    /// Apply percentage geometry to an attached element.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not attached.
    fn apply_style(&mut self, element: &FieldElement, props: &FieldProperties) -> FieldResult<()>;
}

/// A complete host: layout queries plus element writes.
pub trait FieldHost: ViewerLayout + FieldSurface {}

impl<T: ViewerLayout + FieldSurface + ?Sized> FieldHost for T {}

/// Metrics of a page that can serve as a percentage basis.
///
/// # Errors
///
/// Returns [`FieldError::PageNotFound`] if the viewer has no such page and
/// [`FieldError::PageNotLaidOut`] if its client size is zero.
pub fn laid_out_page<L: ViewerLayout + ?Sized>(
    layout: &L,
    page_number: u32,
) -> FieldResult<PageMetrics> {
    let page = layout
        .page(page_number)
        .ok_or(FieldError::PageNotFound(page_number))?;
    if !page.is_laid_out() {
        return Err(FieldError::PageNotLaidOut(page_number));
    }
    Ok(page)
}

/// Read-only view handed to the update streams for one event.
pub struct StreamContext<'a, L: ?Sized> {
    /// Host layout queries.
    pub layout: &'a L,
    /// Container metrics with the latest observed scroll.
    pub container: ContainerMetrics,
    /// The session's Model Store.
    pub store: &'a ModelStore,
}

impl<'a, L: ViewerLayout + ?Sized> StreamContext<'a, L> {
    /// Bundle the pieces a stream reads.
    #[must_use]
    pub fn new(layout: &'a L, container: ContainerMetrics, store: &'a ModelStore) -> Self {
        Self {
            layout,
            container,
            store,
        }
    }

    /// See [`laid_out_page`].
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`laid_out_page`].
    pub fn page(&self, page_number: u32) -> FieldResult<PageMetrics> {
        laid_out_page(self.layout, page_number)
    }
}
