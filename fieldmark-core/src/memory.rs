//! In-memory viewer host.
//!
//! Backs [`ViewerLayout`] and [`FieldSurface`] with plain data so the engine
//! can run headless: pages are stacked vertically, and a re-render wipes the
//! elements on that page just like the browser viewer does.

use std::collections::BTreeMap;

use crate::element::{FieldElement, FieldId};
use crate::error::{FieldError, FieldResult};
use crate::geometry::{FieldProperties, PageSize};
use crate::layout::{ContainerMetrics, FieldSurface, PageMetrics, ViewerLayout};

/// An element attached to a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MountedField {
    /// The attached element.
    pub element: FieldElement,
    /// Page it is attached to.
    pub page: u32,
    /// Last applied geometry.
    pub style: Option<FieldProperties>,
}

/// Headless viewer.
#[derive(Debug, Clone, Default)]
pub struct MemoryViewer {
    container: ContainerMetrics,
    pages: BTreeMap<u32, PageMetrics>,
    mounted: BTreeMap<FieldId, MountedField>,
    attach_count: usize,
}

impl MemoryViewer {
    /// Create a viewer with no pages.
    #[must_use]
    pub fn new(container: ContainerMetrics) -> Self {
        Self {
            container,
            ..Self::default()
        }
    }

    /// Create a viewer with `count` equal pages stacked top to bottom.
    ///
    /// Every page sits `gap` pixels from the container's left edge and from
    /// its neighbours.
    #[must_use]
    pub fn stacked(count: u32, size: PageSize, gap: f64, border: f64) -> Self {
        let mut viewer = Self::default();
        let pitch = size.height + 2.0 * border + gap;
        for page_number in 1..=count {
            viewer.add_page(PageMetrics {
                page_number,
                offset_left: gap,
                offset_top: gap + f64::from(page_number - 1) * pitch,
                border,
                client_width: size.width,
                client_height: size.height,
            });
        }
        viewer
    }

    /// Insert or replace a page surface.
    pub fn add_page(&mut self, page: PageMetrics) {
        self.pages.insert(page.page_number, page);
    }

    /// Remove a page surface and every element on it.
    pub fn remove_page(&mut self, page_number: u32) -> Option<PageMetrics> {
        self.mounted.retain(|_, mounted| mounted.page != page_number);
        self.pages.remove(&page_number)
    }

    /// Change the rendered size of every page, restacking them.
    pub fn resize_pages(&mut self, size: PageSize) {
        let mut offset_top = self
            .pages
            .values()
            .next()
            .map_or(0.0, |first| first.offset_top);
        let gap = self.pages.values().next().map_or(0.0, |first| first.offset_left);
        for page in self.pages.values_mut() {
            page.offset_top = offset_top;
            page.client_width = size.width;
            page.client_height = size.height;
            offset_top += size.height + 2.0 * page.border + gap;
        }
    }

    /// Replace the container metrics.
    pub fn set_container(&mut self, container: ContainerMetrics) {
        self.container = container;
    }

    /// Set the container scroll offsets.
    pub fn set_scroll(&mut self, scroll_left: f64, scroll_top: f64) {
        self.container = self.container.with_scroll(scroll_left, scroll_top);
    }

    /// Redraw a page surface, dropping its elements.
    ///
    /// Returns the number of elements dropped.
    pub fn rerender_page(&mut self, page_number: u32) -> usize {
        let before = self.mounted.len();
        self.mounted.retain(|_, mounted| mounted.page != page_number);
        before - self.mounted.len()
    }

    /// Attach an unstyled element directly, bypassing the render sink.
    pub fn mount(&mut self, element: FieldElement, page: u32) {
        self.mounted.insert(
            element.field,
            MountedField {
                element,
                page,
                style: None,
            },
        );
    }

    /// The element mounted for a field.
    #[must_use]
    pub fn mounted(&self, field: FieldId) -> Option<&MountedField> {
        self.mounted.get(&field)
    }

    /// Elements mounted on one page, by field id.
    pub fn mounted_on(&self, page_number: u32) -> impl Iterator<Item = &MountedField> {
        self.mounted
            .values()
            .filter(move |mounted| mounted.page == page_number)
    }

    /// Number of mounted elements.
    #[must_use]
    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }

    /// Number of successful attaches so far.
    #[must_use]
    pub fn attach_count(&self) -> usize {
        self.attach_count
    }
}

impl ViewerLayout for MemoryViewer {
    fn container(&self) -> ContainerMetrics {
        self.container
    }

    fn page_numbers(&self) -> Vec<u32> {
        self.pages.keys().copied().collect()
    }

    fn page(&self, page_number: u32) -> Option<PageMetrics> {
        self.pages.get(&page_number).copied()
    }

    fn field_element(&self, field: FieldId) -> Option<FieldElement> {
        self.mounted.get(&field).map(|mounted| mounted.element)
    }
}

impl FieldSurface for MemoryViewer {
    fn is_attached(&self, element: &FieldElement) -> bool {
        self.mounted
            .get(&element.field)
            .is_some_and(|mounted| mounted.element.id == element.id)
    }

    fn attach(&mut self, element: &FieldElement, page_number: u32) -> FieldResult<()> {
        if !self.pages.contains_key(&page_number) {
            return Err(FieldError::PageNotFound(page_number));
        }
        // a field has one element; a re-created one replaces the stale one
        self.mount(*element, page_number);
        self.attach_count += 1;
        Ok(())
    }

    fn apply_style(&mut self, element: &FieldElement, props: &FieldProperties) -> FieldResult<()> {
        let mounted = self
            .mounted
            .get_mut(&element.field)
            .filter(|mounted| mounted.element.id == element.id)
            .ok_or_else(|| FieldError::Surface(format!("element {} is not attached", element.id)))?;
        mounted.style = Some(*props);
        Ok(())
    }
}
