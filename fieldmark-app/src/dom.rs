//! DOM-backed viewer host.
//!
//! Field elements are plain `div` trees appended to the page surfaces. All
//! host state lives in the document itself: the field index and element id
//! are written as attributes, so a page redraw that wipes its children also
//! wipes everything this host knows about them.

use fieldmark_core::{
    ContainerMetrics, Corner, DomConventions, ElementId, FieldElement, FieldError, FieldId,
    FieldProperties, FieldResult, FieldSurface, PageMetrics, PointerTarget, ViewerLayout,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, Window};

fn surface_error(context: &str, err: &JsValue) -> FieldError {
    FieldError::Surface(format!("{context}: {err:?}"))
}

/// Parse a computed CSS length such as `"9px"`.
pub(crate) fn parse_px(value: &str) -> Option<f64> {
    value.trim().trim_end_matches("px").trim().parse().ok()
}

/// Selector for one page surface.
pub(crate) fn page_selector(dom: &DomConventions, page_number: u32) -> String {
    format!(
        "{}[{}=\"{}\"]",
        dom.page_selector, dom.page_number_attr, page_number
    )
}

/// Selector for the element of one field.
pub(crate) fn field_selector(dom: &DomConventions, field: FieldId) -> String {
    format!(".{}[{}=\"{}\"]", dom.field_class, dom.field_id_attr, field)
}

/// Viewer host over the live document.
pub struct DomViewer {
    window: Window,
    document: Document,
    dom: DomConventions,
}

impl DomViewer {
    /// Create a host for the window's document.
    ///
    /// # Errors
    ///
    /// Returns an error if the window has no document.
    pub fn new(window: Window, dom: DomConventions) -> Result<Self, JsValue> {
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document object"))?;
        Ok(Self {
            window,
            document,
            dom,
        })
    }

    /// The scrollable viewer container, once the viewer has mounted it.
    #[must_use]
    pub fn container_element(&self) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(&self.dom.container_id)?
            .dyn_into::<HtmlElement>()
            .ok()
    }

    /// Stop the browser from selecting text while fields are dragged.
    ///
    /// # Errors
    ///
    /// Returns an error if the body style cannot be written.
    pub fn disable_text_selection(&self) -> Result<(), JsValue> {
        if let Some(body) = self.document.body() {
            body.style().set_property("user-select", "none")?;
        }
        Ok(())
    }

    /// Resolve what a pointer-down on `target` landed on.
    #[must_use]
    pub fn resolve_target(&self, target: &Element) -> PointerTarget {
        let Some(page) = target
            .closest(&self.dom.page_selector)
            .ok()
            .flatten()
            .and_then(|page| self.page_number_of(&page))
        else {
            return PointerTarget::Outside;
        };

        let classes = target.class_list();
        if classes.contains(&self.dom.corner_class) {
            let corner = target
                .get_attribute(&self.dom.corner_index_attr)
                .and_then(|index| index.parse::<u8>().ok())
                .and_then(Corner::from_index);
            return match (corner, self.field_id_of(target)) {
                (Some(corner), Some(field)) => PointerTarget::CornerHandle {
                    page,
                    field,
                    corner,
                },
                _ => PointerTarget::Outside,
            };
        }
        if classes.contains(&self.dom.field_inner_class) {
            return self
                .field_id_of(target)
                .map_or(PointerTarget::Outside, |field| PointerTarget::FieldBody {
                    page,
                    field,
                });
        }
        PointerTarget::Page { page }
    }

    fn page_element(&self, page_number: u32) -> Option<HtmlElement> {
        self.document
            .query_selector(&page_selector(&self.dom, page_number))
            .ok()??
            .dyn_into::<HtmlElement>()
            .ok()
    }

    fn field_node(&self, field: FieldId) -> Option<HtmlElement> {
        self.document
            .query_selector(&field_selector(&self.dom, field))
            .ok()??
            .dyn_into::<HtmlElement>()
            .ok()
    }

    fn page_number_of(&self, page: &Element) -> Option<u32> {
        page.get_attribute(&self.dom.page_number_attr)?.parse().ok()
    }

    fn field_id_of(&self, target: &Element) -> Option<FieldId> {
        let field = target
            .closest(&format!(".{}", self.dom.field_class))
            .ok()??;
        field
            .get_attribute(&self.dom.field_id_attr)?
            .parse()
            .ok()
            .map(FieldId::new)
    }

    fn element_of(&self, node: &Element) -> Option<FieldElement> {
        let field = node
            .get_attribute(&self.dom.field_id_attr)?
            .parse()
            .ok()
            .map(FieldId::new)?;
        let id = ElementId::parse(&node.get_attribute(&self.dom.element_id_attr)?)?;
        Some(FieldElement::with_id(id, field))
    }

    fn border_width(&self, page: &Element) -> f64 {
        self.window
            .get_computed_style(page)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value("border-top-width").ok())
            .and_then(|value| parse_px(&value))
            .unwrap_or(0.0)
    }

    fn build_node(&self, element: &FieldElement) -> Result<HtmlElement, JsValue> {
        let outer = self
            .document
            .create_element("div")?
            .dyn_into::<HtmlElement>()
            .map_err(JsValue::from)?;
        outer.class_list().add_1(&self.dom.field_class)?;
        outer.set_attribute(&self.dom.field_id_attr, &element.field.to_string())?;
        outer.set_attribute(&self.dom.element_id_attr, &element.id.to_string())?;
        outer.style().set_property("position", "absolute")?;

        let inner = self.document.create_element("div")?;
        inner.class_list().add_1(&self.dom.field_inner_class)?;
        for handle in &element.corners {
            let corner = self.document.create_element("div")?;
            corner.class_list().add_1(&self.dom.corner_class)?;
            corner.set_attribute(
                &self.dom.corner_index_attr,
                &handle.corner.index().to_string(),
            )?;
            inner.append_child(&corner)?;
        }
        outer.append_child(&inner)?;
        Ok(outer)
    }
}

impl ViewerLayout for DomViewer {
    fn container(&self) -> ContainerMetrics {
        self.container_element()
            .map_or_else(ContainerMetrics::default, |container| ContainerMetrics {
                offset_left: f64::from(container.offset_left()),
                offset_top: f64::from(container.offset_top()),
                scroll_left: f64::from(container.scroll_left()),
                scroll_top: f64::from(container.scroll_top()),
            })
    }

    fn page_numbers(&self) -> Vec<u32> {
        let Ok(pages) = self.document.query_selector_all(&self.dom.page_selector) else {
            return Vec::new();
        };
        (0..pages.length())
            .filter_map(|i| pages.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .filter_map(|page| self.page_number_of(&page))
            .collect()
    }

    fn page(&self, page_number: u32) -> Option<PageMetrics> {
        let page = self.page_element(page_number)?;
        Some(PageMetrics {
            page_number,
            offset_left: f64::from(page.offset_left()),
            offset_top: f64::from(page.offset_top()),
            border: self.border_width(&page),
            client_width: f64::from(page.client_width()),
            client_height: f64::from(page.client_height()),
        })
    }

    fn field_element(&self, field: FieldId) -> Option<FieldElement> {
        self.field_node(field)
            .and_then(|node| self.element_of(&node))
    }
}

impl FieldSurface for DomViewer {
    fn is_attached(&self, element: &FieldElement) -> bool {
        self.field_element(element.field)
            .is_some_and(|attached| attached.id == element.id)
    }

    fn attach(&mut self, element: &FieldElement, page_number: u32) -> FieldResult<()> {
        let page = self
            .page_element(page_number)
            .ok_or(FieldError::PageNotFound(page_number))?;
        // a field has one element; a re-created one replaces the stale one
        if let Some(stale) = self.field_node(element.field) {
            stale.remove();
        }
        let node = self
            .build_node(element)
            .map_err(|err| surface_error("build field element", &err))?;
        page.append_child(&node)
            .map_err(|err| surface_error("append field element", &err))?;
        tracing::debug!(field = %element.field, page = page_number, "field element attached");
        Ok(())
    }

    fn apply_style(&mut self, element: &FieldElement, props: &FieldProperties) -> FieldResult<()> {
        let node = self
            .field_node(element.field)
            .filter(|node| {
                self.element_of(node)
                    .is_some_and(|attached| attached.id == element.id)
            })
            .ok_or_else(|| FieldError::Surface(format!("element {} is not attached", element.id)))?;
        let style = node.style();
        for (name, value) in [
            ("top", props.top),
            ("left", props.left),
            ("width", props.width),
            ("height", props.height),
        ] {
            style
                .set_property(name, &format!("{value}%"))
                .map_err(|err| surface_error("set field style", &err))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn parses_computed_lengths() {
        assert_eq!(parse_px("9px"), Some(9.0));
        assert_eq!(parse_px(" 1.5px "), Some(1.5));
        assert_eq!(parse_px("0"), Some(0.0));
        assert_eq!(parse_px("auto"), None);
    }

    #[test]
    fn page_selector_targets_one_page() {
        let dom = DomConventions::default();
        assert_eq!(
            page_selector(&dom, 3),
            "#viewer > .page[data-page-number=\"3\"]"
        );
    }

    #[test]
    fn field_selector_uses_the_store_index() {
        let dom = DomConventions::default();
        assert_eq!(
            field_selector(&dom, FieldId::new(7)),
            ".fieldmark-field[data-fieldmark-field-id=\"7\"]"
        );
    }
}
