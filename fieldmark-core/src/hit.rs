//! Pointer-down classification against Model Store geometry.
//!
//! Hosts that cannot resolve a pointer-down target themselves send
//! [`PointerTarget::Unresolved`]; the engine then classifies it here. Fields
//! are checked newest first, so a newer field covering an older one's corner
//! takes the pointer. Within one field the corner handles win over its body.

use crate::element::Corner;
use crate::event::PointerTarget;
use crate::geometry::{to_pixels, Point};
use crate::layout::{ContainerMetrics, ViewerLayout};
use crate::model::ModelStore;

/// Classify a window-client point.
#[must_use]
pub fn classify<L: ViewerLayout + ?Sized>(
    layout: &L,
    container: ContainerMetrics,
    store: &ModelStore,
    client: Point,
    handle_size: f64,
) -> PointerTarget {
    let content = container.to_content(client);
    let half = handle_size / 2.0;
    for page_number in layout.page_numbers() {
        let Some(page) = layout.page(page_number) else {
            continue;
        };
        if !page.outer_rect().contains(content) {
            continue;
        }
        if !page.is_laid_out() {
            return PointerTarget::Page { page: page_number };
        }
        let local = page.content_to_local(content);
        let rects: Vec<_> = store
            .on_page(page_number)
            .map(|(id, record)| (id, to_pixels(record.properties(), page.size())))
            .collect();

        for (field, rect) in rects.iter().rev() {
            let handle = Corner::ALL.into_iter().find(|corner| {
                let at = corner.position(*rect);
                (local.x - at.x).abs() <= half && (local.y - at.y).abs() <= half
            });
            if let Some(corner) = handle {
                return PointerTarget::CornerHandle {
                    page: page_number,
                    field: *field,
                    corner,
                };
            }
            if rect.contains(local) {
                return PointerTarget::FieldBody {
                    page: page_number,
                    field: *field,
                };
            }
        }
        return PointerTarget::Page { page: page_number };
    }
    PointerTarget::Outside
}
