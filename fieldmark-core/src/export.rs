//! Template export in inches.
//!
//! Converts the Model Store into placement data for a PDF writer: pixel
//! geometry at the current viewer scale divided by points per inch, with the
//! vertical position measured up from the bottom edge of the page.

use serde::{Deserialize, Serialize};

use crate::element::FieldId;
use crate::error::{FieldError, FieldResult};
use crate::geometry::to_pixels;
use crate::layout::{laid_out_page, ViewerLayout};
use crate::model::ModelStore;

/// CSS pixels per inch at scale 1.
pub const CSS_PIXELS_PER_INCH: f64 = 96.0;

/// One exported field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateField {
    /// Model Store index.
    pub id: FieldId,
    /// 1-based page number.
    pub page_number: u32,
    /// Top offset, percent of page height.
    pub top: f64,
    /// Left offset, percent of page width.
    pub left: f64,
    /// Width, percent of page width.
    pub width: f64,
    /// Height, percent of page height.
    pub height: f64,
    /// Left edge from the page's left edge, inches.
    pub left_inches: f64,
    /// Top edge from the page's bottom edge, inches.
    pub top_inches: f64,
    /// Width in inches.
    pub width_inches: f64,
    /// Height in inches.
    pub height_inches: f64,
}

/// Export every record at the given viewer scale.
///
/// # Errors
///
/// Fails if a record's page is unknown or not laid out, or if `scale` is not
/// a positive number.
pub fn export_template<L: ViewerLayout + ?Sized>(
    store: &ModelStore,
    layout: &L,
    scale: f64,
) -> FieldResult<Vec<TemplateField>> {
    if !(scale > 0.0 && scale.is_finite()) {
        return Err(FieldError::InvalidScale(scale));
    }
    let ppi = scale * CSS_PIXELS_PER_INCH;
    store
        .iter()
        .map(|(id, record)| {
            let page = laid_out_page(layout, record.page_number)?;
            let rect = to_pixels(record.properties(), page.size());
            Ok(TemplateField {
                id,
                page_number: record.page_number,
                top: record.top,
                left: record.left,
                width: record.width,
                height: record.height,
                left_inches: rect.left / ppi,
                top_inches: (page.client_height - rect.top) / ppi,
                width_inches: rect.width / ppi,
                height_inches: rect.height / ppi,
            })
        })
        .collect()
}

/// Export to a JSON array.
///
/// # Errors
///
/// Propagates [`export_template`] errors and serialization failures.
pub fn export_template_json<L: ViewerLayout + ?Sized>(
    store: &ModelStore,
    layout: &L,
    scale: f64,
) -> FieldResult<String> {
    let fields = export_template(store, layout, scale)?;
    serde_json::to_string_pretty(&fields).map_err(FieldError::Serialization)
}
