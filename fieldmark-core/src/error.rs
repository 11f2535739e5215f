//! Error types for field operations.

use thiserror::Error;

use crate::element::FieldId;

/// Result type for field operations.
pub type FieldResult<T> = Result<T, FieldError>;

/// Errors that can occur while composing or applying field updates.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The page has no rendered client size yet, so percentages are undefined.
    #[error("Page {0} is not laid out")]
    PageNotLaidOut(u32),

    /// The page is not known to the viewer.
    #[error("Page not found: {0}")]
    PageNotFound(u32),

    /// The field has no Model Store entry or no attached element.
    #[error("Field not found: {0}")]
    FieldNotFound(FieldId),

    /// A new field id does not match the next free Model Store index.
    #[error("Field {field} cannot be appended: next free index is {expected}")]
    NonContiguousAppend {
        /// The id carried by the new field element.
        field: FieldId,
        /// The Model Store length at the time of the append.
        expected: usize,
    },

    /// The stream was disabled by an earlier fault.
    #[error("Stream disabled after an earlier fault")]
    StreamDisabled,

    /// The viewer scale is not a positive number.
    #[error("Invalid viewer scale: {0}")]
    InvalidScale(f64),

    /// The host surface refused an element operation.
    #[error("Surface error: {0}")]
    Surface(String),

    /// Model or template serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
