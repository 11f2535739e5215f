//! Field elements - the on-screen representation of one field.
//!
//! A field element is a rectangle with four corner handles. It carries the
//! Model Store index of its field as a back-reference; it never owns model
//! data. Each created element also gets a unique [`ElementId`], so a host can
//! tell a freshly re-created element apart from a stale one after a page is
//! redrawn.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{PixelRect, Point};
use crate::model::ModelStore;

/// Unique identifier for one created screen element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse from the hyphenated form written to element attributes.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable field identifier: the field's index in the Model Store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(usize);

impl FieldId {
    /// Create from a Model Store index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The Model Store index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the four corner handles.
///
/// Handle indices are load-bearing: the host writes them to the handle
/// elements and reads them back on pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    /// Index 0.
    TopLeft,
    /// Index 1.
    TopRight,
    /// Index 2.
    BottomLeft,
    /// Index 3.
    BottomRight,
}

impl Corner {
    /// All corners in handle-index order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Handle index written to the element.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::TopLeft => 0,
            Self::TopRight => 1,
            Self::BottomLeft => 2,
            Self::BottomRight => 3,
        }
    }

    /// Corner for a handle index.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::TopLeft),
            1 => Some(Self::TopRight),
            2 => Some(Self::BottomLeft),
            3 => Some(Self::BottomRight),
            _ => None,
        }
    }

    /// Position of this corner on a rectangle.
    #[must_use]
    pub fn position(self, rect: PixelRect) -> Point {
        match self {
            Self::TopLeft => Point::new(rect.left, rect.top),
            Self::TopRight => Point::new(rect.right(), rect.top),
            Self::BottomLeft => Point::new(rect.left, rect.bottom()),
            Self::BottomRight => Point::new(rect.right(), rect.bottom()),
        }
    }

    /// The diagonally opposite corner.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::TopLeft => Self::BottomRight,
            Self::TopRight => Self::BottomLeft,
            Self::BottomLeft => Self::TopRight,
            Self::BottomRight => Self::TopLeft,
        }
    }

    /// Fixed point while this handle is dragged: the opposite corner.
    #[must_use]
    pub fn anchor(self, rect: PixelRect) -> Point {
        self.opposite().position(rect)
    }
}

/// A corner handle sub-element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CornerHandle {
    /// Which corner this handle sits on.
    pub corner: Corner,
}

/// The screen element of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldElement {
    /// Unique id of this element instance.
    pub id: ElementId,
    /// Model Store index this element represents.
    pub field: FieldId,
    /// Corner handles in handle-index order.
    pub corners: [CornerHandle; 4],
}

impl FieldElement {
    /// Create a detached element for the given field.
    #[must_use]
    pub fn new(field: FieldId) -> Self {
        Self::with_id(ElementId::new(), field)
    }

    /// Rebuild the element for an id read back from a host.
    #[must_use]
    pub fn with_id(id: ElementId, field: FieldId) -> Self {
        Self {
            id,
            field,
            corners: Corner::ALL.map(|corner| CornerHandle { corner }),
        }
    }
}

/// Create a field element.
///
/// Without an explicit id the element is given the next append index,
/// `store.len()`; call it that way only when the caller intends to append a
/// new field. Render sync passes the existing index instead.
#[must_use]
pub fn create_field(store: &ModelStore, field: Option<FieldId>) -> FieldElement {
    FieldElement::new(field.unwrap_or_else(|| store.next_id()))
}
