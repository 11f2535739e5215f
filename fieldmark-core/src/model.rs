//! The Model Store: the ordered collection of field records.
//!
//! One store exists per document session. Insertion order is creation order
//! and a record's index is its [`FieldId`] for the whole session. Only the
//! render sink mutates the store; every other component reads it.

use serde::{Deserialize, Serialize};

use crate::element::FieldId;
use crate::error::{FieldError, FieldResult};
use crate::geometry::FieldProperties;

/// One field, positioned on a page in page percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
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
}

impl FieldRecord {
    /// Create a record on a page with the given geometry.
    #[must_use]
    pub const fn new(page_number: u32, props: FieldProperties) -> Self {
        Self {
            page_number,
            top: props.top,
            left: props.left,
            width: props.width,
            height: props.height,
        }
    }

    /// Percentage geometry of this record.
    #[must_use]
    pub const fn properties(&self) -> FieldProperties {
        FieldProperties::new(self.top, self.left, self.width, self.height)
    }

    /// Overwrite the geometry, keeping the page.
    pub fn merge(&mut self, props: FieldProperties) {
        self.top = props.top;
        self.left = props.left;
        self.width = props.width;
        self.height = props.height;
    }
}

impl Default for FieldRecord {
    /// The record seeded into a freshly loaded document.
    fn default() -> Self {
        Self::new(1, FieldProperties::new(50.0, 50.0, 10.0, 10.0))
    }
}

/// Ordered field records for one document session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelStore {
    records: Vec<FieldRecord>,
}

impl ModelStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one seed record, or empty when `None`.
    #[must_use]
    pub fn seeded(seed: Option<FieldRecord>) -> Self {
        Self {
            records: seed.into_iter().collect(),
        }
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Id the next appended field will receive.
    #[must_use]
    pub fn next_id(&self) -> FieldId {
        FieldId::new(self.records.len())
    }

    /// Whether a record exists for the id.
    #[must_use]
    pub fn contains(&self, id: FieldId) -> bool {
        id.index() < self.records.len()
    }

    /// Look up a record.
    #[must_use]
    pub fn get(&self, id: FieldId) -> Option<&FieldRecord> {
        self.records.get(id.index())
    }

    /// All records in creation order.
    #[must_use]
    pub fn records(&self) -> &[FieldRecord] {
        &self.records
    }

    /// Records paired with their ids, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &FieldRecord)> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| (FieldId::new(index), record))
    }

    /// Records on one page, paired with their ids.
    pub fn on_page(&self, page_number: u32) -> impl Iterator<Item = (FieldId, &FieldRecord)> {
        self.iter()
            .filter(move |(_, record)| record.page_number == page_number)
    }

    /// Append a record for a newly created field.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::NonContiguousAppend`] unless `id` is exactly the
    /// next free index.
    pub(crate) fn append(&mut self, id: FieldId, record: FieldRecord) -> FieldResult<()> {
        if id != self.next_id() {
            return Err(FieldError::NonContiguousAppend {
                field: id,
                expected: self.records.len(),
            });
        }
        self.records.push(record);
        Ok(())
    }

    /// Overwrite the geometry of an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::FieldNotFound`] if the record does not exist.
    pub(crate) fn merge(&mut self, id: FieldId, props: FieldProperties) -> FieldResult<()> {
        let record = self
            .records
            .get_mut(id.index())
            .ok_or(FieldError::FieldNotFound(id))?;
        record.merge(props);
        Ok(())
    }

    /// Serialize the records as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> FieldResult<String> {
        serde_json::to_string(self).map_err(FieldError::Serialization)
    }
}
