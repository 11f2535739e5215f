//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldResult};
use crate::model::FieldRecord;

/// Default hit slop for corner handles, in pixels.
pub const DEFAULT_HANDLE_SIZE_PX: f64 = 8.0;

/// What happens to a stream after it faults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// End the faulted drag; the stream keeps listening for the next one.
    #[default]
    AbortSession,
    /// End the faulted drag and stop the stream for the rest of the session.
    DisableStream,
}

/// Element and attribute naming used by the browser host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomConventions {
    /// Id of the scrollable viewer container.
    pub container_id: String,
    /// Selector matching every page surface.
    pub page_selector: String,
    /// Page-number attribute on each page surface.
    pub page_number_attr: String,
    /// Class of the outer field element.
    pub field_class: String,
    /// Class of the field body.
    pub field_inner_class: String,
    /// Class of the corner handles.
    pub corner_class: String,
    /// Attribute carrying the corner handle index.
    pub corner_index_attr: String,
    /// Attribute carrying the Model Store index.
    pub field_id_attr: String,
    /// Attribute carrying the element instance id.
    pub element_id_attr: String,
}

impl Default for DomConventions {
    fn default() -> Self {
        Self {
            container_id: "viewerContainer".to_string(),
            page_selector: "#viewer > .page".to_string(),
            page_number_attr: "data-page-number".to_string(),
            field_class: "fieldmark-field".to_string(),
            field_inner_class: "fieldmark-field-inner".to_string(),
            corner_class: "fieldmark-field-corner".to_string(),
            corner_index_attr: "data-fieldmark-corner-index".to_string(),
            field_id_attr: "data-fieldmark-field-id".to_string(),
            element_id_attr: "data-fieldmark-element-id".to_string(),
        }
    }
}

/// Configuration for a [`crate::FieldEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Record seeded into the Model Store when a document loads.
    pub seed_field: Option<FieldRecord>,
    /// Stream behaviour after a fault.
    pub fault_policy: FaultPolicy,
    /// Corner handle hit slop for engine-side classification.
    pub handle_size_px: f64,
    /// DOM naming for the browser host.
    pub dom: DomConventions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed_field: Some(FieldRecord::default()),
            fault_policy: FaultPolicy::default(),
            handle_size_px: DEFAULT_HANDLE_SIZE_PX,
            dom: DomConventions::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> FieldResult<Self> {
        serde_json::from_str(json).map_err(FieldError::Serialization)
    }

    /// Set the seed record.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<FieldRecord>) -> Self {
        self.seed_field = seed;
        self
    }

    /// Set the fault policy.
    #[must_use]
    pub fn with_fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }
}
