//! # Fieldmark Core
//!
//! Interactive field placement over a paginated document viewer.
//! Host-agnostic; compiles to WASM for the browser viewer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  fieldmark-core                     │
//! ├─────────────────────────────────────────────────────┤
//! │  Update Streams         │  Render Sink              │
//! │  - Page draw/edit × N   │  - Append new records     │
//! │  - Move                 │  - Attach + style         │
//! │  - Render sync          │  - Merge geometry         │
//! ├─────────────────────────────────────────────────────┤
//! │  Model Store            │  Host Abstraction         │
//! │  - Percentage records   │  - ViewerLayout           │
//! │  - Template export      │  - FieldSurface           │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! [`FieldEngine`] owns one document session. Feed it [`InputEvent`]s with
//! [`FieldEngine::dispatch`], or hand it a stream via [`drive`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod drag;
pub mod draw;
pub mod driver;
pub mod element;
pub mod engine;
pub mod error;
pub mod event;
pub mod export;
pub mod geometry;
pub mod hit;
pub mod layout;
pub mod memory;
pub mod model;
pub mod movement;
pub mod render_sync;
pub mod sink;

pub use config::{DomConventions, EngineConfig, FaultPolicy};
pub use drag::{DragComposer, DragState, Finished, Sample};
pub use draw::{DrawOrigin, PageDrawStream};
pub use driver::{drive, updates};
pub use element::{create_field, Corner, CornerHandle, ElementId, FieldElement, FieldId};
pub use engine::FieldEngine;
pub use error::{FieldError, FieldResult};
pub use event::{
    FieldUpdate, InputEvent, OperationKind, OutcomeSink, PointerTarget, StreamId, StreamOutcome,
    TracingOutcomes,
};
pub use export::{export_template, export_template_json, TemplateField, CSS_PIXELS_PER_INCH};
pub use geometry::{
    clamp_position, clamped_span, to_percent, to_pixels, FieldProperties, PageSize, PixelRect,
    Point,
};
pub use layout::{
    laid_out_page, ContainerMetrics, FieldHost, FieldSurface, PageMetrics, StreamContext,
    ViewerLayout,
};
pub use memory::{MemoryViewer, MountedField};
pub use model::{FieldRecord, ModelStore};
pub use movement::{MoveOrigin, MoveStream};
pub use render_sync::RenderSync;
pub use sink::RenderSink;

/// Fieldmark core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
