//! Input events consumed by the engine and the updates it produces.

use serde::{Deserialize, Serialize};

use crate::element::{Corner, FieldElement, FieldId};
use crate::error::FieldError;
use crate::geometry::{FieldProperties, Point};

/// What a pointer-down landed on, resolved at the host boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerTarget {
    /// Bare page surface: starts a creation drag.
    Page {
        /// Page under the pointer.
        page: u32,
    },
    /// A field's body: starts a move drag.
    FieldBody {
        /// Page holding the field.
        page: u32,
        /// The field.
        field: FieldId,
    },
    /// A corner handle: starts a resize drag anchored at the opposite corner.
    CornerHandle {
        /// Page holding the field.
        page: u32,
        /// The field.
        field: FieldId,
        /// Which handle.
        corner: Corner,
    },
    /// Anywhere else.
    Outside,
    /// Let the engine classify by hit-testing the Model Store geometry.
    Unresolved,
}

/// All events the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// The document finished loading; starts a new session.
    DocumentLoaded,
    /// Page surfaces were added or removed.
    PagesChanged,
    /// A page surface was (re)drawn.
    PageRendered {
        /// The redrawn page.
        page: u32,
    },
    /// Pointer pressed.
    PointerDown {
        /// Window-client position.
        client: Point,
        /// What was hit.
        target: PointerTarget,
    },
    /// Pointer moved anywhere in the window.
    PointerMove {
        /// Window-client position.
        client: Point,
    },
    /// Pointer released anywhere in the window.
    PointerUp {
        /// Window-client position.
        client: Point,
    },
    /// The viewer container scrolled.
    Scroll {
        /// New horizontal scroll offset.
        scroll_left: f64,
        /// New vertical scroll offset.
        scroll_top: f64,
    },
}

impl InputEvent {
    /// Pointer-down to be classified by the engine.
    #[must_use]
    pub const fn pointer_down_at(x: f64, y: f64) -> Self {
        Self::PointerDown {
            client: Point::new(x, y),
            target: PointerTarget::Unresolved,
        }
    }

    /// Pointer-move at a client position.
    #[must_use]
    pub const fn pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove {
            client: Point::new(x, y),
        }
    }

    /// Pointer-up at a client position.
    #[must_use]
    pub const fn pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp {
            client: Point::new(x, y),
        }
    }
}

/// One render instruction: put `element` on `page` with `properties`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldUpdate {
    /// The element to attach or restyle.
    pub element: FieldElement,
    /// Page surface the element belongs on.
    pub page: u32,
    /// Percentage geometry.
    pub properties: FieldProperties,
}

impl FieldUpdate {
    /// The field this update targets.
    #[must_use]
    pub fn field(&self) -> FieldId {
        self.element.field
    }
}

/// Identifies one independently failing update stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "stream", content = "page", rename_all = "snake_case")]
pub enum StreamId {
    /// The container-wide move stream.
    Move,
    /// The render sync stream.
    RenderSync,
    /// The draw/edit stream of one page.
    Page(u32),
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Move => write!(f, "move"),
            Self::RenderSync => write!(f, "render-sync"),
            Self::Page(page) => write!(f, "page-{page}"),
        }
    }
}

/// Kind of operation a stream was performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Drawing a new field.
    Create,
    /// Resizing a field from a corner handle.
    Resize(Corner),
    /// Repositioning a field.
    Move,
    /// Replaying model entries after a render.
    RenderSync,
}

/// Result of one drag session or stream operation.
#[derive(Debug)]
pub enum StreamOutcome {
    /// A drag session ended on pointer-up.
    Completed {
        /// Stream that ran the drag.
        stream: StreamId,
        /// What the drag did.
        kind: OperationKind,
        /// Field the drag targeted.
        field: FieldId,
        /// Number of updates emitted during the drag.
        updates: usize,
    },
    /// A fault ended the operation.
    Failed {
        /// Stream that faulted.
        stream: StreamId,
        /// What the stream was doing.
        kind: OperationKind,
        /// Why it failed.
        reason: FieldError,
    },
    /// A drag ended without a result: a creation released before any
    /// pointer-move, or a drag replaced by a new pointer-down on its stream.
    Abandoned {
        /// Stream that ran the drag.
        stream: StreamId,
        /// What the drag was doing.
        kind: OperationKind,
    },
    /// A pointer-down was refused to keep field creation serialized.
    Rejected {
        /// Stream that refused.
        stream: StreamId,
        /// What the pointer-down would have started.
        kind: OperationKind,
    },
}

impl StreamOutcome {
    /// Stream the outcome belongs to.
    #[must_use]
    pub fn stream(&self) -> StreamId {
        match self {
            Self::Completed { stream, .. }
            | Self::Failed { stream, .. }
            | Self::Abandoned { stream, .. }
            | Self::Rejected { stream, .. } => *stream,
        }
    }

    /// Whether this outcome reports a fault.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Caller-supplied receiver for stream outcomes.
pub trait OutcomeSink {
    /// Receive one outcome.
    fn report(&mut self, outcome: StreamOutcome);
}

impl OutcomeSink for Vec<StreamOutcome> {
    fn report(&mut self, outcome: StreamOutcome) {
        self.push(outcome);
    }
}

/// Outcome sink that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingOutcomes;

impl OutcomeSink for TracingOutcomes {
    fn report(&mut self, outcome: StreamOutcome) {
        match outcome {
            StreamOutcome::Completed {
                stream,
                kind,
                field,
                updates,
            } => tracing::debug!(%stream, ?kind, %field, updates, "drag completed"),
            StreamOutcome::Failed {
                stream,
                kind,
                reason,
            } => tracing::error!(%stream, ?kind, %reason, "stream fault"),
            StreamOutcome::Abandoned { stream, kind } => {
                tracing::debug!(%stream, ?kind, "drag abandoned");
            }
            StreamOutcome::Rejected { stream, kind } => {
                tracing::warn!(%stream, ?kind, "pointer-down rejected");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_event_json_is_tagged() {
        let event = InputEvent::pointer_down_at(10.0, 20.0);
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains("\"type\":\"pointer_down\""));
        assert!(json.contains("\"unresolved\""));
        let back: InputEvent = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, event);
    }

    #[test]
    fn page_rendered_parses() {
        let event: InputEvent =
            serde_json::from_str(r#"{"type":"page_rendered","page":3}"#).expect("parse");
        assert_eq!(event, InputEvent::PageRendered { page: 3 });
    }

    #[test]
    fn corner_target_parses() {
        let target: PointerTarget = serde_json::from_str(
            r#"{"type":"corner_handle","page":1,"field":0,"corner":"bottom_right"}"#,
        )
        .expect("parse");
        assert_eq!(
            target,
            PointerTarget::CornerHandle {
                page: 1,
                field: FieldId::new(0),
                corner: Corner::BottomRight,
            }
        );
    }

    #[test]
    fn stream_id_display() {
        assert_eq!(StreamId::Page(4).to_string(), "page-4");
        assert_eq!(StreamId::Move.to_string(), "move");
        assert_eq!(StreamId::RenderSync.to_string(), "render-sync");
    }

    #[test]
    fn vec_sink_collects() {
        let mut sink: Vec<StreamOutcome> = Vec::new();
        sink.report(StreamOutcome::Rejected {
            stream: StreamId::Page(2),
            kind: OperationKind::Create,
        });
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].stream(), StreamId::Page(2));
        assert!(!sink[0].is_failure());
    }
}
