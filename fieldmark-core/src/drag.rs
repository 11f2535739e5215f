//! Generic drag composer.
//!
//! Turns a start event into a live sequence of samples: every pointer-move
//! produces one sample, every container scroll re-samples the last pointer
//! position against the new scroll offsets, and the next window-wide
//! pointer-release ends the sequence. Starting a new drag replaces the active
//! one. The composer knows nothing about fields or about which drags may run
//! concurrently; the page and move streams enforce those rules.
//!
//! ```text
//!            begin(origin)
//!   Idle ────────────────────▶ Active { origin, last_pointer }
//!    ▲                          │   pointer_moved → Sample
//!    │         release()        │   rescroll      → Sample (if a pointer was seen)
//!    └──────────────────────────┘
//! ```

use crate::geometry::Point;

/// State of one drag composer.
#[derive(Debug, Clone)]
pub enum DragState<O> {
    /// No drag in progress.
    Idle,
    /// Between a start event and the next pointer-release.
    Active {
        /// Payload captured when the drag started.
        origin: O,
        /// Most recent pointer position, in window-client pixels.
        last_pointer: Option<Point>,
        /// Samples produced so far.
        samples: usize,
    },
}

impl<O> Default for DragState<O> {
    fn default() -> Self {
        Self::Idle
    }
}

/// One sample of an active drag.
#[derive(Debug)]
pub struct Sample<'a, O> {
    /// Payload captured when the drag started.
    pub origin: &'a O,
    /// Pointer position, in window-client pixels.
    pub pointer: Point,
}

/// A drag that ended on pointer-release.
#[derive(Debug, Clone, PartialEq)]
pub struct Finished<O> {
    /// Payload captured when the drag started.
    pub origin: O,
    /// Samples produced during the drag.
    pub samples: usize,
}

/// Drag state machine parameterised by its origin payload.
#[derive(Debug, Clone)]
pub struct DragComposer<O> {
    state: DragState<O>,
}

impl<O> Default for DragComposer<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> DragComposer<O> {
    /// Create an idle composer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
        }
    }

    /// Whether a drag is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, DragState::Active { .. })
    }

    /// Origin of the active drag.
    #[must_use]
    pub fn origin(&self) -> Option<&O> {
        match &self.state {
            DragState::Active { origin, .. } => Some(origin),
            DragState::Idle => None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &DragState<O> {
        &self.state
    }

    /// Start a drag, replacing any active one.
    ///
    /// Returns the origin of the replaced drag.
    pub fn begin(&mut self, origin: O) -> Option<O> {
        let previous = std::mem::replace(
            &mut self.state,
            DragState::Active {
                origin,
                last_pointer: None,
                samples: 0,
            },
        );
        match previous {
            DragState::Active { origin, .. } => Some(origin),
            DragState::Idle => None,
        }
    }

    /// Record a pointer-move and sample it.
    pub fn pointer_moved(&mut self, pointer: Point) -> Option<Sample<'_, O>> {
        match &mut self.state {
            DragState::Active {
                origin,
                last_pointer,
                samples,
            } => {
                *last_pointer = Some(pointer);
                *samples += 1;
                Some(Sample { origin, pointer })
            }
            DragState::Idle => None,
        }
    }

    /// Re-sample the last pointer position after a scroll.
    ///
    /// Produces nothing until the drag has seen at least one pointer-move.
    pub fn rescroll(&mut self) -> Option<Sample<'_, O>> {
        match &mut self.state {
            DragState::Active {
                origin,
                last_pointer: Some(pointer),
                samples,
            } => {
                *samples += 1;
                Some(Sample {
                    origin,
                    pointer: *pointer,
                })
            }
            _ => None,
        }
    }

    /// End the drag on pointer-release.
    pub fn release(&mut self) -> Option<Finished<O>> {
        match std::mem::take(&mut self.state) {
            DragState::Active {
                origin, samples, ..
            } => Some(Finished { origin, samples }),
            DragState::Idle => None,
        }
    }

    /// Drop the active drag without reporting it as finished.
    pub fn abort(&mut self) -> Option<O> {
        match std::mem::take(&mut self.state) {
            DragState::Active { origin, .. } => Some(origin),
            DragState::Idle => None,
        }
    }
}
