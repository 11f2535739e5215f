//! The field engine: owns one document session and routes input events.
//!
//! ```text
//!   InputEvent ─▶ dispatch ─┬─▶ MoveStream ──────────┐
//!                           ├─▶ RenderSync ──────────┼─▶ RenderSink ─▶ host + ModelStore
//!                           └─▶ PageDrawStream × N ──┘
//! ```
//!
//! Updates produced by one event are merged in a fixed order (move, render
//! sync, then pages in ascending page order) and applied one at a time. A
//! failing update ends only the drag of the stream that produced it; the
//! outcome goes to the caller's [`OutcomeSink`].

use std::collections::{BTreeMap, BTreeSet};

use crate::config::{EngineConfig, FaultPolicy};
use crate::draw::PageDrawStream;
use crate::error::{FieldError, FieldResult};
use crate::event::{
    FieldUpdate, InputEvent, OperationKind, OutcomeSink, PointerTarget, StreamId, StreamOutcome,
    TracingOutcomes,
};
use crate::geometry::Point;
use crate::hit;
use crate::layout::{ContainerMetrics, FieldHost, StreamContext, ViewerLayout};
use crate::model::ModelStore;
use crate::movement::MoveStream;
use crate::render_sync::RenderSync;
use crate::sink::RenderSink;

/// One update produced by a stream, not yet applied.
struct Emission {
    stream: StreamId,
    kind: OperationKind,
    result: FieldResult<FieldUpdate>,
}

/// State of one loaded document.
#[derive(Debug)]
struct Session {
    store: ModelStore,
    container: ContainerMetrics,
    movement: MoveStream,
    render_sync: RenderSync,
    pages: BTreeMap<u32, PageDrawStream>,
    sink: RenderSink,
}

/// Drives field creation and editing for one viewer.
#[derive(Debug)]
pub struct FieldEngine<O: OutcomeSink = TracingOutcomes> {
    config: EngineConfig,
    session: Option<Session>,
    outcomes: O,
}

impl FieldEngine<TracingOutcomes> {
    /// Create an engine that logs stream outcomes.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_outcomes(config, TracingOutcomes)
    }
}

impl Default for FieldEngine<TracingOutcomes> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<O: OutcomeSink> FieldEngine<O> {
    /// Create an engine reporting outcomes to `outcomes`.
    #[must_use]
    pub fn with_outcomes(config: EngineConfig, outcomes: O) -> Self {
        Self {
            config,
            session: None,
            outcomes,
        }
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The outcome sink.
    #[must_use]
    pub fn outcomes(&self) -> &O {
        &self.outcomes
    }

    /// Mutable access to the outcome sink.
    pub fn outcomes_mut(&mut self) -> &mut O {
        &mut self.outcomes
    }

    /// Consume the engine, returning its outcome sink.
    #[must_use]
    pub fn into_outcomes(self) -> O {
        self.outcomes
    }

    /// Whether a document has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    /// The Model Store of the current session.
    #[must_use]
    pub fn store(&self) -> Option<&ModelStore> {
        self.session.as_ref().map(|session| &session.store)
    }

    /// Streams with an active drag, and what they are doing.
    #[must_use]
    pub fn active_drags(&self) -> Vec<(StreamId, OperationKind)> {
        let Some(session) = &self.session else {
            return Vec::new();
        };
        let mut active = Vec::new();
        if session.movement.is_active() {
            active.push((StreamId::Move, OperationKind::Move));
        }
        for (page, stream) in &session.pages {
            if let Some(kind) = stream.active_kind() {
                active.push((StreamId::Page(*page), kind));
            }
        }
        active
    }

    /// Whether a stream has been stopped by a fault.
    #[must_use]
    pub fn is_disabled(&self, stream: StreamId) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.is_disabled(stream))
    }

    /// Classify a window-client point against the current session.
    #[must_use]
    pub fn classify<L: ViewerLayout + ?Sized>(&self, layout: &L, client: Point) -> PointerTarget {
        self.session
            .as_ref()
            .map_or(PointerTarget::Outside, |session| {
                hit::classify(
                    layout,
                    session.container,
                    &session.store,
                    client,
                    self.config.handle_size_px,
                )
            })
    }

    /// Feed one input event and apply the resulting updates to `host`.
    ///
    /// Returns the updates that were applied, in application order.
    pub fn dispatch<H: FieldHost + ?Sized>(
        &mut self,
        event: InputEvent,
        host: &mut H,
    ) -> Vec<FieldUpdate> {
        if matches!(event, InputEvent::DocumentLoaded) {
            return self.load_document(host);
        }
        let Some(session) = self.session.as_mut() else {
            tracing::debug!(?event, "event ignored before document load");
            return Vec::new();
        };
        let policy = self.config.fault_policy;
        let outcomes = &mut self.outcomes;
        let emissions = match event {
            InputEvent::DocumentLoaded => Vec::new(),
            InputEvent::PagesChanged => {
                session.pages_changed(&*host, outcomes);
                Vec::new()
            }
            InputEvent::PageRendered { page } => session.page_rendered(page, &*host),
            InputEvent::PointerDown { client, target } => {
                session.pointer_down(client, target, &*host, &self.config, outcomes);
                Vec::new()
            }
            InputEvent::PointerMove { client } => session.pointer_moved(client, &*host),
            InputEvent::PointerUp { .. } => {
                session.pointer_up(outcomes);
                Vec::new()
            }
            InputEvent::Scroll {
                scroll_left,
                scroll_top,
            } => session.scrolled(scroll_left, scroll_top, &*host),
        };
        session.apply(emissions, host, policy, outcomes)
    }

    fn load_document<H: FieldHost + ?Sized>(&mut self, host: &mut H) -> Vec<FieldUpdate> {
        if let Some(previous) = self.session.take() {
            tracing::info!(fields = previous.store.len(), "document reloaded; session reset");
        }
        let mut session = Session::new(&self.config, &*host);
        tracing::info!(
            pages = session.pages.len(),
            seeded = session.store.len(),
            "document loaded"
        );
        let emissions = {
            let ctx = StreamContext::new(&*host, session.container, &session.store);
            session
                .render_sync
                .initial(&ctx)
                .into_iter()
                .map(|result| Emission {
                    stream: StreamId::RenderSync,
                    kind: OperationKind::RenderSync,
                    result,
                })
                .collect::<Vec<_>>()
        };
        let applied = session.apply(emissions, host, self.config.fault_policy, &mut self.outcomes);
        self.session = Some(session);
        applied
    }
}

fn report_replaced<O: OutcomeSink>(stream: StreamId, kind: OperationKind, outcomes: &mut O) {
    tracing::warn!(%stream, ?kind, "active drag replaced by a new pointer-down");
    outcomes.report(StreamOutcome::Abandoned { stream, kind });
}

impl Session {
    fn new<L: ViewerLayout + ?Sized>(config: &EngineConfig, layout: &L) -> Self {
        Self {
            store: ModelStore::seeded(config.seed_field),
            container: layout.container(),
            movement: MoveStream::new(),
            render_sync: RenderSync::new(),
            pages: layout
                .page_numbers()
                .into_iter()
                .map(|page| (page, PageDrawStream::new(page)))
                .collect(),
            sink: RenderSink::new(),
        }
    }

    fn is_disabled(&self, stream: StreamId) -> bool {
        match stream {
            StreamId::Move => self.movement.is_disabled(),
            StreamId::RenderSync => self.render_sync.is_disabled(),
            StreamId::Page(page) => self
                .pages
                .get(&page)
                .is_some_and(PageDrawStream::is_disabled),
        }
    }

    fn creating_page(&self) -> Option<u32> {
        self.pages
            .values()
            .find(|stream| stream.is_creating())
            .map(PageDrawStream::page)
    }

    fn pages_changed<L: ViewerLayout + ?Sized, O: OutcomeSink>(
        &mut self,
        layout: &L,
        outcomes: &mut O,
    ) {
        let current: BTreeSet<u32> = layout.page_numbers().into_iter().collect();
        let removed: Vec<u32> = self
            .pages
            .keys()
            .filter(|page| !current.contains(page))
            .copied()
            .collect();
        for page in &removed {
            if let Some(mut stream) = self.pages.remove(page) {
                if let Some(origin) = stream.abort() {
                    outcomes.report(StreamOutcome::Failed {
                        stream: StreamId::Page(*page),
                        kind: origin.kind,
                        reason: FieldError::PageNotFound(*page),
                    });
                }
            }
            if self.movement.active_page() == Some(*page) {
                self.movement.abort();
                outcomes.report(StreamOutcome::Failed {
                    stream: StreamId::Move,
                    kind: OperationKind::Move,
                    reason: FieldError::PageNotFound(*page),
                });
            }
        }
        let mut added = 0_usize;
        for page in current {
            self.pages.entry(page).or_insert_with(|| {
                added += 1;
                PageDrawStream::new(page)
            });
        }
        tracing::info!(added, removed = removed.len(), "page streams updated");
    }

    fn page_rendered<L: ViewerLayout + ?Sized>(&self, page: u32, layout: &L) -> Vec<Emission> {
        let ctx = StreamContext::new(layout, self.container, &self.store);
        self.render_sync
            .page_rendered(page, &ctx)
            .into_iter()
            .map(|result| Emission {
                stream: StreamId::RenderSync,
                kind: OperationKind::RenderSync,
                result,
            })
            .collect()
    }

    fn pointer_down<L: ViewerLayout + ?Sized, O: OutcomeSink>(
        &mut self,
        client: Point,
        target: PointerTarget,
        layout: &L,
        config: &EngineConfig,
        outcomes: &mut O,
    ) {
        let target = match target {
            PointerTarget::Unresolved => hit::classify(
                layout,
                self.container,
                &self.store,
                client,
                config.handle_size_px,
            ),
            resolved => resolved,
        };
        let ctx = StreamContext::new(layout, self.container, &self.store);
        let (stream, kind, result) = match target {
            PointerTarget::Page { page } => {
                let kind = OperationKind::Create;
                if let Some(creating) = self.creating_page() {
                    tracing::warn!(page, creating, "creation already in progress");
                    outcomes.report(StreamOutcome::Rejected {
                        stream: StreamId::Page(page),
                        kind,
                    });
                    return;
                }
                let Some(draw) = self.pages.get_mut(&page) else {
                    tracing::debug!(page, "pointer-down on a page without a stream");
                    return;
                };
                if draw.is_disabled() {
                    return;
                }
                if let Some(replaced) = draw.abort() {
                    report_replaced(StreamId::Page(page), replaced.kind, outcomes);
                }
                (
                    StreamId::Page(page),
                    kind,
                    draw.begin_create(client, &ctx).map(drop),
                )
            }
            PointerTarget::CornerHandle {
                page,
                field,
                corner,
            } => {
                let Some(draw) = self.pages.get_mut(&page) else {
                    tracing::debug!(page, "pointer-down on a page without a stream");
                    return;
                };
                if draw.is_disabled() {
                    return;
                }
                if let Some(replaced) = draw.abort() {
                    report_replaced(StreamId::Page(page), replaced.kind, outcomes);
                }
                (
                    StreamId::Page(page),
                    OperationKind::Resize(corner),
                    draw.begin_resize(field, corner, &ctx).map(drop),
                )
            }
            PointerTarget::FieldBody { field, .. } => {
                if self.movement.is_disabled() {
                    return;
                }
                if self.movement.abort().is_some() {
                    report_replaced(StreamId::Move, OperationKind::Move, outcomes);
                }
                (
                    StreamId::Move,
                    OperationKind::Move,
                    self.movement.begin(field, client, &ctx).map(drop),
                )
            }
            PointerTarget::Outside | PointerTarget::Unresolved => return,
        };
        if let Err(reason) = result {
            let outcome = self.fault(stream, kind, reason, config.fault_policy);
            outcomes.report(outcome);
        }
    }

    fn pointer_moved<L: ViewerLayout + ?Sized>(&mut self, client: Point, layout: &L) -> Vec<Emission> {
        let ctx = StreamContext::new(layout, self.container, &self.store);
        let mut emissions = Vec::new();
        if let Some(result) = self.movement.pointer_moved(client, &ctx) {
            emissions.push(Emission {
                stream: StreamId::Move,
                kind: OperationKind::Move,
                result,
            });
        }
        for (page, draw) in &mut self.pages {
            let kind = draw.active_kind();
            if let (Some(kind), Some(result)) = (kind, draw.pointer_moved(client, &ctx)) {
                emissions.push(Emission {
                    stream: StreamId::Page(*page),
                    kind,
                    result,
                });
            }
        }
        emissions
    }

    fn scrolled<L: ViewerLayout + ?Sized>(
        &mut self,
        scroll_left: f64,
        scroll_top: f64,
        layout: &L,
    ) -> Vec<Emission> {
        self.container = self.container.with_scroll(scroll_left, scroll_top);
        let ctx = StreamContext::new(layout, self.container, &self.store);
        let mut emissions = Vec::new();
        if let Some(result) = self.movement.rescroll(&ctx) {
            emissions.push(Emission {
                stream: StreamId::Move,
                kind: OperationKind::Move,
                result,
            });
        }
        for (page, draw) in &mut self.pages {
            let kind = draw.active_kind();
            if let (Some(kind), Some(result)) = (kind, draw.rescroll(&ctx)) {
                emissions.push(Emission {
                    stream: StreamId::Page(*page),
                    kind,
                    result,
                });
            }
        }
        emissions
    }

    fn pointer_up<O: OutcomeSink>(&mut self, outcomes: &mut O) {
        if let Some(finished) = self.movement.release() {
            outcomes.report(StreamOutcome::Completed {
                stream: StreamId::Move,
                kind: OperationKind::Move,
                field: finished.origin.element.field,
                updates: finished.samples,
            });
        }
        for (page, draw) in &mut self.pages {
            let Some(finished) = draw.release() else {
                continue;
            };
            let stream = StreamId::Page(*page);
            let kind = finished.origin.kind;
            // a click on the bare page never reached the Model Store
            if kind == OperationKind::Create && finished.samples == 0 {
                outcomes.report(StreamOutcome::Abandoned { stream, kind });
                continue;
            }
            outcomes.report(StreamOutcome::Completed {
                stream,
                kind,
                field: finished.origin.element.field,
                updates: finished.samples,
            });
        }
    }

    fn apply<H: FieldHost + ?Sized, O: OutcomeSink>(
        &mut self,
        emissions: Vec<Emission>,
        host: &mut H,
        policy: FaultPolicy,
        outcomes: &mut O,
    ) -> Vec<FieldUpdate> {
        let mut applied = Vec::with_capacity(emissions.len());
        for Emission {
            stream,
            kind,
            result,
        } in emissions
        {
            if self.is_disabled(stream) {
                continue;
            }
            let outcome = match result {
                Ok(update) => self
                    .sink
                    .apply(&update, &mut self.store, &mut *host)
                    .map(|()| update),
                Err(reason) => Err(reason),
            };
            match outcome {
                Ok(update) => applied.push(update),
                Err(reason) => {
                    let outcome = self.fault(stream, kind, reason, policy);
                    outcomes.report(outcome);
                }
            }
        }
        applied
    }

    fn fault(
        &mut self,
        stream: StreamId,
        kind: OperationKind,
        reason: FieldError,
        policy: FaultPolicy,
    ) -> StreamOutcome {
        let disable = policy == FaultPolicy::DisableStream;
        match stream {
            StreamId::Move => {
                if disable {
                    self.movement.disable();
                } else {
                    self.movement.abort();
                }
            }
            StreamId::RenderSync => {
                if disable {
                    self.render_sync.disable();
                }
            }
            StreamId::Page(page) => {
                if let Some(draw) = self.pages.get_mut(&page) {
                    if disable {
                        draw.disable();
                    } else {
                        draw.abort();
                    }
                }
            }
        }
        tracing::error!(%stream, ?kind, %reason, disabled = disable, "stream fault");
        StreamOutcome::Failed {
            stream,
            kind,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Corner, FieldId};
    use crate::geometry::{FieldProperties, PageSize};
    use crate::memory::MemoryViewer;
    use crate::model::FieldRecord;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn engine() -> FieldEngine<Vec<StreamOutcome>> {
        FieldEngine::with_outcomes(EngineConfig::default(), Vec::new())
    }

    fn viewer() -> MemoryViewer {
        MemoryViewer::stacked(2, PageSize::new(800.0, 600.0), 0.0, 0.0)
    }

    #[test]
    fn events_before_load_are_ignored() {
        let mut engine = engine();
        let mut viewer = viewer();
        let applied = engine.dispatch(InputEvent::pointer_down_at(10.0, 10.0), &mut viewer);
        assert!(applied.is_empty());
        assert!(!engine.is_loaded());
        assert!(engine.active_drags().is_empty());
    }

    #[test]
    fn load_seeds_and_replays() {
        let mut engine = engine();
        let mut viewer = viewer();
        let applied = engine.dispatch(InputEvent::DocumentLoaded, &mut viewer);
        assert_eq!(applied.len(), 1);
        assert_eq!(engine.store().map(ModelStore::len), Some(1));
        let mounted = viewer.mounted(FieldId::new(0)).expect("seed mounted");
        assert_eq!(
            mounted.style,
            Some(FieldProperties::new(50.0, 50.0, 10.0, 10.0))
        );
    }

    #[test]
    fn creation_appends_next_index() {
        let mut engine = engine();
        let mut viewer = viewer();
        engine.dispatch(InputEvent::DocumentLoaded, &mut viewer);
        engine.dispatch(InputEvent::pointer_down_at(100.0, 100.0), &mut viewer);
        assert_eq!(
            engine.active_drags(),
            vec![(StreamId::Page(1), OperationKind::Create)]
        );
        let applied = engine.dispatch(InputEvent::pointer_move(300.0, 250.0), &mut viewer);
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].field(), FieldId::new(1));
        engine.dispatch(InputEvent::pointer_up(300.0, 250.0), &mut viewer);

        let store = engine.store().expect("store");
        assert_eq!(store.len(), 2);
        let record = store.get(FieldId::new(1)).expect("created");
        assert!(close(record.left, 12.5));
        assert!(close(record.width, 25.0));
        assert!(matches!(
            engine.outcomes().as_slice(),
            [StreamOutcome::Completed {
                kind: OperationKind::Create,
                updates: 1,
                ..
            }]
        ));
    }

    #[test]
    fn second_creation_is_rejected_while_one_is_active() {
        let mut engine = engine();
        let mut viewer = viewer();
        engine.dispatch(InputEvent::DocumentLoaded, &mut viewer);
        engine.dispatch(InputEvent::pointer_down_at(100.0, 100.0), &mut viewer);
        engine.dispatch(
            InputEvent::PointerDown {
                client: Point::new(100.0, 700.0),
                target: PointerTarget::Page { page: 2 },
            },
            &mut viewer,
        );
        assert!(matches!(
            engine.outcomes().as_slice(),
            [StreamOutcome::Rejected {
                stream: StreamId::Page(2),
                kind: OperationKind::Create
            }]
        ));
        assert_eq!(engine.active_drags().len(), 1);
    }

    #[test]
    fn resize_from_handle_keeps_opposite_corner() {
        let mut engine = engine();
        let mut viewer = viewer();
        engine.dispatch(InputEvent::DocumentLoaded, &mut viewer);
        // seed spans x 400..480, y 300..360
        engine.dispatch(InputEvent::pointer_down_at(480.0, 360.0), &mut viewer);
        assert_eq!(
            engine.active_drags(),
            vec![(StreamId::Page(1), OperationKind::Resize(Corner::BottomRight))]
        );
        engine.dispatch(InputEvent::pointer_move(560.0, 420.0), &mut viewer);
        let record = *engine
            .store()
            .and_then(|store| store.get(FieldId::new(0)))
            .expect("seed");
        assert!(close(record.left, 50.0));
        assert!(close(record.top, 50.0));
        assert!(close(record.width, 20.0));
        assert!(close(record.height, 20.0));
    }

    #[test]
    fn resize_of_unknown_field_reports_failure() {
        let mut engine = engine();
        let mut viewer = viewer();
        engine.dispatch(InputEvent::DocumentLoaded, &mut viewer);
        engine.dispatch(
            InputEvent::PointerDown {
                client: Point::new(10.0, 10.0),
                target: PointerTarget::CornerHandle {
                    page: 1,
                    field: FieldId::new(9),
                    corner: Corner::TopLeft,
                },
            },
            &mut viewer,
        );
        assert!(matches!(
            engine.outcomes().as_slice(),
            [StreamOutcome::Failed {
                stream: StreamId::Page(1),
                reason: FieldError::FieldNotFound(_),
                ..
            }]
        ));
        assert!(!engine.is_disabled(StreamId::Page(1)));
    }

    #[test]
    fn disable_policy_stops_faulted_stream() {
        let config = EngineConfig::default().with_fault_policy(FaultPolicy::DisableStream);
        let mut engine = FieldEngine::with_outcomes(config, Vec::new());
        let mut viewer = viewer();
        engine.dispatch(InputEvent::DocumentLoaded, &mut viewer);
        engine.dispatch(
            InputEvent::PointerDown {
                client: Point::new(450.0, 330.0),
                target: PointerTarget::FieldBody {
                    page: 1,
                    field: FieldId::new(5),
                },
            },
            &mut viewer,
        );
        assert!(engine.is_disabled(StreamId::Move));
        // page streams are unaffected
        engine.dispatch(InputEvent::pointer_down_at(100.0, 100.0), &mut viewer);
        assert_eq!(
            engine.active_drags(),
            vec![(StreamId::Page(1), OperationKind::Create)]
        );
    }

    #[test]
    fn seed_on_missing_page_fails_render_sync_only() {
        let config = EngineConfig::default().with_seed(Some(FieldRecord::new(
            7,
            FieldProperties::new(1.0, 1.0, 1.0, 1.0),
        )));
        let mut engine = FieldEngine::with_outcomes(config, Vec::new());
        let mut viewer = viewer();
        let applied = engine.dispatch(InputEvent::DocumentLoaded, &mut viewer);
        assert!(applied.is_empty());
        assert!(matches!(
            engine.outcomes().as_slice(),
            [StreamOutcome::Failed {
                stream: StreamId::RenderSync,
                reason: FieldError::PageNotFound(7),
                ..
            }]
        ));
        engine.dispatch(InputEvent::pointer_down_at(100.0, 100.0), &mut viewer);
        let applied = engine.dispatch(InputEvent::pointer_move(200.0, 200.0), &mut viewer);
        assert_eq!(applied.len(), 1);
    }

    #[test]
    fn removed_page_fails_its_drag() {
        let mut engine = engine();
        let mut viewer = viewer();
        engine.dispatch(InputEvent::DocumentLoaded, &mut viewer);
        engine.dispatch(
            InputEvent::PointerDown {
                client: Point::new(100.0, 700.0),
                target: PointerTarget::Page { page: 2 },
            },
            &mut viewer,
        );
        viewer.remove_page(2);
        engine.dispatch(InputEvent::PagesChanged, &mut viewer);
        assert!(engine.active_drags().is_empty());
        assert!(matches!(
            engine.outcomes().as_slice(),
            [StreamOutcome::Failed {
                stream: StreamId::Page(2),
                kind: OperationKind::Create,
                reason: FieldError::PageNotFound(2)
            }]
        ));
    }

    #[test]
    fn missed_pointer_up_abandons_replaced_resize() {
        let mut engine = engine();
        let mut viewer = viewer();
        engine.dispatch(InputEvent::DocumentLoaded, &mut viewer);
        engine.dispatch(InputEvent::pointer_down_at(480.0, 360.0), &mut viewer);
        engine.dispatch(InputEvent::pointer_move(500.0, 380.0), &mut viewer);
        // second pointer-down on the same handle without a pointer-up
        engine.dispatch(InputEvent::pointer_down_at(500.0, 380.0), &mut viewer);
        assert!(matches!(
            engine.outcomes().as_slice(),
            [StreamOutcome::Abandoned {
                stream: StreamId::Page(1),
                kind: OperationKind::Resize(Corner::BottomRight)
            }]
        ));
        assert_eq!(
            engine.active_drags(),
            vec![(StreamId::Page(1), OperationKind::Resize(Corner::BottomRight))]
        );
    }

    #[test]
    fn missed_pointer_up_abandons_replaced_move() {
        let mut engine = engine();
        let mut viewer = viewer();
        engine.dispatch(InputEvent::DocumentLoaded, &mut viewer);
        engine.dispatch(InputEvent::pointer_down_at(440.0, 330.0), &mut viewer);
        engine.dispatch(InputEvent::pointer_down_at(440.0, 330.0), &mut viewer);
        assert!(matches!(
            engine.outcomes().as_slice(),
            [StreamOutcome::Abandoned {
                stream: StreamId::Move,
                kind: OperationKind::Move
            }]
        ));
        assert_eq!(
            engine.active_drags(),
            vec![(StreamId::Move, OperationKind::Move)]
        );
        engine.dispatch(InputEvent::pointer_up(440.0, 330.0), &mut viewer);
        assert!(matches!(
            engine.outcomes().last(),
            Some(StreamOutcome::Completed {
                kind: OperationKind::Move,
                updates: 0,
                ..
            })
        ));
    }

    #[test]
    fn reload_resets_session() {
        let mut engine = engine();
        let mut viewer = viewer();
        engine.dispatch(InputEvent::DocumentLoaded, &mut viewer);
        engine.dispatch(InputEvent::pointer_down_at(100.0, 100.0), &mut viewer);
        engine.dispatch(InputEvent::pointer_move(150.0, 150.0), &mut viewer);
        engine.dispatch(InputEvent::DocumentLoaded, &mut viewer);
        assert_eq!(engine.store().map(ModelStore::len), Some(1));
        assert!(engine.active_drags().is_empty());
    }
}
