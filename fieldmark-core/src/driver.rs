//! Async adapters between event streams and a [`FieldEngine`].

use futures::{Stream, StreamExt};

use crate::engine::FieldEngine;
use crate::event::{FieldUpdate, InputEvent, OutcomeSink};
use crate::layout::FieldHost;

/// Dispatch every event from `events` until the stream ends.
///
/// Returns the number of updates applied.
pub async fn drive<O, H, S>(engine: &mut FieldEngine<O>, host: &mut H, mut events: S) -> usize
where
    O: OutcomeSink,
    H: FieldHost + ?Sized,
    S: Stream<Item = InputEvent> + Unpin,
{
    let mut applied = 0;
    while let Some(event) = events.next().await {
        applied += engine.dispatch(event, host).len();
    }
    tracing::debug!(applied, "event stream ended");
    applied
}

/// Turn a stream of events into the stream of applied updates.
pub fn updates<'a, O, H, S>(
    engine: &'a mut FieldEngine<O>,
    host: &'a mut H,
    mut events: S,
) -> impl Stream<Item = FieldUpdate> + 'a
where
    O: OutcomeSink + 'a,
    H: FieldHost + ?Sized + 'a,
    S: Stream<Item = InputEvent> + Unpin + 'a,
{
    async_stream::stream! {
        while let Some(event) = events.next().await {
            for update in engine.dispatch(event, host) {
                yield update;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::event::StreamOutcome;
    use crate::geometry::PageSize;
    use crate::memory::MemoryViewer;
    use crate::model::ModelStore;

    fn script() -> Vec<InputEvent> {
        vec![
            InputEvent::DocumentLoaded,
            InputEvent::pointer_down_at(100.0, 100.0),
            InputEvent::pointer_move(200.0, 200.0),
            InputEvent::pointer_move(300.0, 250.0),
            InputEvent::pointer_up(300.0, 250.0),
        ]
    }

    #[tokio::test]
    async fn drive_counts_applied_updates() {
        let mut engine = FieldEngine::with_outcomes(EngineConfig::default(), Vec::new());
        let mut viewer = MemoryViewer::stacked(1, PageSize::new(800.0, 600.0), 0.0, 0.0);
        let applied = drive(&mut engine, &mut viewer, futures::stream::iter(script())).await;
        // seed replay plus two creation samples
        assert_eq!(applied, 3);
        assert_eq!(engine.store().map(ModelStore::len), Some(2));
        assert!(matches!(
            engine.outcomes().as_slice(),
            [StreamOutcome::Completed { updates: 2, .. }]
        ));
    }

    #[tokio::test]
    async fn updates_yields_in_order() {
        let mut engine = FieldEngine::with_outcomes(EngineConfig::default(), Vec::new());
        let mut viewer = MemoryViewer::stacked(1, PageSize::new(800.0, 600.0), 0.0, 0.0);
        let fields: Vec<usize> = updates(&mut engine, &mut viewer, futures::stream::iter(script()))
            .map(|update| update.field().index())
            .collect()
            .await;
        assert_eq!(fields, vec![0, 1, 1]);
    }
}
