//! # Fieldmark CLI
//!
//! Headless host for the Fieldmark field engine.
//!
//! A script describes a viewer (container and page surfaces) and the events
//! a browser would deliver. The runner replays it against a
//! [`MemoryViewer`] and prints the resulting Model Store, a positioned
//! template, or a full replay report.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p fieldmark-cli -- --script session.json --format template --scale 1.5
//! ```
//!
//! ## Script format
//!
//! ```json
//! {
//!   "layout": { "count": 2, "width": 800, "height": 600, "gap": 10 },
//!   "steps": [
//!     { "type": "document_loaded" },
//!     { "type": "pointer_down", "client": { "x": 100, "y": 100 }, "target": { "type": "unresolved" } },
//!     { "type": "pointer_move", "client": { "x": 300, "y": 200 } },
//!     { "type": "pointer_up", "client": { "x": 300, "y": 200 } },
//!     { "host": { "action": "remove_page", "page_number": 2 } },
//!     { "type": "pages_changed" }
//!   ]
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use fieldmark_core::{
    export_template, ContainerMetrics, EngineConfig, FieldEngine, FieldId, FieldRecord,
    InputEvent, MemoryViewer, OperationKind, PageMetrics, PageSize, StreamId, StreamOutcome,
    TemplateField, ViewerLayout,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::{wrappers::UnboundedReceiverStream, StreamExt};

/// Command-line arguments for the fieldmark runner.
#[derive(Debug, Clone, Parser)]
#[command(name = "fieldmark")]
#[command(about = "Replay a scripted viewer session and export the drawn fields")]
#[command(version)]
pub struct CliArgs {
    /// Session script (JSON)
    #[arg(long)]
    pub script: PathBuf,

    /// Engine configuration file (JSON)
    #[arg(long, env = "FIELDMARK_CONFIG")]
    pub config: Option<PathBuf>,

    /// What to print once the script has been replayed
    #[arg(long, value_enum, default_value_t = OutputFormat::Report)]
    pub format: OutputFormat,

    /// Render scale of the pages, for inch conversion
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,

    /// Write the output here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Output selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The Model Store records.
    Model,
    /// Positioned template fields in pixels and inches.
    Template,
    /// Records, stream outcomes and disabled streams.
    Report,
}

/// Equal pages stacked top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StackedLayout {
    /// Number of pages.
    pub count: u32,
    /// Page client width in pixels.
    pub width: f64,
    /// Page client height in pixels.
    pub height: f64,
    /// Spacing around pages.
    #[serde(default)]
    pub gap: f64,
    /// Page border width.
    #[serde(default)]
    pub border: f64,
}

/// A change the viewer makes on its own, outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HostAction {
    /// Add or replace a page surface.
    AddPage {
        /// The page.
        page: PageMetrics,
    },
    /// Remove a page surface and its elements.
    RemovePage {
        /// Page to remove.
        page_number: u32,
    },
    /// Re-layout every page at a new size (zoom).
    ResizePages {
        /// New client width.
        width: f64,
        /// New client height.
        height: f64,
    },
}

impl HostAction {
    fn apply(self, viewer: &mut MemoryViewer) {
        match self {
            Self::AddPage { page } => viewer.add_page(page),
            Self::RemovePage { page_number } => {
                viewer.remove_page(page_number);
            }
            Self::ResizePages { width, height } => viewer.resize_pages(PageSize::new(width, height)),
        }
    }
}

/// One script step: a viewer change or an event for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScriptStep {
    /// Change the viewer.
    Host {
        /// The change.
        host: HostAction,
    },
    /// Deliver an event.
    Event(InputEvent),
}

/// A scripted viewer session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    /// Container position and initial scroll.
    #[serde(default)]
    pub container: ContainerMetrics,
    /// Stacked page layout, used when `pages` is empty.
    #[serde(default)]
    pub layout: Option<StackedLayout>,
    /// Explicit page surfaces.
    #[serde(default)]
    pub pages: Vec<PageMetrics>,
    /// Steps in delivery order.
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl Script {
    /// Parse a script from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a valid script.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid session script")
    }

    fn viewer(&self) -> MemoryViewer {
        let mut viewer = match self.layout {
            Some(layout) if self.pages.is_empty() => MemoryViewer::stacked(
                layout.count,
                PageSize::new(layout.width, layout.height),
                layout.gap,
                layout.border,
            ),
            _ => MemoryViewer::default(),
        };
        viewer.set_container(self.container);
        for page in &self.pages {
            viewer.add_page(*page);
        }
        viewer
    }
}

/// Engine and viewer after a replay.
pub struct Replay {
    /// The engine, holding the Model Store and collected outcomes.
    pub engine: FieldEngine<Vec<StreamOutcome>>,
    /// The headless viewer in its final state.
    pub viewer: MemoryViewer,
    /// Number of updates applied.
    pub applied: usize,
}

/// Reflect an event's effect on the viewer before the engine sees it, the
/// way a browser has already redrawn or scrolled when the event fires.
fn prepare_host(event: &InputEvent, viewer: &mut MemoryViewer) {
    match *event {
        InputEvent::PageRendered { page } => {
            let dropped = viewer.rerender_page(page);
            tracing::debug!(page, dropped, "page surface redrawn");
        }
        InputEvent::Scroll {
            scroll_left,
            scroll_top,
        } => viewer.set_scroll(scroll_left, scroll_top),
        _ => {}
    }
}

/// Replay a script against a fresh engine.
///
/// Steps are fed through a channel so the engine consumes them as a stream,
/// exactly as it would consume live viewer events.
///
/// # Errors
///
/// Returns an error if the step producer task fails.
pub async fn replay(config: EngineConfig, script: Script) -> anyhow::Result<Replay> {
    let mut viewer = script.viewer();
    let steps = script.steps;
    tracing::info!(
        pages = viewer.page_numbers().len(),
        steps = steps.len(),
        "replaying session"
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let producer = tokio::spawn(async move {
        for step in steps {
            if tx.send(step).is_err() {
                break;
            }
        }
    });

    let mut engine = FieldEngine::with_outcomes(config, Vec::new());
    let mut applied = 0;
    let mut stream = UnboundedReceiverStream::new(rx);
    while let Some(step) = stream.next().await {
        match step {
            ScriptStep::Host { host } => host.apply(&mut viewer),
            ScriptStep::Event(event) => {
                prepare_host(&event, &mut viewer);
                applied += engine.dispatch(event, &mut viewer).len();
            }
        }
    }
    producer.await.context("script producer failed")?;

    tracing::info!(applied, "session replayed");
    Ok(Replay {
        engine,
        viewer,
        applied,
    })
}

/// Serializable view of one stream outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeSummary {
    /// `completed`, `failed`, `abandoned` or `rejected`.
    pub status: &'static str,
    /// Stream the outcome belongs to.
    pub stream: StreamId,
    /// What the stream was doing.
    pub kind: OperationKind,
    /// Field of a completed drag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldId>,
    /// Updates emitted by a completed drag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updates: Option<usize>,
    /// Failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&StreamOutcome> for OutcomeSummary {
    fn from(outcome: &StreamOutcome) -> Self {
        match outcome {
            StreamOutcome::Completed {
                stream,
                kind,
                field,
                updates,
            } => Self {
                status: "completed",
                stream: *stream,
                kind: *kind,
                field: Some(*field),
                updates: Some(*updates),
                reason: None,
            },
            StreamOutcome::Failed {
                stream,
                kind,
                reason,
            } => Self {
                status: "failed",
                stream: *stream,
                kind: *kind,
                field: None,
                updates: None,
                reason: Some(reason.to_string()),
            },
            StreamOutcome::Abandoned { stream, kind } => Self {
                status: "abandoned",
                stream: *stream,
                kind: *kind,
                field: None,
                updates: None,
                reason: None,
            },
            StreamOutcome::Rejected { stream, kind } => Self {
                status: "rejected",
                stream: *stream,
                kind: *kind,
                field: None,
                updates: None,
                reason: None,
            },
        }
    }
}

/// Full replay report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Updates applied.
    pub applied: usize,
    /// Model Store records in index order.
    pub fields: Vec<FieldRecord>,
    /// Stream outcomes in the order they were reported.
    pub outcomes: Vec<OutcomeSummary>,
    /// Streams a fault disabled.
    pub disabled_streams: Vec<StreamId>,
    /// Drags still open when the script ended.
    pub open_drags: Vec<(StreamId, OperationKind)>,
}

impl Replay {
    /// Build the report for this replay.
    #[must_use]
    pub fn report(&self) -> Report {
        let streams = [StreamId::Move, StreamId::RenderSync]
            .into_iter()
            .chain(self.viewer.page_numbers().into_iter().map(StreamId::Page));
        Report {
            applied: self.applied,
            fields: self
                .engine
                .store()
                .map(|store| store.records().to_vec())
                .unwrap_or_default(),
            outcomes: self.engine.outcomes().iter().map(OutcomeSummary::from).collect(),
            disabled_streams: streams
                .filter(|stream| self.engine.is_disabled(*stream))
                .collect(),
            open_drags: self.engine.active_drags(),
        }
    }

    /// Positioned template of every field.
    ///
    /// # Errors
    ///
    /// Returns an error if no document was loaded or the scale is invalid.
    pub fn template(&self, scale: f64) -> anyhow::Result<Vec<TemplateField>> {
        let store = self
            .engine
            .store()
            .context("the script never loaded a document")?;
        Ok(export_template(store, &self.viewer, scale)?)
    }

    /// Render the replay in the requested format.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected output cannot be produced.
    pub fn render(&self, format: OutputFormat, scale: f64) -> anyhow::Result<String> {
        let json = match format {
            OutputFormat::Model => {
                let store = self
                    .engine
                    .store()
                    .context("the script never loaded a document")?;
                serde_json::to_string_pretty(store)?
            }
            OutputFormat::Template => serde_json::to_string_pretty(&self.template(scale)?)?,
            OutputFormat::Report => serde_json::to_string_pretty(&self.report())?,
        };
        Ok(json)
    }
}

/// Load the configuration and script named by `args`, replay and render.
///
/// # Errors
///
/// Returns an error if a file cannot be read or parsed, or the output cannot
/// be produced.
pub async fn run(args: &CliArgs) -> anyhow::Result<String> {
    let config = match &args.config {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading config {}", path.display()))?;
            EngineConfig::from_json(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    let json = tokio::fs::read_to_string(&args.script)
        .await
        .with_context(|| format!("reading script {}", args.script.display()))?;
    let script = Script::from_json(&json)?;
    replay(config, script).await?.render(args.format, args.scale)
}
