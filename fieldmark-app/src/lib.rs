//! # Fieldmark WASM Application
//!
//! Browser host for the Fieldmark field engine. It listens to the document
//! viewer's window and container events, translates them into engine input
//! events, and renders field updates as positioned `div` elements on the
//! page surfaces.
//!
//! ## Usage
//!
//! Build for WASM:
//! ```bash
//! wasm-pack build --target web fieldmark-app
//! ```
//!
//! Then construct the app before the viewer loads a document:
//! ```javascript
//! import init, { FieldmarkApp } from './pkg/fieldmark_app.js';
//!
//! await init();
//! const app = new FieldmarkApp();
//! // after the user has drawn some fields
//! console.log(app.exportTemplate(1.5));
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod dom;

use std::{cell::RefCell, rc::Rc};

use fieldmark_core::{
    export_template_json, EngineConfig, FieldEngine, InputEvent, OperationKind, Point,
    PointerTarget, StreamId,
};
use serde::Serialize;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, Element, EventTarget, MouseEvent};

pub use dom::DomViewer;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init_wasm() {
    console_error_panic_hook::set_once();
    tracing::info!("Fieldmark WASM initialized");
}

fn to_js<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Engine and host, shared by every listener.
struct AppState {
    engine: FieldEngine,
    viewer: DomViewer,
    scroll_listener: bool,
}

impl AppState {
    fn dispatch(&mut self, event: InputEvent) {
        let applied = self.engine.dispatch(event, &mut self.viewer).len();
        if applied > 0 {
            tracing::trace!(applied, "updates applied");
        }
    }

    fn on_document_loaded(&mut self) {
        if let Err(err) = self.viewer.disable_text_selection() {
            tracing::warn!(?err, "could not disable text selection");
        }
        self.dispatch(InputEvent::DocumentLoaded);
    }

    fn on_page_rendered(&mut self, event: &CustomEvent) {
        match page_number_of(&event.detail()) {
            Some(page) => self.dispatch(InputEvent::PageRendered { page }),
            None => tracing::warn!("pagerendered event without a page number"),
        }
    }

    fn on_pointer_down(&mut self, event: &MouseEvent) {
        let Some(target) = event
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok())
        else {
            return;
        };
        let target = self.viewer.resolve_target(&target);
        if target == PointerTarget::Outside {
            return;
        }
        self.dispatch(InputEvent::PointerDown {
            client: client_point(event),
            target,
        });
    }

    fn on_scroll(&mut self) {
        if let Some(container) = self.viewer.container_element() {
            self.dispatch(InputEvent::Scroll {
                scroll_left: f64::from(container.scroll_left()),
                scroll_top: f64::from(container.scroll_top()),
            });
        }
    }
}

type Shared = Rc<RefCell<AppState>>;

fn client_point(event: &MouseEvent) -> Point {
    Point::new(f64::from(event.client_x()), f64::from(event.client_y()))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn page_number_of(detail: &JsValue) -> Option<u32> {
    js_sys::Reflect::get(detail, &JsValue::from_str("pageNumber"))
        .ok()?
        .as_f64()
        .filter(|page| *page >= 1.0 && page.fract() == 0.0)
        .map(|page| page as u32)
}

fn with_state(state: &Shared, f: impl FnOnce(&mut AppState)) {
    match state.try_borrow_mut() {
        Ok(mut state) => f(&mut state),
        Err(_) => tracing::warn!("re-entrant viewer event dropped"),
    }
}

/// Register `handler` for `name` events on `target` for the page lifetime.
fn listen<E>(
    target: &EventTarget,
    name: &str,
    state: &Shared,
    handler: fn(&mut AppState, &E),
) -> Result<(), JsValue>
where
    E: FromWasmAbi + 'static,
{
    let state = Rc::clone(state);
    let callback = Closure::<dyn FnMut(E)>::new(move |event: E| {
        with_state(&state, |app| handler(app, &event));
    });
    target.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

/// The container only exists once the viewer has mounted, so its scroll
/// listener is attached on the first document load.
fn listen_for_scroll(state: &Shared) -> Result<(), JsValue> {
    let container = {
        let app = state.borrow();
        if app.scroll_listener {
            return Ok(());
        }
        app.viewer.container_element()
    };
    let Some(container) = container else {
        tracing::warn!("viewer container not found; scroll tracking disabled");
        return Ok(());
    };
    listen::<web_sys::Event>(&container, "scroll", state, |app, _| app.on_scroll())?;
    state.borrow_mut().scroll_listener = true;
    Ok(())
}

fn install_listeners(window: &web_sys::Window, state: &Shared) -> Result<(), JsValue> {
    let loaded = Rc::clone(state);
    let on_load = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
        with_state(&loaded, AppState::on_document_loaded);
        if let Err(err) = listen_for_scroll(&loaded) {
            tracing::error!(?err, "could not attach scroll listener");
        }
    });
    window.add_event_listener_with_callback("documentload", on_load.as_ref().unchecked_ref())?;
    on_load.forget();

    listen::<CustomEvent>(window, "pagerendered", state, AppState::on_page_rendered)?;
    listen::<MouseEvent>(window, "mousedown", state, AppState::on_pointer_down)?;
    listen::<MouseEvent>(window, "mousemove", state, |app, event| {
        app.dispatch(InputEvent::PointerMove {
            client: client_point(event),
        });
    })?;
    listen::<MouseEvent>(window, "mouseup", state, |app, event| {
        app.dispatch(InputEvent::PointerUp {
            client: client_point(event),
        });
    })?;
    Ok(())
}

/// Snapshot of the engine, as returned by `status()`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    loaded: bool,
    field_count: usize,
    active_drags: Vec<(StreamId, OperationKind)>,
}

/// The browser-facing Fieldmark application.
#[wasm_bindgen]
pub struct FieldmarkApp {
    state: Shared,
}

#[wasm_bindgen]
impl FieldmarkApp {
    /// Create the app and start listening to the viewer.
    ///
    /// `config_json` is an optional engine configuration; missing keys take
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or there is no
    /// window to listen on.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<FieldmarkApp, JsValue> {
        let config = match config_json {
            Some(json) => EngineConfig::from_json(&json).map_err(to_js)?,
            None => EngineConfig::default(),
        };
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))?;
        let viewer = DomViewer::new(window.clone(), config.dom.clone())?;
        let state = Rc::new(RefCell::new(AppState {
            engine: FieldEngine::new(config),
            viewer,
            scroll_listener: false,
        }));
        install_listeners(&window, &state)?;
        tracing::info!("Fieldmark listening for viewer events");
        Ok(Self { state })
    }

    /// Tell the engine that page surfaces were added or removed.
    #[wasm_bindgen(js_name = pagesChanged)]
    pub fn pages_changed(&self) {
        with_state(&self.state, |app| app.dispatch(InputEvent::PagesChanged));
    }

    /// Get the Model Store as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if no document is loaded.
    #[wasm_bindgen(js_name = getModelJson)]
    pub fn model_json(&self) -> Result<String, JsValue> {
        let app = self.state.try_borrow().map_err(to_js)?;
        let store = app
            .engine
            .store()
            .ok_or_else(|| JsValue::from_str("No document loaded"))?;
        store.to_json().map_err(to_js)
    }

    /// Export every field as a positioned template, in pixels and inches.
    ///
    /// # Errors
    ///
    /// Returns an error if no document is loaded or `scale` is not positive.
    #[wasm_bindgen(js_name = exportTemplate)]
    pub fn export_template(&self, scale: f64) -> Result<String, JsValue> {
        let app = self.state.try_borrow().map_err(to_js)?;
        let store = app
            .engine
            .store()
            .ok_or_else(|| JsValue::from_str("No document loaded"))?;
        export_template_json(store, &app.viewer, scale).map_err(to_js)
    }

    /// Number of fields in the Model Store.
    #[wasm_bindgen(js_name = fieldCount)]
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.state
            .try_borrow()
            .ok()
            .and_then(|app| app.engine.store().map(fieldmark_core::ModelStore::len))
            .unwrap_or(0)
    }

    /// Engine status as JSON: load state, field count and live drags.
    ///
    /// # Errors
    ///
    /// Returns an error if the status cannot be serialized.
    pub fn status(&self) -> Result<String, JsValue> {
        let app = self.state.try_borrow().map_err(to_js)?;
        let status = Status {
            loaded: app.engine.is_loaded(),
            field_count: app.engine.store().map_or(0, fieldmark_core::ModelStore::len),
            active_drags: app.engine.active_drags(),
        };
        serde_json::to_string(&status).map_err(to_js)
    }
}
