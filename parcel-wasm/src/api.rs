use crate::error;
use crate::host::{warn, EngineHost, JsSketch, JsView};
use crate::interop::to_js;
use parcel::engine::RawSketchEvent;
use parcel::model::ScreenPoint;
use parcel::{
    ClickOutcome, ClickStart, EditController, EventOutcome, GeometryStore, SceneBinder, SketchEvent,
    SketchEventKind,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

type Controller = EditController<JsView, JsSketch>;

#[wasm_bindgen(js_name = setPanicHook)]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Controller plus the events that arrived while it was borrowed.
///
/// Completing the sketch makes the host emit a `complete` event
/// synchronously, which re-enters `onSketchEvent` mid-dispatch.
struct Shared {
    controller: RefCell<Controller>,
    queue: RefCell<VecDeque<SketchEvent>>,
}

impl Shared {
    /// Outcome of `event` itself, or `None` when it had to be queued.
    fn dispatch(&self, event: SketchEvent) -> Option<EventOutcome> {
        let Ok(mut ctrl) = self.controller.try_borrow_mut() else {
            self.queue.borrow_mut().push_back(event);
            return None;
        };
        let outcome = ctrl.handle_event(&event);
        self.drain(&mut ctrl);
        Some(outcome)
    }

    fn drain(&self, ctrl: &mut Controller) {
        loop {
            let next = self.queue.borrow_mut().pop_front();
            match next {
                Some(ev) => {
                    ctrl.handle_event(&ev);
                }
                None => return,
            }
        }
    }
}

fn event_outcome_str(o: EventOutcome) -> &'static str {
    match o {
        EventOutcome::Ignored => "ignored",
        EventOutcome::Completed => "completed",
        EventOutcome::Ended => "ended",
        EventOutcome::Tracked(_) => "tracked",
    }
}

#[wasm_bindgen]
pub struct MapEditor {
    host: EngineHost,
    store: GeometryStore,
    shared: Option<Rc<Shared>>,
}

#[wasm_bindgen]
impl MapEditor {
    /// Editor over the built-in polygons.
    #[wasm_bindgen(constructor)]
    pub fn new(host: EngineHost) -> MapEditor {
        MapEditor { host, store: GeometryStore::default(), shared: None }
    }

    /// `{ ok: true, value: MapEditor }` or a `config` error.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(host: EngineHost, config: &str) -> JsValue {
        match GeometryStore::from_json(config) {
            Ok(store) => error::ok(MapEditor { host, store, shared: None }.into()),
            Err(e) => error::config(&e),
        }
    }

    /// Center, zoom and basemap for the host to build its view with.
    #[wasm_bindgen(js_name = mapConfig)]
    pub fn map_config(&self) -> JsValue {
        to_js(self.store.map())
    }

    /// Populate the view's layers. Call once the view is ready.
    pub fn init(&mut self) -> JsValue {
        if self.shared.is_some() {
            return error::already_initialized();
        }
        let binder = SceneBinder::initialize(JsView::new(self.host.clone()), &self.store);
        let layers = js_sys::Object::new();
        crate::interop::set_kv(&layers, "editable", &JsValue::from_f64(binder.editable_layer() as f64));
        crate::interop::set_kv(&layers, "boundary", &JsValue::from_f64(binder.boundary_layer() as f64));
        let controller = EditController::new(binder, JsSketch::new(self.host.clone()));
        self.shared = Some(Rc::new(Shared {
            controller: RefCell::new(controller),
            queue: RefCell::new(VecDeque::new()),
        }));
        error::ok(layers.into())
    }

    /// Route a view click. Resolves to `{ ok: true, value: "started" }` (or
    /// another outcome name), or to a `hit_test` error if the host rejected.
    pub fn click(&self, x: f64, y: f64) -> js_sys::Promise {
        let Some(shared) = self.shared.clone() else {
            return js_sys::Promise::resolve(&error::not_initialized());
        };
        future_to_promise(async move {
            let start = match shared.controller.try_borrow_mut() {
                Ok(mut ctrl) => ctrl.begin_click(ScreenPoint::new(x, y)),
                Err(_) => ClickStart::Debounced,
            };
            let outcome = match start {
                ClickStart::Pending(pending) => {
                    let (ticket, hit_test) = pending.into_parts();
                    let result = hit_test.await;
                    if let Err(e) = &result {
                        warn("hit-test failed", &JsValue::from_str(&e.to_string()));
                    }
                    let mut ctrl = shared.controller.borrow_mut();
                    let outcome = ctrl.finish_click(ticket, result);
                    shared.drain(&mut ctrl);
                    outcome
                }
                ClickStart::Ignored => ClickOutcome::Ignored,
                ClickStart::Debounced => ClickOutcome::Debounced,
            };
            Ok(match outcome {
                ClickOutcome::Failed(message) => error::hit_test(message),
                other => error::ok(JsValue::from_str(other.as_str())),
            })
        })
    }

    /// Shared listener for the sketch tool's `update`, `undo` and `redo` events.
    #[wasm_bindgen(js_name = onSketchEvent)]
    pub fn on_sketch_event(&self, kind: &str, event: JsValue) -> JsValue {
        let Some(shared) = &self.shared else {
            return error::not_initialized();
        };
        let kind_parsed: SketchEventKind = match kind.parse() {
            Ok(k) => k,
            Err(e) => return error::invalid_event(kind, format!("{e}")),
        };
        let raw: RawSketchEvent = if event.is_undefined() || event.is_null() {
            RawSketchEvent::default()
        } else {
            match serde_wasm_bindgen::from_value(event) {
                Ok(r) => r,
                Err(e) => return error::invalid_event(kind, e.to_string()),
            }
        };
        match shared.dispatch(SketchEvent::from_raw(kind_parsed, raw)) {
            Some(o) => error::ok(JsValue::from_str(event_outcome_str(o))),
            None => error::ok(JsValue::from_str("queued")),
        }
    }

    pub fn state(&self) -> String {
        match &self.shared {
            Some(s) => match s.controller.try_borrow() {
                Ok(ctrl) => ctrl.state().as_str().to_string(),
                Err(_) => "busy".to_string(),
            },
            None => "uninitialized".to_string(),
        }
    }

    #[wasm_bindgen(js_name = isEditing)]
    pub fn is_editing(&self) -> bool {
        self.shared
            .as_ref()
            .and_then(|s| s.controller.try_borrow().ok().map(|c| c.is_editing()))
            .unwrap_or(false)
    }
}
