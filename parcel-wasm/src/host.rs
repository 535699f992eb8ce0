//! Adapters from a JavaScript map host to the engine traits.

use crate::interop::{host_graphics, to_js};
use parcel::engine::{HitResult, SketchTool, UpdateOptions, View};
use parcel::layers::Layer;
use parcel::model::{Graphic, GraphicId, LayerId, ScreenPoint, SpatialReference};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::console;

#[wasm_bindgen]
extern "C" {
    /// Object wrapping the host's map view and sketch tool.
    #[derive(Clone)]
    pub type EngineHost;

    #[wasm_bindgen(method, catch, js_name = spatialReference)]
    fn spatial_reference(this: &EngineHost) -> Result<Option<u32>, JsValue>;
    #[wasm_bindgen(method, catch, js_name = addLayer)]
    fn add_layer(this: &EngineHost, id: u32, title: &str, z_index: i32) -> Result<(), JsValue>;
    #[wasm_bindgen(method, catch, js_name = addGraphics)]
    fn add_graphics(this: &EngineHost, layer_id: u32, graphics: JsValue) -> Result<(), JsValue>;
    #[wasm_bindgen(method, catch, js_name = hitTest)]
    fn hit_test(this: &EngineHost, x: f64, y: f64) -> Result<js_sys::Promise, JsValue>;
    #[wasm_bindgen(method, catch, js_name = sketchState)]
    fn sketch_state(this: &EngineHost) -> Result<String, JsValue>;
    #[wasm_bindgen(method, catch, js_name = sketchLayer)]
    fn sketch_layer(this: &EngineHost) -> Result<Option<u32>, JsValue>;
    #[wasm_bindgen(method, catch, js_name = sketchUpdate)]
    fn sketch_update(this: &EngineHost, graphics: &[u32], options: JsValue) -> Result<(), JsValue>;
    #[wasm_bindgen(method, catch, js_name = sketchComplete)]
    fn sketch_complete(this: &EngineHost) -> Result<(), JsValue>;
}

pub(crate) fn warn(context: &str, e: &JsValue) {
    console::warn_2(&JsValue::from_str(context), e);
}

#[derive(Clone, Debug)]
pub struct HostError(String);

impl HostError {
    fn from_js(v: JsValue) -> Self {
        let msg = v
            .as_string()
            .or_else(|| js_sys::Reflect::get(&v, &JsValue::from_str("message")).ok()?.as_string())
            .unwrap_or_else(|| "hit-test rejected".to_string());
        HostError(msg)
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type HitTestFuture = Pin<Box<dyn Future<Output = Result<Vec<HitResult>, HostError>>>>;

pub struct JsView {
    host: EngineHost,
}

impl JsView {
    pub fn new(host: EngineHost) -> Self {
        JsView { host }
    }
}

impl View for JsView {
    type Error = HostError;
    type HitTest = HitTestFuture;

    fn spatial_reference(&self) -> SpatialReference {
        match self.host.spatial_reference() {
            Ok(Some(wkid)) => SpatialReference { wkid },
            Ok(None) => SpatialReference::default(),
            Err(e) => {
                warn("spatialReference failed", &e);
                SpatialReference::default()
            }
        }
    }

    fn add_layer(&mut self, layer: &Layer) {
        if let Err(e) = self.host.add_layer(layer.id, &layer.title, layer.z_index) {
            warn("addLayer failed", &e);
        }
    }

    fn add_graphics(&mut self, layer: LayerId, graphics: &[Graphic]) {
        if let Err(e) = self.host.add_graphics(layer, host_graphics(graphics)) {
            warn("addGraphics failed", &e);
        }
    }

    fn hit_test(&self, point: ScreenPoint) -> Self::HitTest {
        let promise = self.host.hit_test(point.x, point.y);
        Box::pin(async move {
            let promise = promise.map_err(HostError::from_js)?;
            let value = JsFuture::from(promise).await.map_err(HostError::from_js)?;
            if !js_sys::Array::is_array(&value) {
                return Err(HostError("hitTest did not resolve to an array".to_string()));
            }
            Ok(candidates(&js_sys::Array::from(&value)))
        })
    }
}

/// Parse each entry on its own so one bad candidate cannot hide the rest.
fn candidates(entries: &js_sys::Array) -> Vec<HitResult> {
    let values: Vec<serde_json::Value> = entries
        .iter()
        .filter_map(|entry| match serde_wasm_bindgen::from_value(entry.clone()) {
            Ok(v) => Some(v),
            Err(_) => {
                warn("skipping unreadable hit candidate", &entry);
                None
            }
        })
        .collect();
    HitResult::parse_candidates(&values)
}

pub struct JsSketch {
    host: EngineHost,
}

impl JsSketch {
    pub fn new(host: EngineHost) -> Self {
        JsSketch { host }
    }
}

impl SketchTool for JsSketch {
    fn is_active(&self) -> bool {
        match self.host.sketch_state() {
            Ok(state) => state == "active",
            Err(e) => {
                warn("sketchState failed", &e);
                false
            }
        }
    }

    fn layer(&self) -> Option<LayerId> {
        self.host.sketch_layer().unwrap_or_else(|e| {
            warn("sketchLayer failed", &e);
            None
        })
    }

    fn update(&mut self, graphics: &[GraphicId], options: &UpdateOptions) {
        if let Err(e) = self.host.sketch_update(graphics, to_js(options)) {
            warn("sketchUpdate failed", &e);
        }
    }

    fn complete(&mut self) {
        if let Err(e) = self.host.sketch_complete() {
            warn("sketchComplete failed", &e);
        }
    }
}
