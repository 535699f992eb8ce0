use js_sys::{Object, Reflect};
use parcel::model::{Attributes, Color, FillPattern, Graphic, Ring, SpatialReference};
use serde::Serialize;
use wasm_bindgen::JsValue;

pub fn new_obj() -> Object {
    Object::new()
}

pub fn set_kv(obj: &Object, k: &str, v: &JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(k), v);
}

/// Serialize to plain JS objects and arrays (no `Map`s).
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HostGeometry<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    rings: &'a [Ring],
    spatial_reference: SpatialReference,
}

#[derive(Serialize)]
struct HostOutline {
    color: Color,
    width: f32,
}

#[derive(Serialize)]
struct HostSymbol {
    #[serde(rename = "type")]
    kind: &'static str,
    style: FillPattern,
    color: Color,
    outline: HostOutline,
}

#[derive(Serialize)]
struct HostGraphic<'a> {
    id: u32,
    geometry: HostGeometry<'a>,
    symbol: HostSymbol,
    attributes: &'a Attributes,
}

/// Graphics in the shape a map host builds its own graphics from:
/// `{ id, geometry: { type: "polygon", rings, spatialReference }, symbol: { type: "simple-fill", ... }, attributes }`.
pub fn host_graphics(graphics: &[Graphic]) -> JsValue {
    let out: Vec<HostGraphic<'_>> = graphics
        .iter()
        .map(|g| HostGraphic {
            id: g.id,
            geometry: HostGeometry {
                kind: "polygon",
                rings: &g.geometry.rings,
                spatial_reference: g.geometry.spatial_reference,
            },
            symbol: HostSymbol {
                kind: "simple-fill",
                style: g.symbol.pattern,
                color: g.symbol.color,
                outline: HostOutline { color: g.symbol.outline.color, width: g.symbol.outline.width },
            },
            attributes: &g.attributes,
        })
        .collect();
    to_js(&out)
}
