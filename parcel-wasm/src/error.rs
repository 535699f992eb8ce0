use crate::interop::{new_obj, set_kv};
use wasm_bindgen::prelude::*;

pub fn ok(v: JsValue) -> JsValue {
    let o = new_obj();
    set_kv(&o, "ok", &JsValue::from_bool(true));
    set_kv(&o, "value", &v);
    o.into()
}

pub fn err(code: &'static str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let root = new_obj();
    set_kv(&root, "ok", &JsValue::from_bool(false));
    let e = new_obj();
    set_kv(&e, "code", &JsValue::from_str(code));
    set_kv(&e, "message", &JsValue::from_str(&message.into()));
    if let Some(d) = data {
        set_kv(&e, "data", &d);
    }
    set_kv(&root, "error", &e.into());
    root.into()
}

#[inline]
pub fn config(e: &parcel::ParcelError) -> JsValue {
    err("config", e.to_string(), None)
}

#[inline]
pub fn not_initialized() -> JsValue {
    err("not_initialized", "call init() once the view is ready", None)
}

#[inline]
pub fn already_initialized() -> JsValue {
    err("already_initialized", "init() was already called", None)
}

#[inline]
pub fn invalid_event(kind: &str, message: impl Into<String>) -> JsValue {
    let d = new_obj();
    set_kv(&d, "kind", &JsValue::from_str(kind));
    err("invalid_event", message, Some(d.into()))
}

#[inline]
pub fn hit_test(message: impl Into<String>) -> JsValue {
    err("hit_test", message, None)
}
