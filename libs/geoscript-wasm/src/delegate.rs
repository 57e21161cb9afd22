//! Bridges the evaluator's host [`Delegate`] contract to
//! JavaScript callbacks: `resolveURL(path) -> url`, `importGeometry(url)
//! -> Geometry?`, `debugLog(values)`. A host that doesn't supply a
//! callback simply gets the `Delegate` trait's no-op default — imports
//! fail with `RuntimeError::fileNotFound` and debug output is dropped,
//! degrading rather than failing for optional platform features the host
//! doesn't implement.

use wasm_bindgen::prelude::*;

use geoscript_eval::{Delegate, Value};

/// Optional JS functions a host can register; any field left `None` falls
/// back to the `Delegate` trait default for that hook.
#[wasm_bindgen]
#[derive(Default)]
pub struct JsDelegate {
    resolve_url: Option<js_sys::Function>,
    import_geometry: Option<js_sys::Function>,
    debug_log: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl JsDelegate {
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsDelegate {
        JsDelegate::default()
    }

    pub fn set_resolve_url(&mut self, f: js_sys::Function) {
        self.resolve_url = Some(f);
    }

    pub fn set_import_geometry(&mut self, f: js_sys::Function) {
        self.import_geometry = Some(f);
    }

    pub fn set_debug_log(&mut self, f: js_sys::Function) {
        self.debug_log = Some(f);
    }
}

impl Delegate for JsDelegate {
    fn resolve_url(&self, path: &str) -> Option<String> {
        let f = self.resolve_url.as_ref()?;
        let result = f.call1(&JsValue::NULL, &JsValue::from_str(path)).ok()?;
        result.as_string()
    }

    fn import_geometry(&self, url: &str) -> Option<Value> {
        let f = self.import_geometry.as_ref()?;
        let result = f.call1(&JsValue::NULL, &JsValue::from_str(url)).ok()?;
        // The host returns a mesh already decoded into the persisted format
        // (JSON string); anything else (undefined, a rejected promise
        // unwrapped upstream) is "not found".
        let json = result.as_string()?;
        let persisted: crate::persist::PersistedMesh = serde_json::from_str(&json).ok()?;
        let mesh = crate::persist::from_persisted(persisted);
        Some(Value::Geometry(Box::new(geoscript_eval::Geometry::new(
            geoscript_eval::GeometryKind::RawMesh(mesh),
            None,
            geoscript_kernel::Transform::IDENTITY,
            geoscript_kernel::Material::default(),
            0.0,
            Vec::new(),
            geoscript_diagnostics::Span::point(0),
        ))))
    }

    fn debug_log(&self, values: &[Value]) {
        let Some(f) = self.debug_log.as_ref() else { return };
        let array = js_sys::Array::new();
        for v in values {
            array.push(&JsValue::from_str(&format_value(v)));
        }
        let _ = f.call1(&JsValue::NULL, &array.into());
    }
}

fn format_value(v: &Value) -> String {
    match v {
        Value::Void => "void".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Color(c) => format!("{:?}", c.to_array()),
        Value::Vector(v) | Value::Size(v) | Value::Point(v) => format!("({}, {}, {})", v.x, v.y, v.z),
        other => other.type_name().to_string(),
    }
}

/// Helper so call sites can coerce an opaque `JsValue` function reference
/// without panicking if the host passed something else entirely.
pub fn as_function(value: &JsValue) -> Option<js_sys::Function> {
    value.dyn_ref::<js_sys::Function>().cloned()
}
