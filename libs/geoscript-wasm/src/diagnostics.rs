//! WASM-friendly diagnostic types, mirrored from the shared
//! `geoscript_diagnostics::Diagnostic` so a host's `catch` block gets
//! plain getters instead of having to know the Rust error enum shape.

use wasm_bindgen::prelude::*;

use geoscript_diagnostics::Diagnostic as CoreDiagnostic;

/// A single diagnostic, accessible from JavaScript.
///
/// # Example (JavaScript)
///
/// ```javascript
/// try {
///     doc.compile(source);
/// } catch (error) {
///     for (const diag of error.diagnostics) {
///         console.error(`${diag.severity}: ${diag.message}`);
///         console.error(`  at ${diag.start}..${diag.end}`);
///         if (diag.hint) console.error(`  hint: ${diag.hint}`);
///     }
/// }
/// ```
#[wasm_bindgen]
pub struct Diagnostic {
    severity: String,
    stage: String,
    message: String,
    start: u32,
    end: u32,
    hint: Option<String>,
}

#[wasm_bindgen]
impl Diagnostic {
    #[wasm_bindgen(getter)]
    pub fn severity(&self) -> String {
        self.severity.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn stage(&self) -> String {
        self.stage.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn start(&self) -> u32 {
        self.start
    }

    #[wasm_bindgen(getter)]
    pub fn end(&self) -> u32 {
        self.end
    }

    #[wasm_bindgen(getter)]
    pub fn hint(&self) -> Option<String> {
        self.hint.clone()
    }
}

impl From<&CoreDiagnostic> for Diagnostic {
    fn from(d: &CoreDiagnostic) -> Self {
        Diagnostic {
            severity: d.severity.as_str().to_string(),
            stage: format!("{:?}", d.stage).to_lowercase(),
            message: d.message.clone(),
            start: d.span.start as u32,
            end: d.span.end as u32,
            hint: d.hint.clone(),
        }
    }
}

impl Diagnostic {
    fn to_js_object(&self) -> js_sys::Object {
        let obj = js_sys::Object::new();
        js_sys::Reflect::set(&obj, &"severity".into(), &self.severity.clone().into()).expect("set severity");
        js_sys::Reflect::set(&obj, &"stage".into(), &self.stage.clone().into()).expect("set stage");
        js_sys::Reflect::set(&obj, &"message".into(), &self.message.clone().into()).expect("set message");
        js_sys::Reflect::set(&obj, &"start".into(), &self.start.into()).expect("set start");
        js_sys::Reflect::set(&obj, &"end".into(), &self.end.into()).expect("set end");
        if let Some(hint) = &self.hint {
            js_sys::Reflect::set(&obj, &"hint".into(), &hint.clone().into()).expect("set hint");
        }
        obj
    }
}

/// Builds the `JsValue` thrown from a failed compile: a plain object with
/// a `diagnostics` array, surfacing structured errors through `catch`.
pub fn build_error_payload(diag: &CoreDiagnostic) -> JsValue {
    let array = js_sys::Array::new();
    array.push(&Diagnostic::from(diag).to_js_object());
    let obj = js_sys::Object::new();
    js_sys::Reflect::set(&obj, &"diagnostics".into(), &array).expect("set diagnostics");
    obj.into()
}
