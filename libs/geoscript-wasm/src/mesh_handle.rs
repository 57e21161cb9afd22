//! WASM-friendly mesh wrapper, handing a browser
//! zero-copy-ish typed-array views over [`Mesh::render_buffers`].

use wasm_bindgen::prelude::*;

use geoscript_kernel::Mesh;

/// A handle to render-ready mesh buffers, transferable to JavaScript.
///
/// # Example (JavaScript)
///
/// ```javascript
/// const handle = doc.compile(source);
/// const geometry = new THREE.BufferGeometry();
/// geometry.setAttribute('position', new THREE.BufferAttribute(handle.positions(), 3));
/// geometry.setAttribute('normal', new THREE.BufferAttribute(handle.normals(), 3));
/// geometry.setIndex(new THREE.BufferAttribute(handle.indices(), 1));
/// ```
#[wasm_bindgen]
pub struct MeshHandle {
    buffers: geoscript_kernel::RenderBuffers,
    is_watertight: bool,
    is_convex: bool,
    persisted: crate::persist::PersistedMesh,
}

#[wasm_bindgen]
impl MeshHandle {
    #[wasm_bindgen(getter)]
    pub fn vertex_count(&self) -> u32 {
        self.buffers.vertex_count() as u32
    }

    #[wasm_bindgen(getter)]
    pub fn triangle_count(&self) -> u32 {
        self.buffers.triangle_count() as u32
    }

    #[wasm_bindgen(getter)]
    pub fn is_watertight(&self) -> bool {
        self.is_watertight
    }

    #[wasm_bindgen(getter)]
    pub fn is_convex(&self) -> bool {
        self.is_convex
    }

    /// `[x, y, z, ...]`, length `3 * vertex_count`.
    pub fn positions(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.buffers.positions[..])
    }

    /// `[nx, ny, nz, ...]`, length `3 * vertex_count`.
    pub fn normals(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.buffers.normals[..])
    }

    /// `[r, g, b, a, ...]`, present only when some vertex carried a color.
    pub fn colors(&self) -> Option<js_sys::Float32Array> {
        self.buffers.colors.as_deref().map(js_sys::Float32Array::from)
    }

    /// Triangle indices into the position/normal/color buffers.
    pub fn indices(&self) -> js_sys::Uint32Array {
        js_sys::Uint32Array::from(&self.buffers.indices[..])
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.vertex_count() == 0
    }

    /// Serializes this mesh to the persisted JSON format.
    pub fn to_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.persisted).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl MeshHandle {
    pub fn from_mesh(mesh: &Mesh) -> Self {
        MeshHandle {
            buffers: mesh.render_buffers(),
            is_watertight: mesh.is_watertight(),
            is_convex: mesh.is_convex(),
            persisted: crate::persist::to_persisted(mesh),
        }
    }
}
