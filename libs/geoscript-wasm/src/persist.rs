//! Persisted mesh format: `{polygons: [Polygon] | [[Polygon]],
//! bounds?, convex?, materials?: [Material]}`. When `materials` is
//! present, `polygons` groups by material index (outer array index =
//! material index); otherwise each polygon carries its material inline.
//! Round-trips preserve polygon identity up to material normalization —
//! re-serializing a mesh always emits the grouped-by-material shape, even
//! if it was originally parsed from the flat inline-material shape.

use serde::{Deserialize, Serialize};

use geoscript_kernel::{Color, Material, Mesh, Polygon, Vector, Vertex};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedVector {
    x: f64,
    y: f64,
    z: f64,
}

impl From<Vector> for PersistedVector {
    fn from(v: Vector) -> Self {
        PersistedVector { x: v.x, y: v.y, z: v.z }
    }
}

impl From<PersistedVector> for Vector {
    fn from(v: PersistedVector) -> Self {
        Vector::new(v.x, v.y, v.z)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedColor {
    r: f32,
    g: f32,
    b: f32,
    a: f32,
}

impl From<Color> for PersistedColor {
    fn from(c: Color) -> Self {
        PersistedColor { r: c.r, g: c.g, b: c.b, a: c.a }
    }
}

impl From<PersistedColor> for Color {
    fn from(c: PersistedColor) -> Self {
        Color::new(c.r, c.g, c.b, c.a)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedMaterial {
    color: PersistedColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    texture: Option<String>,
    opacity: f64,
}

impl From<&Material> for PersistedMaterial {
    fn from(m: &Material) -> Self {
        PersistedMaterial { color: m.color.into(), texture: m.texture.clone(), opacity: m.opacity }
    }
}

impl From<PersistedMaterial> for Material {
    fn from(m: PersistedMaterial) -> Self {
        Material { color: m.color.into(), texture: m.texture, opacity: m.opacity }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedVertex {
    position: PersistedVector,
    normal: PersistedVector,
    #[serde(skip_serializing_if = "Option::is_none")]
    texcoord: Option<PersistedVector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<PersistedColor>,
}

impl From<&Vertex> for PersistedVertex {
    fn from(v: &Vertex) -> Self {
        PersistedVertex {
            position: v.position.into(),
            normal: v.normal.into(),
            texcoord: (v.texcoord != Vector::ZERO).then(|| v.texcoord.into()),
            color: v.color.map(Into::into),
        }
    }
}

impl From<PersistedVertex> for Vertex {
    fn from(v: PersistedVertex) -> Self {
        Vertex::new(
            v.position.into(),
            v.normal.into(),
            v.texcoord.map(Into::into).unwrap_or(Vector::ZERO),
            v.color.map(Into::into),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedPolygon {
    vertices: Vec<PersistedVertex>,
    /// Only populated in the flat (no top-level `materials`) shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    material: Option<PersistedMaterial>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum PersistedPolygons {
    Flat(Vec<PersistedPolygon>),
    Grouped(Vec<Vec<PersistedPolygon>>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedMesh {
    polygons: PersistedPolygons,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<(PersistedVector, PersistedVector)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    convex: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    materials: Option<Vec<PersistedMaterial>>,
}

/// Serializes a [`Mesh`] into the persisted format, grouped by material
/// index.
pub fn to_persisted(mesh: &Mesh) -> PersistedMesh {
    let materials: Vec<Material> = mesh.materials().to_vec();
    let mut groups: Vec<Vec<PersistedPolygon>> = vec![Vec::new(); materials.len().max(1)];
    // polygons with no material go in the implicit group 0 when no
    // materials exist at all; otherwise every group corresponds to a real
    // material and unmatched polygons are dropped from no group (they
    // simply carry no material index — placed in a synthetic last group).
    let mut unmatched = Vec::new();
    for poly in mesh.polygons() {
        let persisted = PersistedPolygon { vertices: poly.vertices.iter().map(Into::into).collect(), material: None };
        match &poly.material {
            Some(m) => {
                let idx = materials.iter().position(|existing| existing == m).unwrap_or(0);
                groups[idx].push(persisted);
            }
            None => unmatched.push(persisted),
        }
    }
    if !unmatched.is_empty() {
        groups.push(unmatched);
    }

    let bounds = if mesh.is_empty() { None } else { Some((mesh.bounds().min.into(), mesh.bounds().max.into())) };

    PersistedMesh {
        polygons: PersistedPolygons::Grouped(groups),
        bounds,
        convex: Some(mesh.is_convex()),
        materials: (!materials.is_empty()).then(|| materials.iter().map(Into::into).collect()),
    }
}

/// Parses a persisted mesh, accepting either the flat (inline-material) or
/// grouped-by-material-index shape.
pub fn from_persisted(persisted: PersistedMesh) -> Mesh {
    let materials: Vec<Material> = persisted.materials.map(|ms| ms.into_iter().map(Into::into).collect()).unwrap_or_default();

    let flat: Vec<(PersistedPolygon, Option<Material>)> = match persisted.polygons {
        PersistedPolygons::Flat(polys) => polys.into_iter().map(|p| (p, None)).collect(),
        PersistedPolygons::Grouped(groups) => groups
            .into_iter()
            .enumerate()
            .flat_map(|(idx, polys)| {
                let material = materials.get(idx).cloned();
                polys.into_iter().map(move |p| (p, material.clone()))
            })
            .collect(),
    };

    let polygons: Vec<Polygon> = flat
        .into_iter()
        .flat_map(|(p, grouped_material)| {
            let material = p.material.clone().map(Into::into).or(grouped_material);
            let vertices: Vec<Vertex> = p.vertices.into_iter().map(Into::into).collect();
            Polygon::build(vertices, material)
        })
        .collect();

    Mesh::with_known_convexity(polygons, persisted.convex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoscript_kernel::Vector as V;

    fn triangle(material: Option<Material>) -> Polygon {
        let verts = vec![Vertex::at(V::new(0.0, 0.0, 0.0)), Vertex::at(V::new(1.0, 0.0, 0.0)), Vertex::at(V::new(0.0, 1.0, 0.0))];
        Polygon::build(verts, material).remove(0)
    }

    #[test]
    fn round_trips_a_single_material_mesh() {
        let mesh = Mesh::new(vec![triangle(Some(Material::default()))]);
        let persisted = to_persisted(&mesh);
        let json = serde_json::to_string(&persisted).unwrap();
        let parsed: PersistedMesh = serde_json::from_str(&json).unwrap();
        let back = from_persisted(parsed);
        assert_eq!(back.polygon_count(), mesh.polygon_count());
        assert_eq!(back.materials().len(), 1);
    }

    #[test]
    fn flat_shape_parses_with_inline_material() {
        let json = r#"{
            "polygons": [
                {"vertices": [
                    {"position": {"x": 0.0, "y": 0.0, "z": 0.0}, "normal": {"x": 0.0, "y": 0.0, "z": 1.0}},
                    {"position": {"x": 1.0, "y": 0.0, "z": 0.0}, "normal": {"x": 0.0, "y": 0.0, "z": 1.0}},
                    {"position": {"x": 0.0, "y": 1.0, "z": 0.0}, "normal": {"x": 0.0, "y": 0.0, "z": 1.0}}
                ], "material": {"color": {"r": 1.0, "g": 0.0, "b": 0.0, "a": 1.0}, "opacity": 1.0}}
            ]
        }"#;
        let parsed: PersistedMesh = serde_json::from_str(json).unwrap();
        let mesh = from_persisted(parsed);
        assert_eq!(mesh.polygon_count(), 1);
        assert_eq!(mesh.materials().len(), 1);
    }
}
