//! Scene graph node types.

use std::sync::OnceLock;

use geoscript_diagnostics::Span;
use geoscript_kernel::{Color, Material, Mesh, Path, Transform, Vector};

use crate::error::EvalError;
use crate::primitives;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsgOp {
    Union,
    Difference,
    Intersection,
    Xor,
    Stencil,
}

#[derive(Debug, Clone)]
pub enum Along {
    Axis(Vector),
    Guide(Path),
}

/// What a [`Geometry`] node actually is.
#[derive(Debug, Clone)]
pub enum GeometryKind {
    Group,
    Csg(CsgOp),
    Cube { size: Vector },
    Sphere { size: Vector, detail: u32 },
    Cylinder { size: Vector, detail: u32 },
    Cone { size: Vector, detail: u32 },
    Pyramid { sides: u32, size: Vector },
    Prism { sides: u32, size: Vector },
    Extrude { paths: Vec<Path>, along: Along },
    Lathe { paths: Vec<Path>, segments: u32 },
    Loft { paths: Vec<Path> },
    Fill { paths: Vec<Path> },
    Hull { points: Vec<Vector> },
    /// A literal mesh introduced with the `mesh` block or imported from a
    /// persisted mesh file.
    RawMesh(Mesh),
    Camera(CameraParams),
    Light(LightParams),
    /// `debug`: evaluated for side effects only, contributes no geometry.
    Debug,
}

#[derive(Debug, Clone, Default)]
pub struct CameraParams {
    pub position: Option<Vector>,
    pub orientation: Option<Vector>,
    pub size: Option<Vector>,
    pub background: Option<Color>,
    pub fov: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct LightParams {
    pub position: Option<Vector>,
    pub orientation: Option<Vector>,
    pub color: Option<Color>,
    pub spread: Option<f64>,
    pub penumbra: Option<f64>,
}

/// A node in the scene graph. Owns its children exclusively; mesh
/// construction is lazy and memoized via `mesh`, matching the immutable,
/// lazily-cached-field idiom the kernel's own `Mesh` uses.
#[derive(Debug)]
pub struct Geometry {
    pub kind: GeometryKind,
    pub name: Option<String>,
    pub transform: Transform,
    pub material: Material,
    pub smoothing: f64,
    pub children: Vec<Geometry>,
    pub source_location: Span,
    mesh: OnceLock<Mesh>,
}

impl Geometry {
    pub fn new(
        kind: GeometryKind,
        name: Option<String>,
        transform: Transform,
        material: Material,
        smoothing: f64,
        children: Vec<Geometry>,
        source_location: Span,
    ) -> Self {
        Geometry {
            kind,
            name,
            transform,
            material,
            smoothing,
            children,
            source_location,
            mesh: OnceLock::new(),
        }
    }

    /// Primes this node's memoized mesh from an external, content-addressed
    /// cache (`geoscript-engine`'s `GeometryCache`) without recomputing it.
    /// A no-op if the mesh was already set. Deliberately the only public
    /// way to populate the lazy field from outside `build()`, so the
    /// invariant "a node's mesh is either unset or the one this kind of
    /// node would itself compute" still holds.
    pub fn set_cached_mesh(&self, mesh: Mesh) {
        let _ = self.mesh.set(mesh);
    }

    /// Builds (and memoizes) this node's mesh by recursively building
    /// children first,
    /// checking cancellation between them.
    pub fn build(&self, cancel: geoscript_kernel::Cancel) -> Result<Mesh, EvalError> {
        if let Some(m) = self.mesh.get() {
            return Ok(m.clone());
        }
        let local = self.build_local(cancel)?;
        let world = transform_mesh(&local, &self.transform, &self.material);
        let _ = self.mesh.set(world.clone());
        Ok(world)
    }

    fn build_children(&self, cancel: geoscript_kernel::Cancel) -> Result<Vec<Mesh>, EvalError> {
        self.children.iter().map(|c| c.build(cancel)).collect()
    }

    fn build_local(&self, cancel: geoscript_kernel::Cancel) -> Result<Mesh, EvalError> {
        use geoscript_kernel::csg;

        if cancel() {
            return Err(EvalError::Cancelled);
        }

        match &self.kind {
            GeometryKind::Group => {
                let meshes = self.build_children(cancel)?;
                Ok(meshes.into_iter().fold(Mesh::empty(), |acc, m| acc.merge(&m)))
            }
            GeometryKind::Csg(op) => {
                let meshes = self.build_children(cancel)?;
                let mut iter = meshes.into_iter();
                let Some(first) = iter.next() else { return Ok(Mesh::empty()) };
                let mut acc = first;
                for next in iter {
                    acc = match op {
                        CsgOp::Union => csg::union(&acc, &next, cancel)?,
                        CsgOp::Difference => csg::difference(&acc, &next, cancel)?,
                        CsgOp::Intersection => csg::intersection(&acc, &next, cancel)?,
                        CsgOp::Xor => csg::xor(&acc, &next, cancel)?,
                        CsgOp::Stencil => csg::stencil(&acc, &next, cancel)?,
                    };
                }
                Ok(acc)
            }
            GeometryKind::Cube { size } => Ok(primitives::cube(*size)),
            GeometryKind::Sphere { size, detail } => Ok(primitives::sphere(*size, *detail)),
            GeometryKind::Cylinder { size, detail } => Ok(primitives::cylinder(*size, *detail)),
            GeometryKind::Cone { size, detail } => Ok(primitives::cone(*size, *detail)),
            GeometryKind::Pyramid { sides, size } => Ok(primitives::pyramid(*sides, *size)),
            GeometryKind::Prism { sides, size } => Ok(primitives::prism(*sides, *size)),
            GeometryKind::Extrude { paths, along } => {
                let along = match along {
                    Along::Axis(v) => geoscript_kernel::builders::Along::Axis(*v),
                    Along::Guide(p) => geoscript_kernel::builders::Along::Guide(p.clone()),
                };
                Ok(geoscript_kernel::builders::extrude(paths, &along, cancel)?)
            }
            GeometryKind::Lathe { paths, segments } => Ok(geoscript_kernel::builders::lathe(paths, *segments)),
            GeometryKind::Loft { paths } => Ok(geoscript_kernel::builders::loft(paths)),
            GeometryKind::Fill { paths } => Ok(geoscript_kernel::builders::fill(paths)),
            GeometryKind::Hull { points } => Ok(geoscript_kernel::builders::hull(points)?),
            GeometryKind::RawMesh(m) => Ok(m.clone()),
            GeometryKind::Camera(_) | GeometryKind::Light(_) | GeometryKind::Debug => Ok(Mesh::empty()),
        }
    }
}

fn transform_mesh(mesh: &Mesh, transform: &Transform, material: &Material) -> Mesh {
    if mesh.is_empty() {
        return Mesh::empty();
    }
    if transform.is_identity() {
        return retag_material(mesh, material);
    }
    let polys = mesh
        .polygons()
        .iter()
        .map(|p| {
            let vertices = p
                .vertices
                .iter()
                .map(|v| geoscript_kernel::Vertex {
                    position: transform.apply_point(v.position),
                    normal: transform.apply_normal(v.normal),
                    texcoord: v.texcoord,
                    color: v.color,
                })
                .collect::<Vec<_>>();
            geoscript_kernel::Polygon::build(vertices, p.material.clone().or_else(|| Some(material.clone())))
        })
        .collect::<Vec<_>>()
        .concat();
    Mesh::new(polys)
}

fn retag_material(mesh: &Mesh, material: &Material) -> Mesh {
    let polys = mesh
        .polygons()
        .iter()
        .cloned()
        .map(|mut p| {
            if p.material.is_none() {
                p.material = Some(material.clone());
            }
            p
        })
        .collect();
    Mesh::new(polys)
}

/// `{background, children, cache?}`. The content-addressed
/// `cache` itself lives in `geoscript-engine`; a freshly evaluated `Scene`
/// carries `None` until the engine attaches one.
#[derive(Debug)]
pub struct Scene {
    pub background: Option<Color>,
    pub children: Vec<Geometry>,
}

impl Scene {
    pub fn new(background: Option<Color>, children: Vec<Geometry>) -> Self {
        Scene { background, children }
    }
}
