//! Vertex transforms.
//!
//! A vertex transform rewrites every vertex position and nothing else. The
//! result is a new mesh with the same vertex order, the same half-edge graph
//! (twins included) and the same faces; the source mesh is never touched.
//!
//! # Example
//!
//! ```
//! use hedra::algo::transform::VertexTransform;
//! use hedra::primitives::quad_cube;
//! use hedra::prelude::*;
//! use nalgebra::Vector3;
//!
//! let cube: HalfEdgeMesh = quad_cube().unwrap();
//! let moved = VertexTransform::Translate(Vector3::new(1.0, 0.0, 0.0))
//!     .apply(&cube)
//!     .unwrap();
//!
//! let center = moved.bounding_box().unwrap().center();
//! assert!((center.x - 1.0).abs() < 1e-10);
//! ```

use log::debug;
use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// A pure position rewrite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VertexTransform {
    /// Multiply each coordinate by the matching component.
    Scale(Vector3<f64>),

    /// Add an offset to every position.
    Translate(Vector3<f64>),

    /// Move every vertex along its direction from the origin onto a sphere.
    ProjectToSphere {
        /// Sphere radius.
        radius: f64,
    },

    /// Keep each vertex's direction from the origin and clamp its distance
    /// into `[inner, outer]`.
    ClampToRadii {
        /// Smallest allowed distance from the origin.
        inner: f64,
        /// Largest allowed distance from the origin.
        outer: f64,
    },
}

impl VertexTransform {
    /// Scale uniformly along all three axes.
    pub fn uniform_scale(factor: f64) -> Self {
        VertexTransform::Scale(Vector3::repeat(factor))
    }

    /// Short name used in logs and progress messages.
    pub fn name(&self) -> &'static str {
        match self {
            VertexTransform::Scale(_) => "scale",
            VertexTransform::Translate(_) => "translate",
            VertexTransform::ProjectToSphere { .. } => "project",
            VertexTransform::ClampToRadii { .. } => "clamp",
        }
    }

    /// Check the parameters.
    ///
    /// # Errors
    /// [`MeshError::InvalidParameter`] for non-finite components, a negative
    /// radius or an inner radius larger than the outer one.
    pub fn validate(&self) -> Result<()> {
        match *self {
            VertexTransform::Scale(factors) => {
                if !factors.iter().all(|c| c.is_finite()) {
                    return Err(MeshError::invalid_param(
                        "scale",
                        format_vector(&factors),
                        "components must be finite",
                    ));
                }
            }
            VertexTransform::Translate(offset) => {
                if !offset.iter().all(|c| c.is_finite()) {
                    return Err(MeshError::invalid_param(
                        "offset",
                        format_vector(&offset),
                        "components must be finite",
                    ));
                }
            }
            VertexTransform::ProjectToSphere { radius } => {
                check_radius("radius", radius)?;
            }
            VertexTransform::ClampToRadii { inner, outer } => {
                check_radius("inner", inner)?;
                check_radius("outer", outer)?;
                if inner > outer {
                    return Err(MeshError::invalid_param(
                        "inner",
                        inner,
                        "must not exceed the outer radius",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Map a single position.
    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        match *self {
            VertexTransform::Scale(factors) => Point3::from(p.coords.component_mul(&factors)),
            VertexTransform::Translate(offset) => p + offset,
            VertexTransform::ProjectToSphere { radius } => Point3::from(direction(p) * radius),
            VertexTransform::ClampToRadii { inner, outer } => {
                let magnitude = p.coords.norm().clamp(inner, outer);
                Point3::from(direction(p) * magnitude)
            }
        }
    }

    /// Build a new mesh with every position transformed.
    pub fn apply<I: MeshIndex>(&self, mesh: &HalfEdgeMesh<I>) -> Result<HalfEdgeMesh<I>> {
        self.validate()?;
        debug!("{} over {} vertices", self.name(), mesh.num_vertices());
        Ok(mesh.map_positions(|p| self.transform_point(p)))
    }
}

/// Unit direction from the origin; the origin itself maps to zero.
pub(crate) fn direction(p: &Point3<f64>) -> Vector3<f64> {
    p.coords.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}

fn check_radius(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(MeshError::invalid_param(name, value, "must be finite and non-negative"));
    }
    Ok(())
}

fn format_vector(v: &Vector3<f64>) -> String {
    format!("({}, {}, {})", v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{icosahedron, quad_cube};

    #[test]
    fn test_scale_preserves_topology() {
        let cube: HalfEdgeMesh = quad_cube().unwrap();
        let scaled = VertexTransform::Scale(Vector3::new(2.0, 3.0, 4.0)).apply(&cube).unwrap();

        assert_eq!(scaled.num_vertices(), 8);
        assert_eq!(scaled.num_halfedges(), 24);
        assert_eq!(scaled.num_faces(), 6);
        for f in scaled.face_ids() {
            assert_eq!(scaled.adjacent_faces(f).len(), 4);
        }

        let size = scaled.bounding_box().unwrap().size();
        assert!((size - Vector3::new(2.0, 3.0, 4.0)).norm() < 1e-10);
    }

    #[test]
    fn test_translate_shifts_center() {
        let cube: HalfEdgeMesh = quad_cube().unwrap();
        let offset = Vector3::new(1.0, -2.0, 0.5);
        let moved = VertexTransform::Translate(offset).apply(&cube).unwrap();

        let before = cube.bounding_box().unwrap();
        let after = moved.bounding_box().unwrap();
        assert!((after.center() - (before.center() + offset)).norm() < 1e-10);
        assert!((after.size() - before.size()).norm() < 1e-10);
    }

    #[test]
    fn test_source_is_untouched() {
        let cube: HalfEdgeMesh = quad_cube().unwrap();
        let before: Vec<Point3<f64>> = cube.vertices().map(|v| v.position).collect();
        let _ = VertexTransform::uniform_scale(10.0).apply(&cube).unwrap();
        let after: Vec<Point3<f64>> = cube.vertices().map(|v| v.position).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_project_to_sphere() {
        let mesh: HalfEdgeMesh = icosahedron().unwrap();
        let projected = VertexTransform::ProjectToSphere { radius: 2.5 }.apply(&mesh).unwrap();
        for v in projected.vertices() {
            assert!((v.position.coords.norm() - 2.5).abs() < 1e-10);
        }
    }

    #[test]
    fn test_project_origin_stays_at_origin() {
        let t = VertexTransform::ProjectToSphere { radius: 1.0 };
        assert_eq!(t.transform_point(&Point3::origin()), Point3::origin());
    }

    #[test]
    fn test_clamp_to_radii() {
        let t = VertexTransform::ClampToRadii { inner: 1.0, outer: 2.0 };

        let near = t.transform_point(&Point3::new(0.5, 0.0, 0.0));
        assert!((near - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-10);

        let far = t.transform_point(&Point3::new(0.0, 0.0, -5.0));
        assert!((far - Point3::new(0.0, 0.0, -2.0)).norm() < 1e-10);

        let inside = Point3::new(0.0, 1.5, 0.0);
        assert!((t.transform_point(&inside) - inside).norm() < 1e-10);
    }

    #[test]
    fn test_invalid_parameters() {
        let cube: HalfEdgeMesh = quad_cube().unwrap();
        let bad = [
            VertexTransform::ProjectToSphere { radius: -1.0 },
            VertexTransform::ClampToRadii { inner: 2.0, outer: 1.0 },
            VertexTransform::Scale(Vector3::new(f64::NAN, 1.0, 1.0)),
            VertexTransform::Translate(Vector3::new(0.0, f64::INFINITY, 0.0)),
        ];
        for t in bad {
            assert!(matches!(t.apply(&cube), Err(MeshError::InvalidParameter { .. })));
        }
    }
}
