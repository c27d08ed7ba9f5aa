//! Mesh operations.
//!
//! Operations come in two shapes:
//!
//! - **Vertex transforms** rewrite positions only: scale, translate,
//!   projection onto a sphere, clamping between two radii
//! - **Topology rewrites** change the element graph: midpoint subdivision,
//!   fan triangulation, geometric dual, face filtering, spherical extrusion
//!
//! Each rewrite is available as a free function in its module. The closed
//! [`Operation`] enum wraps all of them behind one contract: given a mesh,
//! produce a new mesh and leave the input untouched. Operations can be
//! chained with [`apply_all`].
//!
//! # Example
//!
//! ```
//! use hedra::prelude::*;
//! use hedra::algo::{apply_all, Operation};
//! use hedra::algo::subdivide::SubdivideOptions;
//! use hedra::algo::transform::VertexTransform;
//! use hedra::primitives::icosahedron;
//!
//! let mesh: HalfEdgeMesh = icosahedron().unwrap();
//! let sphere = apply_all(
//!     &mesh,
//!     &[
//!         Operation::SubdivideTriangles(SubdivideOptions::new(2)),
//!         Operation::Transform(VertexTransform::ProjectToSphere { radius: 1.0 }),
//!     ],
//! )
//! .unwrap();
//! assert_eq!(sphere.num_faces(), 320);
//! ```

pub mod cleanup;
pub mod dual;
pub mod extrude;
pub mod filter;
pub mod progress;
pub mod subdivide;
pub mod transform;
pub mod triangulate;

pub use progress::Progress;

use log::info;

use crate::error::Result;
use crate::mesh::{HalfEdgeMesh, MeshIndex};
use crate::selection::FaceSelection;
use dual::DualOptions;
use subdivide::SubdivideOptions;
use transform::VertexTransform;

/// One step of a mesh pipeline.
///
/// Selections name faces of the mesh the operation is applied to, so a
/// selection-scoped step only makes sense on the mesh it was built from.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation<I: MeshIndex = u32> {
    /// Rewrite every vertex position.
    Transform(VertexTransform),

    /// Midpoint subdivision (triangle meshes only).
    SubdivideTriangles(SubdivideOptions),

    /// Fan triangulation of every polygon.
    Triangulate,

    /// Swap vertices and faces.
    GeometricDual(DualOptions),

    /// Keep only the selected faces.
    FilterFaces(FaceSelection<I>),

    /// Lift the selected faces radially by `distance`.
    SphericalExtrude {
        /// Faces to lift.
        selection: FaceSelection<I>,
        /// Signed radial offset.
        distance: f64,
    },
}

impl<I: MeshIndex> Operation<I> {
    /// Short name used in logs and progress messages.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Transform(t) => t.name(),
            Operation::SubdivideTriangles(_) => "subdivide",
            Operation::Triangulate => "triangulate",
            Operation::GeometricDual(_) => "dual",
            Operation::FilterFaces(_) => "filter",
            Operation::SphericalExtrude { .. } => "extrude",
        }
    }

    /// Apply the operation, producing a new mesh.
    ///
    /// In-place rewrites run on a copy, so a failure never exposes a partially
    /// rewritten mesh.
    pub fn apply(&self, mesh: &HalfEdgeMesh<I>) -> Result<HalfEdgeMesh<I>> {
        match self {
            Operation::Transform(t) => t.apply(mesh),
            Operation::SubdivideTriangles(options) => {
                let mut copy = mesh.clone();
                subdivide::subdivide_triangles(&mut copy, options)?;
                Ok(copy)
            }
            Operation::Triangulate => triangulate::triangulate(mesh),
            Operation::GeometricDual(options) => dual::geometric_dual(mesh, options),
            Operation::FilterFaces(selection) => filter::filter_faces(mesh, selection),
            Operation::SphericalExtrude {
                selection,
                distance,
            } => {
                selection.ensure_attached(mesh)?;
                let (mut copy, map) = mesh.clone_with_map();
                extrude::spherical_extrude(&mut copy, &selection.remap(&map), *distance)?;
                Ok(copy)
            }
        }
    }
}

/// Apply operations in order, each consuming the previous result.
pub fn apply_all<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    operations: &[Operation<I>],
) -> Result<HalfEdgeMesh<I>> {
    apply_all_with_progress(mesh, operations, &Progress::none())
}

/// [`apply_all`] with progress reporting (one step per operation).
pub fn apply_all_with_progress<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    operations: &[Operation<I>],
    progress: &Progress,
) -> Result<HalfEdgeMesh<I>> {
    let total = operations.len();
    let mut current = mesh.clone();
    for (step, op) in operations.iter().enumerate() {
        progress.report(step, total, op.name());
        current = op.apply(&current)?;
        info!(
            "{}: {} vertices, {} half-edges, {} faces",
            op.name(),
            current.num_vertices(),
            current.num_halfedges(),
            current.num_faces()
        );
    }
    progress.report(total, total, "done");
    Ok(current)
}
