//! # Hedra
//!
//! Half-edge polygon meshes and the operations that rewrite them.
//!
//! Hedra stores a mesh as a doubly-connected edge list: vertices, directed
//! half-edges and polygonal faces, cross-referenced through typed handles.
//! On top of the store it provides topology rewrites and position transforms
//! that compose into pipelines.
//!
//! ## Features
//!
//! - **Half-edge data structure**: arbitrary polygons, open boundaries, twin
//!   pairing and idempotent cascading detachment
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Topology rewrites**: midpoint subdivision, fan triangulation, geometric
//!   dual, face filtering, spherical extrusion
//! - **Vertex transforms**: scale, translate, sphere projection, radius clamping
//! - **Selections**: ordered face and vertex sets with adjacency growth
//!
//! ## Quick Start
//!
//! ```
//! use hedra::prelude::*;
//! use hedra::algo::subdivide::{subdivide_triangles, SubdivideOptions};
//! use hedra::algo::transform::VertexTransform;
//! use hedra::primitives::icosahedron;
//!
//! // A geodesic sphere: subdivide an icosahedron and push it onto a sphere
//! let mut mesh: HalfEdgeMesh = icosahedron().unwrap();
//! subdivide_triangles(&mut mesh, &SubdivideOptions::new(3)).unwrap();
//! let sphere = VertexTransform::ProjectToSphere { radius: 1.0 }.apply(&mesh).unwrap();
//!
//! println!("Vertices: {}", sphere.num_vertices());
//! println!("Faces: {}", sphere.num_faces());
//!
//! for face_id in sphere.face_ids().take(3) {
//!     let normal = sphere.face_normal(face_id);
//!     let area = sphere.face_area(face_id);
//!     println!("Face {:?}: normal={:?}, area={}", face_id, normal, area);
//! }
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use hedra::prelude::*;
//! use nalgebra::Point3;
//!
//! let mut mesh: HalfEdgeMesh = HalfEdgeMesh::new();
//! let v = mesh
//!     .add_vertices(&[
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(1.0, 1.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ])
//!     .unwrap();
//!
//! // Two triangles sharing the diagonal v0-v2; the diagonal's half-edges pair up
//! let f0 = mesh.add_face_by_vertices(&[v[0], v[1], v[2]]).unwrap();
//! let f1 = mesh.add_face_by_vertices(&[v[0], v[2], v[3]]).unwrap();
//!
//! assert_eq!(mesh.num_halfedges(), 6);
//! assert!(mesh.are_adjacent(f0, f1));
//! ```
//!
//! ## Mesh Traversal
//!
//! ```
//! use hedra::prelude::*;
//! use hedra::primitives::quad_cube;
//!
//! let mesh: HalfEdgeMesh = quad_cube().unwrap();
//! let v = mesh.vertex_ids().next().unwrap();
//!
//! // Half-edges around a vertex
//! for &he in mesh.outgoing(v) {
//!     println!("{:?} -> {:?}, twin {:?}", mesh.from(he), mesh.to(he), mesh.twin(he));
//! }
//!
//! // Faces around a vertex
//! assert_eq!(mesh.vertex_faces(v).len(), 3);
//!
//! // Corners of a face
//! let f = mesh.face_ids().next().unwrap();
//! let corners: Vec<VertexId> = mesh.face_vertices(f).collect();
//! assert_eq!(corners.len(), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;
pub mod primitives;
pub mod selection;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use hedra::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::Operation;
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_polygons, build_from_triangles, to_triangle_arrays, BoundingBox, Face, FaceId,
        HalfEdge, HalfEdgeId, HalfEdgeMesh, MeshIndex, Vertex, VertexId,
    };
    pub use crate::selection::{FaceSelection, VertexSelection};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
