//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation and related types
//! for representing and manipulating polygon meshes.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], which stores vertices, half-edges and
//! faces in arenas and connects them through handles. Faces may have any
//! number of sides (at least three); a half-edge without a twin marks an open
//! boundary.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe handles:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//!
//! Handles carry the [`MeshTag`] of the mesh that issued them and are generic
//! over the underlying integer type ([`MeshIndex`] trait), allowing you to
//! choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! Meshes are built element by element or from face-vertex lists:
//!
//! ```
//! use hedra::mesh::HalfEdgeMesh;
//! use nalgebra::Point3;
//!
//! let mut mesh: HalfEdgeMesh = HalfEdgeMesh::new();
//! let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0)).unwrap();
//! let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0)).unwrap();
//! let c = mesh.add_vertex(Point3::new(0.5, 1.0, 0.0)).unwrap();
//! let face = mesh.add_face_by_vertices(&[a, b, c]).unwrap();
//!
//! assert_eq!(mesh.face_len(face), 3);
//! assert_eq!(mesh.num_halfedges(), 3);
//! ```

mod bounds;
mod builder;
mod detach;
mod halfedge;
mod index;

pub use bounds::BoundingBox;
pub use builder::{
    build_from_polygons, build_from_triangles, to_polygons, to_triangle_arrays, ElementMap,
};
pub use halfedge::{Face, HalfEdge, HalfEdgeMesh, Vertex};
pub(crate) use halfedge::slot_index;
pub use index::{FaceId, HalfEdgeId, MeshIndex, MeshTag, VertexId};
