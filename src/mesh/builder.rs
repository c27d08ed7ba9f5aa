//! Mesh construction utilities.
//!
//! This module provides functions for building half-edge meshes from
//! face-vertex lists, for rebuilding a mesh into a fresh, compacted copy, and
//! for exporting a triangle mesh back to flat arrays.

use std::collections::HashMap;

use log::debug;
use nalgebra::Point3;

use super::halfedge::HalfEdgeMesh;
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertices and polygon faces.
///
/// Every face is added with [`HalfEdgeMesh::add_face_by_vertices`], so shared
/// edges are paired as twins automatically. Vertices are added in order, so
/// vertex `i` of the input becomes the `i`-th live vertex of the mesh.
///
/// # Example
/// ```
/// use hedra::mesh::{build_from_polygons, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3]];
///
/// let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 4);
/// assert_eq!(mesh.num_halfedges(), 4);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_polygons<I, P>(vertices: &[Point3<f64>], faces: &[P]) -> Result<HalfEdgeMesh<I>>
where
    I: MeshIndex,
    P: AsRef<[usize]>,
{
    // Validate vertex indices
    for (fi, face) in faces.iter().enumerate() {
        if let Some(&vi) = face.as_ref().iter().find(|&&vi| vi >= vertices.len()) {
            return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
        }
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len());
    let vertex_ids = mesh.add_vertices(vertices)?;

    let mut corners = Vec::new();
    for face in faces {
        corners.clear();
        corners.extend(face.as_ref().iter().map(|&vi| vertex_ids[vi]));
        mesh.add_face_by_vertices(&corners)?;
    }

    Ok(mesh)
}

/// Build a half-edge mesh from vertices and triangle faces.
///
/// # Example
/// ```
/// use hedra::mesh::{build_from_triangles, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    build_from_polygons(vertices, faces)
}

/// Convert a mesh to a vertex list and polygon index lists.
///
/// Indices refer to the live vertices in creation order.
pub fn to_polygons<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let mut index_of = HashMap::with_capacity(mesh.num_vertices());
    let vertices: Vec<Point3<f64>> = mesh
        .vertices()
        .enumerate()
        .map(|(i, v)| {
            index_of.insert(v.id(), i);
            v.position
        })
        .collect();

    let faces = mesh
        .face_ids()
        .map(|f| mesh.face_vertices(f).map(|v| index_of[&v]).collect())
        .collect();

    (vertices, faces)
}

/// Export a triangle mesh to a vertex list and triangle index triples.
///
/// # Errors
/// [`MeshError::ExportPrecondition`] if any face is not a triangle.
pub fn to_triangle_arrays<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
) -> Result<(Vec<Point3<f64>>, Vec<[usize; 3]>)> {
    if let Some(face) = mesh.faces().find(|f| !f.is_triangle()) {
        return Err(MeshError::ExportPrecondition {
            face: face.id().index(),
            sides: face.sides(),
        });
    }

    let (vertices, polygons) = to_polygons(mesh);
    let triangles = polygons.iter().map(|p| [p[0], p[1], p[2]]).collect();
    Ok((vertices, triangles))
}

/// Old-to-new handle correspondence produced by a structural rebuild.
#[derive(Debug, Clone, Default)]
pub struct ElementMap<I: MeshIndex = u32> {
    vertices: HashMap<VertexId<I>, VertexId<I>>,
    halfedges: HashMap<HalfEdgeId<I>, HalfEdgeId<I>>,
    faces: HashMap<FaceId<I>, FaceId<I>>,
}

impl<I: MeshIndex> ElementMap<I> {
    /// The copy of a source vertex.
    pub fn vertex(&self, v: VertexId<I>) -> Option<VertexId<I>> {
        self.vertices.get(&v).copied()
    }

    /// The copy of a source half-edge.
    pub fn halfedge(&self, he: HalfEdgeId<I>) -> Option<HalfEdgeId<I>> {
        self.halfedges.get(&he).copied()
    }

    /// The copy of a source face.
    pub fn face(&self, f: FaceId<I>) -> Option<FaceId<I>> {
        self.faces.get(&f).copied()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Clone the mesh and return the handle correspondence.
    ///
    /// The copy has a new tag and densely packed slots; detached elements of
    /// the source are not carried over.
    pub fn clone_with_map(&self) -> (Self, ElementMap<I>) {
        self.rebuild(|p| *p)
    }

    /// Build a copy whose vertex positions are `f` applied to the source positions.
    ///
    /// Topology, including twin pairings, is reproduced exactly.
    pub fn map_positions<F>(&self, f: F) -> Self
    where
        F: Fn(&Point3<f64>) -> Point3<f64>,
    {
        self.rebuild(f).0
    }

    fn rebuild<F>(&self, f: F) -> (Self, ElementMap<I>)
    where
        F: Fn(&Point3<f64>) -> Point3<f64>,
    {
        let mut mesh = Self::with_capacity(self.num_vertices(), self.num_faces());
        let mut map = ElementMap {
            vertices: HashMap::with_capacity(self.num_vertices()),
            halfedges: HashMap::with_capacity(self.num_halfedges()),
            faces: HashMap::with_capacity(self.num_faces()),
        };

        let tag = mesh.tag();
        for (j, vertex) in self.vertices().enumerate() {
            let copy = VertexId::new(tag, compacted(j, vertex.id().raw()));
            mesh.push_vertex(copy, f(&vertex.position));
            map.vertices.insert(vertex.id(), copy);
        }

        for (j, edge) in self.halfedges().enumerate() {
            let copy = HalfEdgeId::new(tag, compacted(j, edge.id().raw()));
            mesh.push_halfedge(copy, map.vertices[&edge.from()], map.vertices[&edge.to()]);
            map.halfedges.insert(edge.id(), copy);
        }

        for edge in self.halfedges() {
            if let Some(twin) = edge.twin() {
                let copy = map.halfedges[&edge.id()];
                mesh.halfedge_mut(copy).twin = Some(map.halfedges[&twin]);
            }
        }

        for (j, face) in self.faces().enumerate() {
            let halfedges = face.halfedges().iter().map(|he| map.halfedges[he]).collect();
            let copy = FaceId::new(tag, compacted(j, face.id().raw()));
            mesh.push_face(copy, halfedges);
            map.faces.insert(face.id(), copy);
        }

        debug!(
            "rebuilt mesh {:?} as {:?}: {} vertices, {} half-edges, {} faces",
            self.tag(),
            mesh.tag(),
            map.vertices.len(),
            map.halfedges.len(),
            map.faces.len()
        );

        (mesh, map)
    }
}

/// Slot of the `j`-th live element in a compacted copy.
///
/// Live elements are a subset of the source slots, so `j` never exceeds the
/// source slot `raw` and always fits the index type.
fn compacted<I: MeshIndex>(j: usize, raw: I) -> I {
    I::try_from_usize(j).unwrap_or(raw)
}

impl<I: MeshIndex> Clone for HalfEdgeMesh<I> {
    fn clone(&self) -> Self {
        self.clone_with_map().0
    }
}
