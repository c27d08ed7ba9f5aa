//! Half-edge mesh data structure.
//!
//! This module provides a half-edge (doubly-connected edge list) representation
//! for polygon meshes. All three element kinds live in arenas owned by
//! [`HalfEdgeMesh`]; relationships between them are stored as handles, so every
//! navigation step is an index lookup.
//!
//! # Structure
//!
//! - Each **vertex** stores its position and the lists of its outgoing and
//!   incoming half-edges
//! - Each **half-edge** knows its two endpoints, its optional **twin** (the
//!   half-edge running the other way between the same vertices) and its optional
//!   owning **face**
//! - Each **face** stores its boundary as an ordered cycle of half-edges
//!
//! # Liveness
//!
//! Elements are never removed from their arena. Detaching an element (see the
//! `detach_*` methods) clears every relationship it takes part in and sets its
//! `detached` flag; listings and counts skip detached elements and slot indices
//! are never handed out twice.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};

use log::trace;
use nalgebra::{Point3, Vector3};

use super::bounds::BoundingBox;
use super::index::{FaceId, HalfEdgeId, MeshIndex, MeshTag, VertexId};
use crate::error::{MeshError, Result};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    pub(crate) id: VertexId<I>,

    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// Attached half-edges whose origin is this vertex, in creation order.
    pub(crate) outgoing: Vec<HalfEdgeId<I>>,

    /// Attached half-edges whose target is this vertex, in creation order.
    pub(crate) incoming: Vec<HalfEdgeId<I>>,

    pub(crate) detached: bool,
}

impl<I: MeshIndex> Vertex<I> {
    fn new(id: VertexId<I>, position: Point3<f64>) -> Self {
        Self {
            id,
            position,
            outgoing: Vec::new(),
            incoming: Vec::new(),
            detached: false,
        }
    }

    /// The handle of this vertex.
    #[inline]
    pub fn id(&self) -> VertexId<I> {
        self.id
    }

    /// Outgoing half-edges.
    #[inline]
    pub fn outgoing(&self) -> &[HalfEdgeId<I>] {
        &self.outgoing
    }

    /// Incoming half-edges.
    #[inline]
    pub fn incoming(&self) -> &[HalfEdgeId<I>] {
        &self.incoming
    }

    /// Number of outgoing half-edges.
    #[inline]
    pub fn degree(&self) -> usize {
        self.outgoing.len()
    }

    /// Whether this vertex has been detached from its mesh.
    #[inline]
    pub fn is_detached(&self) -> bool {
        self.detached
    }
}

/// A directed half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    pub(crate) id: HalfEdgeId<I>,

    /// The vertex this half-edge originates from.
    pub(crate) from: VertexId<I>,

    /// The vertex this half-edge points to.
    pub(crate) to: VertexId<I>,

    /// The half-edge running from `to` back to `from`, if one is paired.
    pub(crate) twin: Option<HalfEdgeId<I>>,

    /// The face whose boundary uses this half-edge, if any.
    pub(crate) face: Option<FaceId<I>>,

    pub(crate) detached: bool,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// The handle of this half-edge.
    #[inline]
    pub fn id(&self) -> HalfEdgeId<I> {
        self.id
    }

    /// Origin vertex.
    #[inline]
    pub fn from(&self) -> VertexId<I> {
        self.from
    }

    /// Target vertex.
    #[inline]
    pub fn to(&self) -> VertexId<I> {
        self.to
    }

    /// The opposite half-edge, if paired.
    #[inline]
    pub fn twin(&self) -> Option<HalfEdgeId<I>> {
        self.twin
    }

    /// The owning face, if any.
    #[inline]
    pub fn face(&self) -> Option<FaceId<I>> {
        self.face
    }

    /// A half-edge without a twin lies on the mesh boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.twin.is_none()
    }

    /// Whether this half-edge has been detached from its mesh.
    #[inline]
    pub fn is_detached(&self) -> bool {
        self.detached
    }
}

/// A polygonal face bounded by a cycle of half-edges.
#[derive(Debug, Clone)]
pub struct Face<I: MeshIndex = u32> {
    pub(crate) id: FaceId<I>,

    /// Boundary half-edges in order: `halfedges[i].to == halfedges[i + 1].from`.
    pub(crate) halfedges: Vec<HalfEdgeId<I>>,

    pub(crate) detached: bool,
}

impl<I: MeshIndex> Face<I> {
    /// The handle of this face.
    #[inline]
    pub fn id(&self) -> FaceId<I> {
        self.id
    }

    /// The boundary cycle.
    #[inline]
    pub fn halfedges(&self) -> &[HalfEdgeId<I>] {
        &self.halfedges
    }

    /// Number of sides.
    #[inline]
    pub fn sides(&self) -> usize {
        self.halfedges.len()
    }

    /// Check if this face is a triangle.
    #[inline]
    pub fn is_triangle(&self) -> bool {
        self.halfedges.len() == 3
    }

    /// Whether this face has been detached from its mesh.
    #[inline]
    pub fn is_detached(&self) -> bool {
        self.detached
    }
}

macro_rules! impl_identity_eq {
    ($name:ident) => {
        impl<I: MeshIndex> PartialEq for $name<I> {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl<I: MeshIndex> Eq for $name<I> {}

        impl<I: MeshIndex> Hash for $name<I> {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }
    };
}

impl_identity_eq!(Vertex);
impl_identity_eq!(HalfEdge);
impl_identity_eq!(Face);

/// A half-edge mesh of arbitrary polygons.
///
/// The mesh is the only mutator of its elements: every vertex, half-edge and
/// face is created through its `add_*` methods and removed through its
/// `detach_*` methods, which keep all cross-references consistent.
///
/// Cloning produces a fully independent mesh with a new [`MeshTag`]: handles
/// of the source are not valid on the clone.
#[derive(Debug)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    tag: MeshTag,

    /// All vertices ever created, including detached ones.
    pub(crate) vertices: Vec<Vertex<I>>,

    /// All half-edges ever created, including detached ones.
    pub(crate) halfedges: Vec<HalfEdge<I>>,

    /// All faces ever created, including detached ones.
    pub(crate) faces: Vec<Face<I>>,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // Closed quad-dominant meshes average close to four half-edges per face.
        Self {
            tag: MeshTag::next(),
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_faces * 4),
            faces: Vec::with_capacity(num_faces),
        }
    }

    /// The identity of this mesh instance.
    #[inline]
    pub fn tag(&self) -> MeshTag {
        self.tag
    }

    // ==================== Accessors ====================

    /// Get the number of attached vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.iter().filter(|v| !v.detached).count()
    }

    /// Get the number of attached half-edges.
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.iter().filter(|he| !he.detached).count()
    }

    /// Get the number of attached faces.
    pub fn num_faces(&self) -> usize {
        self.faces.iter().filter(|f| !f.detached).count()
    }

    /// Get a vertex by ID.
    ///
    /// # Panics
    /// Panics if the handle was issued by another mesh.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        assert_eq!(id.mesh(), self.tag, "{:?} was issued by another mesh", id);
        &self.vertices[id.index()]
    }

    #[inline]
    pub(crate) fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    ///
    /// # Panics
    /// Panics if the handle was issued by another mesh.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        assert_eq!(id.mesh(), self.tag, "{:?} was issued by another mesh", id);
        &self.halfedges[id.index()]
    }

    #[inline]
    pub(crate) fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by ID.
    ///
    /// # Panics
    /// Panics if the handle was issued by another mesh.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        assert_eq!(id.mesh(), self.tag, "{:?} was issued by another mesh", id);
        &self.faces[id.index()]
    }

    #[inline]
    pub(crate) fn face_mut(&mut self, id: FaceId<I>) -> &mut Face<I> {
        &mut self.faces[id.index()]
    }

    /// Check whether a vertex handle names an attached vertex of this mesh.
    pub fn contains_vertex(&self, id: VertexId<I>) -> bool {
        id.mesh() == self.tag && self.vertices.get(id.index()).is_some_and(|v| !v.detached)
    }

    /// Check whether a half-edge handle names an attached half-edge of this mesh.
    pub fn contains_halfedge(&self, id: HalfEdgeId<I>) -> bool {
        id.mesh() == self.tag && self.halfedges.get(id.index()).is_some_and(|he| !he.detached)
    }

    /// Check whether a face handle names an attached face of this mesh.
    pub fn contains_face(&self, id: FaceId<I>) -> bool {
        id.mesh() == self.tag && self.faces.get(id.index()).is_some_and(|f| !f.detached)
    }

    pub(crate) fn check_vertex(&self, id: VertexId<I>) -> Result<()> {
        check_handle(self.tag, id.mesh(), id, self.vertices.get(id.index()).map(|v| v.detached))
    }

    pub(crate) fn check_halfedge(&self, id: HalfEdgeId<I>) -> Result<()> {
        check_handle(self.tag, id.mesh(), id, self.halfedges.get(id.index()).map(|he| he.detached))
    }

    pub(crate) fn check_face(&self, id: FaceId<I>) -> Result<()> {
        check_handle(self.tag, id.mesh(), id, self.faces.get(id.index()).map(|f| f.detached))
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexId<I>, pos: Point3<f64>) {
        assert_eq!(v.mesh(), self.tag, "{:?} was issued by another mesh", v);
        self.vertex_mut(v).position = pos;
    }

    // ==================== Topology Queries ====================

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn from(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).from
    }

    /// Get the target vertex of a half-edge.
    #[inline]
    pub fn to(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).to
    }

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> Option<HalfEdgeId<I>> {
        self.halfedge(he).twin
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> Option<FaceId<I>> {
        self.halfedge(he).face
    }

    /// Outgoing half-edges of a vertex, in creation order.
    #[inline]
    pub fn outgoing(&self, v: VertexId<I>) -> &[HalfEdgeId<I>] {
        &self.vertex(v).outgoing
    }

    /// Incoming half-edges of a vertex, in creation order.
    #[inline]
    pub fn incoming(&self, v: VertexId<I>) -> &[HalfEdgeId<I>] {
        &self.vertex(v).incoming
    }

    /// Find the first attached half-edge running `from -> to`.
    pub fn find_halfedge(&self, from: VertexId<I>, to: VertexId<I>) -> Option<HalfEdgeId<I>> {
        self.outgoing(from)
            .iter()
            .copied()
            .find(|&he| self.halfedge(he).to == to)
    }

    /// Find the first `from -> to` half-edge that no face uses yet.
    pub(crate) fn find_free_halfedge(
        &self,
        from: VertexId<I>,
        to: VertexId<I>,
    ) -> Option<HalfEdgeId<I>> {
        self.outgoing(from).iter().copied().find(|&he| {
            let edge = self.halfedge(he);
            edge.to == to && edge.face.is_none()
        })
    }

    /// Check if a vertex is on the boundary.
    ///
    /// A vertex is interior when it has at least one outgoing half-edge and
    /// every outgoing half-edge has a face and a twin that also has a face.
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        let outgoing = self.outgoing(v);
        if outgoing.is_empty() {
            return true; // Isolated vertex
        }

        outgoing.iter().any(|&he| {
            let edge = self.halfedge(he);
            match (edge.face, edge.twin) {
                (Some(_), Some(twin)) => self.face_of(twin).is_none(),
                _ => true,
            }
        })
    }

    // ==================== Iteration ====================

    /// Iterate over attached vertex IDs in creation order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertices().map(|v| v.id)
    }

    /// Iterate over attached vertices in creation order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex<I>> + '_ {
        self.vertices.iter().filter(|v| !v.detached)
    }

    /// Iterate over attached half-edge IDs in creation order.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        self.halfedges().map(|he| he.id)
    }

    /// Iterate over attached half-edges in creation order.
    pub fn halfedges(&self) -> impl Iterator<Item = &HalfEdge<I>> + '_ {
        self.halfedges.iter().filter(|he| !he.detached)
    }

    /// Iterate over attached face IDs in creation order.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.faces().map(|f| f.id)
    }

    /// Iterate over attached faces in creation order.
    pub fn faces(&self) -> impl Iterator<Item = &Face<I>> + '_ {
        self.faces.iter().filter(|f| !f.detached)
    }

    /// The boundary cycle of a face.
    #[inline]
    pub fn face_halfedges(&self, f: FaceId<I>) -> &[HalfEdgeId<I>] {
        &self.face(f).halfedges
    }

    /// Iterate over the corners of a face (the origin of each boundary half-edge).
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_halfedges(f).iter().map(|&he| self.from(he))
    }

    /// Number of sides of a face.
    #[inline]
    pub fn face_len(&self, f: FaceId<I>) -> usize {
        self.face(f).halfedges.len()
    }

    /// Faces that use a vertex as a corner, deduplicated, in the order their
    /// half-edges appear on the vertex.
    pub fn vertex_faces(&self, v: VertexId<I>) -> Vec<FaceId<I>> {
        let vertex = self.vertex(v);
        let mut seen = HashSet::new();
        vertex
            .outgoing
            .iter()
            .chain(vertex.incoming.iter())
            .filter_map(|&he| self.face_of(he))
            .filter(|&f| seen.insert(f))
            .collect()
    }

    /// Faces that share a twin pair with `f`, deduplicated.
    pub fn adjacent_faces(&self, f: FaceId<I>) -> Vec<FaceId<I>> {
        let mut seen = HashSet::new();
        self.face_halfedges(f)
            .iter()
            .filter_map(|&he| self.twin(he))
            .filter_map(|twin| self.face_of(twin))
            .filter(|&other| other != f && seen.insert(other))
            .collect()
    }

    /// Check if two faces share a twin pair.
    pub fn are_adjacent(&self, a: FaceId<I>, b: FaceId<I>) -> bool {
        self.adjacent_faces(a).contains(&b)
    }

    /// Check if a vertex is a corner of a face.
    pub fn face_is_incident_on(&self, f: FaceId<I>, v: VertexId<I>) -> bool {
        self.face_vertices(f).any(|corner| corner == v)
    }

    /// Check if every attached face is a triangle.
    pub fn is_triangle_mesh(&self) -> bool {
        self.faces().all(|f| f.is_triangle())
    }

    /// Check if every attached face is a quad.
    pub fn is_quad_mesh(&self) -> bool {
        self.faces().all(|f| f.sides() == 4)
    }

    // ==================== Geometry ====================

    /// Compute the edge vector (from origin to target).
    pub fn edge_vector(&self, he: HalfEdgeId<I>) -> Vector3<f64> {
        let edge = self.halfedge(he);
        self.position(edge.to) - self.position(edge.from)
    }

    /// Compute the length of a half-edge.
    pub fn edge_length(&self, he: HalfEdgeId<I>) -> f64 {
        self.edge_vector(he).norm()
    }

    /// Compute the midpoint of a half-edge.
    pub fn edge_midpoint(&self, he: HalfEdgeId<I>) -> Point3<f64> {
        let edge = self.halfedge(he);
        let p0 = self.position(edge.from);
        let p1 = self.position(edge.to);
        Point3::from((p0.coords + p1.coords) * 0.5)
    }

    /// Compute the centroid of a face as the mean of its corner positions.
    pub fn face_centroid(&self, f: FaceId<I>) -> Point3<f64> {
        let n = self.face_len(f);
        let sum: Vector3<f64> = self.face_vertices(f).map(|v| self.position(v).coords).sum();
        Point3::from(sum / n as f64)
    }

    /// Area-weighted normal of a polygon, summed over its corner fan.
    fn face_area_vector(&self, f: FaceId<I>) -> Vector3<f64> {
        let corners: Vec<Point3<f64>> = self.face_vertices(f).map(|v| *self.position(v)).collect();
        let p0 = corners[0];
        corners
            .windows(2)
            .skip(1)
            .map(|w| (w[0] - p0).cross(&(w[1] - p0)))
            .sum()
    }

    /// Compute the unit normal of a face. Degenerate faces yield the zero vector.
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        self.face_area_vector(f)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Compute the area of a (planar) face.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        0.5 * self.face_area_vector(f).norm()
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    /// Compute the axis-aligned bounding box of all attached vertices.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.vertices().map(|v| v.position))
    }

    // ==================== Construction ====================

    /// Add a new vertex and return its ID.
    ///
    /// # Errors
    /// [`MeshError::IndexOverflow`] if the index type has no vertex slot left.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> Result<VertexId<I>> {
        let id = VertexId::new(self.tag, slot_index("vertex", self.vertices.len())?);
        self.push_vertex(id, position);
        Ok(id)
    }

    /// Add several vertices, returning their IDs in the same order.
    ///
    /// Either all vertices are added or, on overflow, none are.
    pub fn add_vertices(&mut self, positions: &[Point3<f64>]) -> Result<Vec<VertexId<I>>> {
        if let Some(last) = (self.vertices.len() + positions.len()).checked_sub(1) {
            slot_index::<I>("vertex", last)?;
        }
        positions.iter().map(|&p| self.add_vertex(p)).collect()
    }

    /// Store a vertex under a handle whose slot is the next free one.
    pub(crate) fn push_vertex(&mut self, id: VertexId<I>, position: Point3<f64>) {
        debug_assert_eq!(id.index(), self.vertices.len());
        self.vertices.push(Vertex::new(id, position));
    }

    /// Add a half-edge running `from -> to`.
    ///
    /// The new half-edge is registered on both endpoints and paired with the
    /// first `to -> from` half-edge that has no twin yet, if there is one. A
    /// reverse half-edge that is already paired is never re-paired, so twin
    /// pointers always stay mutual.
    ///
    /// # Errors
    /// [`MeshError::InvalidTopology`] if the endpoints belong to different
    /// meshes, are not attached, or are the same vertex.
    /// [`MeshError::IndexOverflow`] if the index type has no half-edge slot left.
    pub fn add_halfedge(&mut self, from: VertexId<I>, to: VertexId<I>) -> Result<HalfEdgeId<I>> {
        if from.mesh() != to.mesh() {
            return Err(MeshError::invalid_topology(format!(
                "cannot create a half-edge between {:?} of {:?} and {:?} of {:?}",
                from,
                from.mesh(),
                to,
                to.mesh()
            )));
        }
        self.check_vertex(from)?;
        self.check_vertex(to)?;
        if from == to {
            return Err(MeshError::invalid_topology(format!(
                "half-edge endpoints must differ, got {:?} twice",
                from
            )));
        }

        let id = HalfEdgeId::new(self.tag, slot_index("half-edge", self.halfedges.len())?);
        self.push_halfedge(id, from, to);

        let twin = self
            .outgoing(to)
            .iter()
            .copied()
            .find(|&he| {
                he != id && self.halfedge(he).to == from && self.halfedge(he).twin.is_none()
            });
        if let Some(twin) = twin {
            self.halfedge_mut(id).twin = Some(twin);
            self.halfedge_mut(twin).twin = Some(id);
            trace!("paired {:?} with twin {:?}", id, twin);
        }

        Ok(id)
    }

    /// Add the two half-edges `a -> b` and `b -> a`.
    pub fn add_halfedge_pair(
        &mut self,
        a: VertexId<I>,
        b: VertexId<I>,
    ) -> Result<(HalfEdgeId<I>, HalfEdgeId<I>)> {
        let ab = self.add_halfedge(a, b)?;
        let ba = self.add_halfedge(b, a)?;
        Ok((ab, ba))
    }

    /// Store a half-edge and register it on its endpoints without pairing.
    pub(crate) fn push_halfedge(&mut self, id: HalfEdgeId<I>, from: VertexId<I>, to: VertexId<I>) {
        debug_assert_eq!(id.index(), self.halfedges.len());
        self.halfedges.push(HalfEdge {
            id,
            from,
            to,
            twin: None,
            face: None,
            detached: false,
        });
        self.vertex_mut(from).outgoing.push(id);
        self.vertex_mut(to).incoming.push(id);
    }

    /// Add a face bounded by the given half-edges.
    ///
    /// The half-edges must form a consecutive cycle in the given order; this is
    /// only checked in debug builds.
    ///
    /// # Errors
    /// [`MeshError::InvalidTopology`] if fewer than 3 half-edges are given, if a
    /// half-edge is foreign, detached, listed twice or already owns a face.
    /// [`MeshError::IndexOverflow`] if the index type has no face slot left.
    pub fn add_face(&mut self, halfedges: &[HalfEdgeId<I>]) -> Result<FaceId<I>> {
        if halfedges.len() < 3 {
            return Err(MeshError::invalid_topology(format!(
                "a face needs at least 3 half-edges, got {}",
                halfedges.len()
            )));
        }

        let mut seen = HashSet::with_capacity(halfedges.len());
        for &he in halfedges {
            self.check_halfedge(he)?;
            if !seen.insert(he) {
                return Err(MeshError::invalid_topology(format!(
                    "{:?} appears twice in one face",
                    he
                )));
            }
            if let Some(face) = self.face_of(he) {
                return Err(MeshError::invalid_topology(format!(
                    "cannot add a face to {:?}: it is already attached to {:?}",
                    he, face
                )));
            }
        }

        debug_assert!(
            halfedges
                .iter()
                .zip(halfedges.iter().cycle().skip(1))
                .all(|(&a, &b)| self.to(a) == self.from(b)),
            "face half-edges do not form a consecutive cycle"
        );

        let id = FaceId::new(self.tag, slot_index("face", self.faces.len())?);
        self.push_face(id, halfedges.to_vec());
        Ok(id)
    }

    /// Store a face over half-edges already known to be free.
    pub(crate) fn push_face(&mut self, id: FaceId<I>, halfedges: Vec<HalfEdgeId<I>>) {
        debug_assert_eq!(id.index(), self.faces.len());
        for &he in &halfedges {
            self.halfedge_mut(he).face = Some(id);
        }
        self.faces.push(Face {
            id,
            halfedges,
            detached: false,
        });
    }

    /// Add a face through the given corners.
    ///
    /// For each consecutive pair of corners an existing face-free half-edge is
    /// reused, otherwise a new one is created. All checks run before anything is
    /// created, so a failing call leaves the mesh untouched.
    ///
    /// # Errors
    /// [`MeshError::InvalidTopology`] if fewer than 3 corners are given, if a
    /// corner is foreign or detached, if two consecutive corners coincide, if a
    /// directed side repeats, or if every existing half-edge for a side already
    /// owns a face. [`MeshError::IndexOverflow`] if the index type cannot hold
    /// the new half-edges or the face.
    pub fn add_face_by_vertices(&mut self, vertices: &[VertexId<I>]) -> Result<FaceId<I>> {
        let n = vertices.len();
        if n < 3 {
            return Err(MeshError::invalid_topology(format!(
                "a face needs at least 3 vertices, got {}",
                n
            )));
        }
        for &v in vertices {
            self.check_vertex(v)?;
        }

        let mut sides = HashSet::with_capacity(n);
        let mut plan: Vec<(VertexId<I>, VertexId<I>, Option<HalfEdgeId<I>>)> =
            Vec::with_capacity(n);
        for i in 0..n {
            let from = vertices[i];
            let to = vertices[(i + 1) % n];
            if from == to {
                return Err(MeshError::invalid_topology(format!(
                    "face corner {:?} is repeated consecutively",
                    from
                )));
            }
            if !sides.insert((from, to)) {
                return Err(MeshError::invalid_topology(format!(
                    "side {:?} -> {:?} appears twice in one face",
                    from, to
                )));
            }

            let existing = self.find_free_halfedge(from, to);
            if existing.is_none() {
                if let Some(used) = self.find_halfedge(from, to) {
                    return Err(MeshError::invalid_topology(format!(
                        "cannot add a face along {:?}: it is already attached to {:?}",
                        used,
                        self.face_of(used)
                    )));
                }
            }
            plan.push((from, to, existing));
        }

        let fresh = plan.iter().filter(|(_, _, existing)| existing.is_none()).count();
        if let Some(last) = (self.halfedges.len() + fresh).checked_sub(1) {
            slot_index::<I>("half-edge", last)?;
        }
        let face = FaceId::new(self.tag, slot_index("face", self.faces.len())?);

        let mut halfedges = Vec::with_capacity(n);
        for (from, to, existing) in plan {
            let he = match existing {
                Some(he) => he,
                None => self.add_halfedge(from, to)?,
            };
            halfedges.push(he);
        }

        self.push_face(face, halfedges);
        Ok(face)
    }

    // ==================== Validation ====================

    /// Check every structural invariant, returning the first violation found.
    pub fn validate(&self) -> Result<()> {
        let broken = |details: String| Err(MeshError::invalid_topology(details));

        for vertex in &self.vertices {
            if vertex.detached {
                if !vertex.outgoing.is_empty() || !vertex.incoming.is_empty() {
                    return broken(format!("detached {:?} still lists half-edges", vertex.id));
                }
                continue;
            }
            for &he in &vertex.outgoing {
                if !self.contains_halfedge(he) || self.halfedge(he).from != vertex.id {
                    return broken(format!("{:?} lists {:?} as outgoing", vertex.id, he));
                }
            }
            for &he in &vertex.incoming {
                if !self.contains_halfedge(he) || self.halfedge(he).to != vertex.id {
                    return broken(format!("{:?} lists {:?} as incoming", vertex.id, he));
                }
            }
        }

        for edge in &self.halfedges {
            if edge.detached {
                if edge.twin.is_some() || edge.face.is_some() {
                    return broken(format!("detached {:?} keeps a twin or face", edge.id));
                }
                continue;
            }
            if !self.contains_vertex(edge.from) || !self.contains_vertex(edge.to) {
                return broken(format!("{:?} has a detached endpoint", edge.id));
            }
            let listed_out = self.outgoing(edge.from).iter().filter(|&&he| he == edge.id).count();
            let listed_in = self.incoming(edge.to).iter().filter(|&&he| he == edge.id).count();
            if listed_out != 1 || listed_in != 1 {
                return broken(format!("{:?} is not listed exactly once on its endpoints", edge.id));
            }
            if let Some(twin) = edge.twin {
                if !self.contains_halfedge(twin) {
                    return broken(format!("{:?} points at detached twin {:?}", edge.id, twin));
                }
                let other = self.halfedge(twin);
                if other.twin != Some(edge.id) || other.from != edge.to || other.to != edge.from {
                    return broken(format!("{:?} and {:?} are not mutual twins", edge.id, twin));
                }
            }
            if let Some(face) = edge.face {
                if !self.contains_face(face) || !self.face(face).halfedges.contains(&edge.id) {
                    return broken(format!("{:?} claims {:?} which does not use it", edge.id, face));
                }
            }
        }

        for face in &self.faces {
            if face.detached {
                if !face.halfedges.is_empty() {
                    return broken(format!("detached {:?} keeps its half-edges", face.id));
                }
                continue;
            }
            if face.halfedges.len() < 3 {
                return broken(format!("{:?} has fewer than 3 sides", face.id));
            }
            for (i, &he) in face.halfedges.iter().enumerate() {
                if !self.contains_halfedge(he) || self.face_of(he) != Some(face.id) {
                    return broken(format!("{:?} uses {:?} which does not point back", face.id, he));
                }
                let next = face.halfedges[(i + 1) % face.halfedges.len()];
                if self.to(he) != self.from(next) {
                    return broken(format!("{:?} is not a consecutive cycle", face.id));
                }
            }
        }

        Ok(())
    }

    /// Check if the mesh is valid (all connectivity is consistent).
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

fn check_handle<H: Debug>(
    tag: MeshTag,
    owner: MeshTag,
    handle: H,
    detached: Option<bool>,
) -> Result<()> {
    if owner != tag {
        return Err(MeshError::invalid_topology(format!(
            "{:?} belongs to {:?}, not {:?}",
            handle, owner, tag
        )));
    }
    match detached {
        Some(false) => Ok(()),
        Some(true) => Err(MeshError::invalid_topology(format!("{:?} is detached", handle))),
        None => Err(MeshError::invalid_topology(format!("{:?} does not exist", handle))),
    }
}

/// Index of `slot` in the arena of `kind`, if the index type can address it.
pub(crate) fn slot_index<I: MeshIndex>(kind: &'static str, slot: usize) -> Result<I> {
    I::try_from_usize(slot).ok_or(MeshError::IndexOverflow {
        kind,
        slot,
        max: I::MAX.to_usize() as u128 + 1,
    })
}
