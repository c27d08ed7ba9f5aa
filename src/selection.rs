//! Face and vertex selections.
//!
//! A selection is an immutable, order-preserving set of element handles used
//! to scope an operation. Combining selections always produces a new one.

use std::collections::HashSet;
use std::ops::Add;

use crate::error::{MeshError, Result};
use crate::mesh::{ElementMap, FaceId, HalfEdgeMesh, MeshIndex, VertexId};

/// An ordered, duplicate-free set of faces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceSelection<I: MeshIndex = u32> {
    faces: Vec<FaceId<I>>,
}

impl<I: MeshIndex> FaceSelection<I> {
    /// Create a selection; later duplicates are dropped.
    pub fn new(faces: impl IntoIterator<Item = FaceId<I>>) -> Self {
        let mut seen = HashSet::new();
        Self {
            faces: faces.into_iter().filter(|&f| seen.insert(f)).collect(),
        }
    }

    /// Select every attached face of a mesh, in creation order.
    pub fn all(mesh: &HalfEdgeMesh<I>) -> Self {
        Self {
            faces: mesh.face_ids().collect(),
        }
    }

    /// Select faces by their position in the mesh's face listing.
    ///
    /// # Errors
    /// [`MeshError::InvalidParameter`] if a position is past the last face.
    pub fn from_positions(mesh: &HalfEdgeMesh<I>, positions: &[usize]) -> Result<Self> {
        let faces: Vec<FaceId<I>> = mesh.face_ids().collect();
        positions
            .iter()
            .map(|&i| {
                faces
                    .get(i)
                    .copied()
                    .ok_or_else(|| MeshError::invalid_param("face", i, "no face at this position"))
            })
            .collect()
    }

    /// The selected faces in order.
    pub fn faces(&self) -> &[FaceId<I>] {
        &self.faces
    }

    /// Iterate over the selected faces in order.
    pub fn iter(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.faces.iter().copied()
    }

    /// Number of selected elements.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Whether a face is selected.
    pub fn contains(&self, f: FaceId<I>) -> bool {
        self.faces.contains(&f)
    }

    /// This selection followed by the faces of `other` not already in it.
    pub fn union(&self, other: &Self) -> Self {
        self.union_with(other.iter())
    }

    fn union_with(&self, faces: impl IntoIterator<Item = FaceId<I>>) -> Self {
        Self::new(self.iter().chain(faces))
    }

    /// Extend the selection by every face adjacent to a selected face.
    pub fn grow(&self, mesh: &HalfEdgeMesh<I>) -> Self {
        let adjacent: Vec<FaceId<I>> = self
            .iter()
            .filter(|&f| mesh.contains_face(f))
            .flat_map(|f| mesh.adjacent_faces(f))
            .collect();
        self.union_with(adjacent)
    }

    /// The distinct corners of the selected faces, in first-seen order.
    pub fn vertices(&self, mesh: &HalfEdgeMesh<I>) -> VertexSelection<I> {
        VertexSelection::new(self.iter().flat_map(|f| mesh.face_vertices(f)))
    }

    /// Fail with [`MeshError::InvalidTopology`] unless every selected face is
    /// attached to `mesh`.
    pub(crate) fn ensure_attached(&self, mesh: &HalfEdgeMesh<I>) -> Result<()> {
        self.iter().try_for_each(|f| mesh.check_face(f))
    }

    /// Carry the selection over to a rebuilt copy; unmapped faces are dropped.
    pub fn remap(&self, map: &ElementMap<I>) -> Self {
        Self {
            faces: self.iter().filter_map(|f| map.face(f)).collect(),
        }
    }
}

impl<I: MeshIndex> FromIterator<FaceId<I>> for FaceSelection<I> {
    fn from_iter<T: IntoIterator<Item = FaceId<I>>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// An ordered, duplicate-free set of vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexSelection<I: MeshIndex = u32> {
    vertices: Vec<VertexId<I>>,
}

impl<I: MeshIndex> VertexSelection<I> {
    /// Create a selection; later duplicates are dropped.
    pub fn new(vertices: impl IntoIterator<Item = VertexId<I>>) -> Self {
        let mut seen = HashSet::new();
        Self {
            vertices: vertices.into_iter().filter(|&v| seen.insert(v)).collect(),
        }
    }

    /// Select every attached vertex of a mesh, in creation order.
    pub fn all(mesh: &HalfEdgeMesh<I>) -> Self {
        Self {
            vertices: mesh.vertex_ids().collect(),
        }
    }

    /// The selected vertices in order.
    pub fn vertices(&self) -> &[VertexId<I>] {
        &self.vertices
    }

    /// Iterate over the selected vertices in order.
    pub fn iter(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertices.iter().copied()
    }

    /// Number of selected elements.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Whether a vertex is selected.
    pub fn contains(&self, v: VertexId<I>) -> bool {
        self.vertices.contains(&v)
    }

    /// A new selection with `vertices` appended (skipping ones already present).
    pub fn with(&self, vertices: &[VertexId<I>]) -> Self {
        Self::new(self.iter().chain(vertices.iter().copied()))
    }
}

impl<I: MeshIndex> Add<VertexId<I>> for VertexSelection<I> {
    type Output = Self;

    fn add(self, v: VertexId<I>) -> Self {
        self.with(&[v])
    }
}

impl<I: MeshIndex> FromIterator<VertexId<I>> for VertexSelection<I> {
    fn from_iter<T: IntoIterator<Item = VertexId<I>>>(iter: T) -> Self {
        Self::new(iter)
    }
}
