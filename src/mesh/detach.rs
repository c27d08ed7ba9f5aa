//! Detaching mesh elements.
//!
//! Detaching removes an element together with every relationship that
//! references it:
//!
//! - a **vertex** takes all of its incoming and outgoing half-edges with it
//! - a **half-edge** takes its owning face with it and unpairs its twin
//! - a **face** frees its half-edges, and optionally detaches them too
//!
//! Every detach is idempotent. The relationships about to be cleared are
//! checked before anything changes, so an [`MeshError::InconsistentDetach`]
//! leaves the mesh as it was.

use log::trace;

use super::halfedge::HalfEdgeMesh;
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Detach a vertex and every half-edge (and so every face) touching it.
    pub fn detach_vertex(&mut self, v: VertexId<I>) -> Result<()> {
        self.check_owned(v.mesh(), v.index() < self.vertices.len(), v)?;
        if self.vertex(v).detached {
            return Ok(());
        }

        let edges: Vec<HalfEdgeId<I>> = {
            let vertex = self.vertex(v);
            vertex.incoming.iter().chain(vertex.outgoing.iter()).copied().collect()
        };
        for &he in &edges {
            self.check_halfedge_links(he)?;
        }

        for he in edges {
            self.detach_halfedge(he)?;
        }
        self.vertex_mut(v).detached = true;
        trace!("detached {:?}", v);
        Ok(())
    }

    /// Detach several vertices in order.
    pub fn detach_vertices(&mut self, vertices: &[VertexId<I>]) -> Result<()> {
        for &v in vertices {
            self.detach_vertex(v)?;
        }
        Ok(())
    }

    /// Detach a half-edge.
    ///
    /// The half-edge is removed from both endpoint lists, its twin is left
    /// unpaired and its owning face, if any, is detached (keeping the face's
    /// other half-edges).
    pub fn detach_halfedge(&mut self, he: HalfEdgeId<I>) -> Result<()> {
        self.check_owned(he.mesh(), he.index() < self.halfedges.len(), he)?;
        if self.halfedge(he).detached {
            return Ok(());
        }
        self.check_halfedge_links(he)?;

        if let Some(face) = self.face_of(he) {
            self.detach_face(face, false)?;
        }

        let edge = *self.halfedge(he);
        remove_handle(&mut self.vertex_mut(edge.from).outgoing, he);
        remove_handle(&mut self.vertex_mut(edge.to).incoming, he);
        if let Some(twin) = edge.twin {
            self.halfedge_mut(twin).twin = None;
        }

        let edge = self.halfedge_mut(he);
        edge.twin = None;
        edge.face = None;
        edge.detached = true;
        trace!("detached {:?}", he);
        Ok(())
    }

    /// Detach a face.
    ///
    /// The face's half-edges lose their face reference. With
    /// `remove_halfedges` they are detached as well.
    pub fn detach_face(&mut self, f: FaceId<I>, remove_halfedges: bool) -> Result<()> {
        self.check_owned(f.mesh(), f.index() < self.faces.len(), f)?;
        if self.face(f).detached {
            return Ok(());
        }

        for &he in self.face_halfedges(f) {
            if self.face_of(he) != Some(f) {
                return Err(MeshError::inconsistent_detach(format!(
                    "{:?} is not incident on {:?}",
                    he, f
                )));
            }
        }
        if remove_halfedges {
            for &he in self.face_halfedges(f) {
                self.check_halfedge_links(he)?;
            }
        }

        let halfedges = std::mem::take(&mut self.face_mut(f).halfedges);
        self.face_mut(f).detached = true;
        for &he in &halfedges {
            self.halfedge_mut(he).face = None;
        }
        trace!("detached {:?}", f);

        if remove_halfedges {
            for he in halfedges {
                self.detach_halfedge(he)?;
            }
        }
        Ok(())
    }

    /// Detach every half-edge and face, keeping all vertices.
    pub fn detach_all_halfedges_and_faces(&mut self) -> Result<()> {
        let halfedges: Vec<_> = self.halfedge_ids().collect();
        for he in halfedges {
            self.detach_halfedge(he)?;
        }
        Ok(())
    }

    /// Detach every face, keeping all vertices and half-edges.
    pub fn detach_all_faces(&mut self) -> Result<()> {
        let faces: Vec<_> = self.face_ids().collect();
        for f in faces {
            self.detach_face(f, false)?;
        }
        Ok(())
    }

    /// Detach every element of the mesh.
    pub fn detach_all(&mut self) -> Result<()> {
        let vertices: Vec<_> = self.vertex_ids().collect();
        self.detach_vertices(&vertices)
    }

    fn check_owned<H: std::fmt::Debug>(
        &self,
        owner: super::index::MeshTag,
        in_range: bool,
        handle: H,
    ) -> Result<()> {
        if owner != self.tag() {
            return Err(MeshError::invalid_topology(format!(
                "{:?} belongs to {:?}, not {:?}",
                handle,
                owner,
                self.tag()
            )));
        }
        if !in_range {
            return Err(MeshError::invalid_topology(format!("{:?} does not exist", handle)));
        }
        Ok(())
    }

    /// Verify the relationships detaching `he` is about to clear.
    fn check_halfedge_links(&self, he: HalfEdgeId<I>) -> Result<()> {
        let edge = self.halfedge(he);
        if edge.detached {
            return Ok(());
        }
        if !self.vertex(edge.from).outgoing.contains(&he) {
            return Err(MeshError::inconsistent_detach(format!(
                "{:?} is not an outgoing half-edge of {:?}",
                he, edge.from
            )));
        }
        if !self.vertex(edge.to).incoming.contains(&he) {
            return Err(MeshError::inconsistent_detach(format!(
                "{:?} is not an incoming half-edge of {:?}",
                he, edge.to
            )));
        }
        if let Some(twin) = edge.twin {
            if self.halfedge(twin).twin != Some(he) {
                return Err(MeshError::inconsistent_detach(format!(
                    "{:?} is not the twin of {:?}",
                    twin, he
                )));
            }
        }
        if let Some(face) = edge.face {
            if !self.face(face).halfedges.contains(&he) {
                return Err(MeshError::inconsistent_detach(format!(
                    "{:?} does not use {:?}",
                    face, he
                )));
            }
        }
        Ok(())
    }
}

fn remove_handle<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if let Some(pos) = list.iter().position(|x| *x == item) {
        list.remove(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn two_triangles() -> (HalfEdgeMesh, [VertexId; 4], [FaceId; 2]) {
        let mut mesh = HalfEdgeMesh::new();
        let v = mesh
            .add_vertices(&[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ])
            .unwrap();
        let f0 = mesh.add_face_by_vertices(&[v[0], v[1], v[2]]).unwrap();
        let f1 = mesh.add_face_by_vertices(&[v[0], v[2], v[3]]).unwrap();
        (mesh, [v[0], v[1], v[2], v[3]], [f0, f1])
    }

    #[test]
    fn test_detach_face_keeps_halfedges() {
        let (mut mesh, _, [f0, f1]) = two_triangles();
        let edges = mesh.face_halfedges(f0).to_vec();

        mesh.detach_face(f0, false).unwrap();
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_halfedges(), 6);
        assert!(mesh.face(f0).is_detached());
        assert!(mesh.face(f0).halfedges().is_empty());
        for he in edges {
            assert_eq!(mesh.face_of(he), None);
        }
        assert!(mesh.contains_face(f1));
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_detach_face_with_halfedges() {
        let (mut mesh, [v0, _, v2, _], [f0, f1]) = two_triangles();
        let diagonal = mesh.find_halfedge(v0, v2).unwrap();

        mesh.detach_face(f0, true).unwrap();
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_halfedges(), 3);
        // The shared edge's twin survives in f1 but is now unpaired.
        assert_eq!(mesh.twin(diagonal), None);
        assert_eq!(mesh.face_of(diagonal), Some(f1));
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_detach_halfedge_cascades_to_face() {
        let (mut mesh, [v0, v1, _, _], [f0, _]) = two_triangles();
        let he = mesh.find_halfedge(v0, v1).unwrap();

        mesh.detach_halfedge(he).unwrap();
        assert!(!mesh.contains_face(f0));
        assert_eq!(mesh.num_halfedges(), 5);
        assert!(!mesh.outgoing(v0).contains(&he));
        assert!(!mesh.incoming(v1).contains(&he));
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_detach_vertex_cascades() {
        let (mut mesh, [v0, v1, v2, v3], _) = two_triangles();

        mesh.detach_vertex(v0).unwrap();
        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_faces(), 0);
        // Only the half-edges v1 -> v2 and v2 -> v3 survive.
        assert_eq!(mesh.num_halfedges(), 2);
        assert!(mesh.find_halfedge(v1, v2).is_some());
        assert!(mesh.find_halfedge(v2, v3).is_some());
        for he in mesh.halfedge_ids() {
            assert_ne!(mesh.from(he), v0);
            assert_ne!(mesh.to(he), v0);
        }
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_detach_is_idempotent() {
        let (mut mesh, [v0, _, _, _], [f0, _]) = two_triangles();
        mesh.detach_face(f0, true).unwrap();
        mesh.detach_face(f0, true).unwrap();
        mesh.detach_vertex(v0).unwrap();
        mesh.detach_vertex(v0).unwrap();
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_detach_all() {
        let (mut mesh, _, _) = two_triangles();
        mesh.detach_all().unwrap();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_halfedges(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_detach_all_halfedges_and_faces() {
        let (mut mesh, _, _) = two_triangles();
        mesh.detach_all_halfedges_and_faces().unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_halfedges(), 0);
        assert_eq!(mesh.num_faces(), 0);
        for v in mesh.vertices() {
            assert!(v.outgoing().is_empty() && v.incoming().is_empty());
        }
    }

    #[test]
    fn test_detach_all_faces() {
        let (mut mesh, _, _) = two_triangles();
        mesh.detach_all_faces().unwrap();
        assert_eq!(mesh.num_faces(), 0);
        assert_eq!(mesh.num_halfedges(), 6);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_inconsistent_detach_leaves_mesh_untouched() {
        let (mut mesh, [v0, v1, _, _], [f0, _]) = two_triangles();
        let he = mesh.find_halfedge(v0, v1).unwrap();
        mesh.vertex_mut(v0).outgoing.retain(|&x| x != he);

        let result = mesh.detach_face(f0, true);
        assert!(matches!(result, Err(MeshError::InconsistentDetach { .. })));
        assert!(mesh.contains_face(f0));
        assert_eq!(mesh.face_of(he), Some(f0));
    }

    #[test]
    fn test_detach_foreign_handle() {
        let (mut a, _, _) = two_triangles();
        let (_, [v, _, _, _], _) = two_triangles();
        let result = a.detach_vertex(v);
        assert!(matches!(result, Err(MeshError::InvalidTopology { .. })));
        assert_eq!(a.num_vertices(), 4);
    }
}
