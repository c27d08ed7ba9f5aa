//! Fan triangulation.
//!
//! Every face with more than three sides is replaced by a fan from its first
//! corner: corners `[p0, p1, ..., pn-1]` become triangles `(p0, p1, p2)`,
//! `(p0, p2, p3)`, ..., `(p0, pn-2, pn-1)`. Triangles pass through unchanged.
//! Fans are exact for convex faces only.

use log::debug;

use crate::error::Result;
use crate::mesh::{FaceId, HalfEdgeMesh, MeshIndex, VertexId};

/// Build a triangulated copy of a mesh.
///
/// All live vertices are copied in order, so vertex `i` of the source is
/// vertex `i` of the result, and every face is rebuilt from its corners.
/// Half-edges that no face used in the source are not carried over.
pub fn triangulate<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Result<HalfEdgeMesh<I>> {
    let mut result = HalfEdgeMesh::with_capacity(mesh.num_vertices(), mesh.num_faces() * 2);
    let mut vertex_map = std::collections::HashMap::with_capacity(mesh.num_vertices());
    for vertex in mesh.vertices() {
        vertex_map.insert(vertex.id(), result.add_vertex(vertex.position)?);
    }

    for f in mesh.face_ids() {
        let corners: Vec<VertexId<I>> = mesh.face_vertices(f).map(|v| vertex_map[&v]).collect();
        for triangle in fan(&corners) {
            result.add_face_by_vertices(&triangle)?;
        }
    }

    debug!(
        "triangulated {} faces into {} triangles",
        mesh.num_faces(),
        result.num_faces()
    );
    Ok(result)
}

/// Triangulate a mesh in place, returning the number of faces that were split.
///
/// Each polygon is detached (keeping its half-edges) and the fan triangles are
/// added over the freed boundary edges plus new diagonals.
pub fn triangulate_in_place<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> Result<usize> {
    let polygons: Vec<(FaceId<I>, Vec<VertexId<I>>)> = mesh
        .faces()
        .filter(|face| !face.is_triangle())
        .map(|face| (face.id(), mesh.face_vertices(face.id()).collect()))
        .collect();

    for (f, corners) in &polygons {
        mesh.detach_face(*f, false)?;
        for triangle in fan(corners) {
            mesh.add_face_by_vertices(&triangle)?;
        }
    }

    debug!("triangulated {} polygons in place", polygons.len());
    Ok(polygons.len())
}

fn fan<V: Copy>(corners: &[V]) -> impl Iterator<Item = [V; 3]> + '_ {
    (2..corners.len()).map(move |i| [corners[0], corners[i - 1], corners[i]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_polygons;
    use crate::primitives::{icosahedron, quad_cube};
    use nalgebra::Point3;

    fn single_quad() -> HalfEdgeMesh {
        let vertices = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_polygons(&vertices, &[[0, 1, 2, 3]]).unwrap()
    }

    #[test]
    fn test_quad_becomes_two_triangles() {
        let quad = single_quad();
        let result = triangulate(&quad).unwrap();

        assert_eq!(result.num_faces(), 2);
        assert_eq!(result.num_vertices(), 4);
        assert_eq!(result.num_halfedges(), 6);
        assert!(result.is_triangle_mesh());
        for (a, b) in quad.vertices().zip(result.vertices()) {
            assert_eq!(a.position, b.position);
        }
        assert!((result.surface_area() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_fan_order() {
        let quad = single_quad();
        let result = triangulate(&quad).unwrap();
        let v: Vec<_> = result.vertex_ids().collect();
        let faces: Vec<Vec<_>> = result
            .face_ids()
            .map(|f| result.face_vertices(f).collect())
            .collect();
        assert_eq!(faces, vec![vec![v[0], v[1], v[2]], vec![v[0], v[2], v[3]]]);
    }

    #[test]
    fn test_triangulate_cube() {
        let cube: HalfEdgeMesh = quad_cube().unwrap();
        let result = triangulate(&cube).unwrap();
        assert_eq!(result.num_vertices(), 8);
        assert_eq!(result.num_faces(), 12);
        assert_eq!(result.num_halfedges(), 36);
        assert!(result.halfedges().all(|he| he.twin().is_some()));
        assert!(result.is_valid());
    }

    #[test]
    fn test_triangles_pass_through() {
        let mesh: HalfEdgeMesh = icosahedron().unwrap();
        let result = triangulate(&mesh).unwrap();
        assert_eq!(result.num_faces(), 20);
        assert_eq!(result.num_halfedges(), 60);
    }

    #[test]
    fn test_in_place() {
        let mut cube: HalfEdgeMesh = quad_cube().unwrap();
        let split = triangulate_in_place(&mut cube).unwrap();

        assert_eq!(split, 6);
        assert_eq!(cube.num_vertices(), 8);
        assert_eq!(cube.num_faces(), 12);
        assert_eq!(cube.num_halfedges(), 36);
        assert!(cube.is_triangle_mesh());
        assert!(cube.is_valid());
        assert_eq!(triangulate_in_place(&mut cube).unwrap(), 0);
    }
}
