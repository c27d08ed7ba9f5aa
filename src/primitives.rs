//! Primitive meshes.
//!
//! Closed, consistently wound meshes that serve as starting points for
//! operation pipelines and as test fixtures.

use nalgebra::Point3;

use crate::error::Result;
use crate::mesh::{build_from_polygons, HalfEdgeMesh, MeshIndex};

/// Corners of the unit cube centred at the origin, top ring first.
fn cube_corners() -> [Point3<f64>; 8] {
    [
        Point3::new(0.5, 0.5, -0.5),
        Point3::new(-0.5, 0.5, -0.5),
        Point3::new(-0.5, 0.5, 0.5),
        Point3::new(0.5, 0.5, 0.5),
        Point3::new(0.5, -0.5, -0.5),
        Point3::new(-0.5, -0.5, -0.5),
        Point3::new(-0.5, -0.5, 0.5),
        Point3::new(0.5, -0.5, 0.5),
    ]
}

/// A unit cube made of six quads.
///
/// 8 vertices, 24 half-edges (all paired), 6 faces.
pub fn quad_cube<I: MeshIndex>() -> Result<HalfEdgeMesh<I>> {
    let faces = [
        [0, 1, 2, 3],
        [3, 2, 6, 7],
        [4, 0, 3, 7],
        [4, 5, 1, 0],
        [1, 5, 6, 2],
        [7, 6, 5, 4],
    ];
    build_from_polygons(&cube_corners(), &faces)
}

/// A unit cube made of twelve triangles.
///
/// Built edge-first: every edge is created as an explicit half-edge pair and
/// the faces are then assembled from those half-edges.
/// 8 vertices, 36 half-edges, 12 faces.
pub fn triangle_cube<I: MeshIndex>() -> Result<HalfEdgeMesh<I>> {
    let mut mesh = HalfEdgeMesh::with_capacity(8, 12);
    let v = mesh.add_vertices(&cube_corners())?;

    // Top ring, vertical sides, bottom ring, then one diagonal per quad.
    let (v0v1, v1v0) = mesh.add_halfedge_pair(v[0], v[1])?;
    let (v1v2, v2v1) = mesh.add_halfedge_pair(v[1], v[2])?;
    let (v2v3, v3v2) = mesh.add_halfedge_pair(v[2], v[3])?;
    let (v3v0, v0v3) = mesh.add_halfedge_pair(v[3], v[0])?;

    let (v3v7, v7v3) = mesh.add_halfedge_pair(v[3], v[7])?;
    let (v2v6, v6v2) = mesh.add_halfedge_pair(v[2], v[6])?;
    let (v1v5, v5v1) = mesh.add_halfedge_pair(v[1], v[5])?;
    let (v0v4, v4v0) = mesh.add_halfedge_pair(v[0], v[4])?;

    let (v7v6, v6v7) = mesh.add_halfedge_pair(v[7], v[6])?;
    let (v6v5, v5v6) = mesh.add_halfedge_pair(v[6], v[5])?;
    let (v5v4, v4v5) = mesh.add_halfedge_pair(v[5], v[4])?;
    let (v4v7, v7v4) = mesh.add_halfedge_pair(v[4], v[7])?;

    let (v2v0, v0v2) = mesh.add_halfedge_pair(v[2], v[0])?;
    let (v5v7, v7v5) = mesh.add_halfedge_pair(v[5], v[7])?;
    let (v3v6, v6v3) = mesh.add_halfedge_pair(v[3], v[6])?;
    let (v4v3, v3v4) = mesh.add_halfedge_pair(v[4], v[3])?;
    let (v4v1, v1v4) = mesh.add_halfedge_pair(v[4], v[1])?;
    let (v1v6, v6v1) = mesh.add_halfedge_pair(v[1], v[6])?;

    // Top
    mesh.add_face(&[v0v1, v1v2, v2v0])?;
    mesh.add_face(&[v0v2, v2v3, v3v0])?;
    // +Z side
    mesh.add_face(&[v3v2, v2v6, v6v3])?;
    mesh.add_face(&[v3v6, v6v7, v7v3])?;
    // +X side
    mesh.add_face(&[v4v0, v0v3, v3v4])?;
    mesh.add_face(&[v4v3, v3v7, v7v4])?;
    // -Z side
    mesh.add_face(&[v4v5, v5v1, v1v4])?;
    mesh.add_face(&[v4v1, v1v0, v0v4])?;
    // -X side
    mesh.add_face(&[v1v5, v5v6, v6v1])?;
    mesh.add_face(&[v1v6, v6v2, v2v1])?;
    // Bottom
    mesh.add_face(&[v7v6, v6v5, v5v7])?;
    mesh.add_face(&[v7v5, v5v4, v4v7])?;

    Ok(mesh)
}

/// A regular icosahedron with circumradius `sqrt(1 + phi^2)`.
///
/// 12 vertices, 60 half-edges, 20 triangles.
pub fn icosahedron<I: MeshIndex>() -> Result<HalfEdgeMesh<I>> {
    const PHI: f64 = 1.618_033_99;

    let vertices = [
        Point3::new(1.0, PHI, 0.0),
        Point3::new(-1.0, PHI, 0.0),
        Point3::new(1.0, -PHI, 0.0),
        Point3::new(-1.0, -PHI, 0.0),
        Point3::new(0.0, 1.0, PHI),
        Point3::new(0.0, -1.0, PHI),
        Point3::new(0.0, 1.0, -PHI),
        Point3::new(0.0, -1.0, -PHI),
        Point3::new(PHI, 0.0, 1.0),
        Point3::new(-PHI, 0.0, 1.0),
        Point3::new(PHI, 0.0, -1.0),
        Point3::new(-PHI, 0.0, -1.0),
    ];
    let faces = [
        [0, 1, 4],
        [1, 9, 4],
        [4, 9, 5],
        [5, 9, 3],
        [2, 3, 7],
        [3, 2, 5],
        [7, 10, 2],
        [0, 8, 10],
        [0, 4, 8],
        [8, 2, 10],
        [8, 4, 5],
        [8, 5, 2],
        [1, 0, 6],
        [11, 1, 6],
        [3, 9, 11],
        [6, 10, 7],
        [3, 11, 7],
        [11, 6, 7],
        [6, 0, 10],
        [9, 1, 11],
    ];
    build_from_polygons(&vertices, &faces)
}
