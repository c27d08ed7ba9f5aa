//! End-to-end checks of mesh invariants across construction and rewrites.

use hedra::algo::dual::{geometric_dual, DualOptions};
use hedra::algo::filter::filter_faces;
use hedra::algo::subdivide::{subdivide_triangles, SubdivideOptions};
use hedra::algo::transform::VertexTransform;
use hedra::algo::triangulate::triangulate;
use hedra::prelude::*;
use hedra::primitives::{icosahedron, quad_cube};
use nalgebra::{Point3, Vector3};

fn square() -> (HalfEdgeMesh, Vec<VertexId>) {
    let mut mesh = HalfEdgeMesh::new();
    let v = mesh
        .add_vertices(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
        .unwrap();
    (mesh, v)
}

#[test]
fn test_halfedge_pairs_are_mutual_twins() {
    let mut mesh: HalfEdgeMesh = icosahedron().unwrap();
    let ids: Vec<VertexId> = mesh.vertex_ids().collect();

    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            let (ab, ba) = mesh.add_halfedge_pair(a, b).unwrap();
            assert_eq!(mesh.twin(ab), Some(ba));
            assert_eq!(mesh.twin(ba), Some(ab));
        }
    }
    assert!(mesh.is_valid());
}

#[test]
fn test_adjacency_is_symmetric() {
    let mut mesh: HalfEdgeMesh = icosahedron().unwrap();
    subdivide_triangles(&mut mesh, &SubdivideOptions::new(1)).unwrap();

    for a in mesh.face_ids() {
        for b in mesh.adjacent_faces(a) {
            assert!(mesh.adjacent_faces(b).contains(&a));
        }
    }
}

#[test]
fn test_quad_cube_counts() {
    let cube: HalfEdgeMesh = quad_cube().unwrap();

    assert_eq!(cube.num_vertices(), 8);
    assert_eq!(cube.num_halfedges(), 24);
    assert_eq!(cube.num_faces(), 6);
    for v in cube.vertices() {
        assert_eq!(v.outgoing().len(), 3);
        assert_eq!(v.incoming().len(), 3);
    }
    for f in cube.face_ids() {
        assert_eq!(cube.adjacent_faces(f).len(), 4);
    }
}

#[test]
fn test_triangulate_single_quad() {
    let (mut mesh, v) = square();
    mesh.add_face_by_vertices(&v).unwrap();

    let result = triangulate(&mesh).unwrap();
    assert_eq!(result.num_faces(), 2);
    assert!(result.is_triangle_mesh());
    assert_eq!(result.num_vertices(), 4);

    let before: Vec<Point3<f64>> = mesh.vertices().map(|v| v.position).collect();
    let after: Vec<Point3<f64>> = result.vertices().map(|v| v.position).collect();
    assert_eq!(before, after);
}

#[test]
fn test_subdivide_single_triangle() {
    let (mut mesh, v) = square();
    mesh.add_face_by_vertices(&v[..3]).unwrap();

    subdivide_triangles(&mut mesh, &SubdivideOptions::new(1)).unwrap();
    assert_eq!(mesh.num_faces(), 4);
    assert!(mesh.is_valid());
}

#[test]
fn test_subdivide_shares_midpoints() {
    let (mut mesh, v) = square();
    mesh.add_face_by_vertices(&[v[0], v[1], v[2]]).unwrap();
    mesh.add_face_by_vertices(&[v[0], v[2], v[3]]).unwrap();

    subdivide_triangles(&mut mesh, &SubdivideOptions::new(1)).unwrap();
    assert_eq!(mesh.num_faces(), 8);
    assert_eq!(mesh.num_vertices(), 9);
    assert_eq!(mesh.num_halfedges(), 24);

    // Exactly one vertex sits at the middle of the shared diagonal.
    let center = Point3::new(0.5, 0.5, 0.0);
    let at_center: Vec<VertexId> = mesh
        .vertex_ids()
        .filter(|&id| (mesh.position(id) - center).norm() < 1e-10)
        .collect();
    assert_eq!(at_center.len(), 1);
    assert_eq!(mesh.vertex_faces(at_center[0]).len(), 6);
}

#[test]
fn test_subdivide_rejects_polygons() {
    let (mut mesh, v) = square();
    mesh.add_face_by_vertices(&[v[0], v[1], v[2]]).unwrap();
    let quad_corner = mesh.add_vertex(Point3::new(2.0, 0.5, 0.0)).unwrap();
    mesh.add_face_by_vertices(&[v[1], quad_corner, v[3], v[2]]).unwrap();

    let counts = (mesh.num_vertices(), mesh.num_halfedges(), mesh.num_faces());
    let result = subdivide_triangles(&mut mesh, &SubdivideOptions::new(1));

    assert!(matches!(result, Err(MeshError::InvalidTopology { .. })));
    assert_eq!((mesh.num_vertices(), mesh.num_halfedges(), mesh.num_faces()), counts);
}

#[test]
fn test_dual_of_quad_cube() {
    let cube: HalfEdgeMesh = quad_cube().unwrap();
    let dual = geometric_dual(&cube, &DualOptions::default()).unwrap();

    assert_eq!(dual.num_vertices(), 6);
    assert_eq!(dual.num_faces(), 8);
    assert_eq!(dual.num_halfedges(), 24);
}

#[test]
fn test_filter_to_single_face() {
    let cube: HalfEdgeMesh = quad_cube().unwrap();
    let first = cube.face_ids().next().unwrap();
    let result = filter_faces(&cube, &FaceSelection::new([first])).unwrap();

    assert_eq!(result.num_vertices(), 4);
    assert_eq!(result.num_halfedges(), 4);
    assert_eq!(result.num_faces(), 1);
    assert!(result.halfedges().all(|he| he.twin().is_none()));

    // Nothing in the result points back into the cube.
    assert_ne!(result.tag(), cube.tag());
    for he in result.halfedges() {
        assert!(result.contains_vertex(he.from()));
        assert!(result.contains_vertex(he.to()));
    }
}

#[test]
fn test_transforms_keep_topology() {
    let cube: HalfEdgeMesh = quad_cube().unwrap();
    let factors = Vector3::new(2.0, 0.5, 3.0);
    let offset = Vector3::new(-1.0, 4.0, 0.25);

    let scaled = VertexTransform::Scale(factors).apply(&cube).unwrap();
    let moved = VertexTransform::Translate(offset).apply(&cube).unwrap();

    let before = cube.bounding_box().unwrap();
    for mesh in [&scaled, &moved] {
        assert_eq!(mesh.num_vertices(), cube.num_vertices());
        assert_eq!(mesh.num_halfedges(), cube.num_halfedges());
        assert_eq!(mesh.num_faces(), cube.num_faces());
        let mut adjacency: Vec<usize> =
            mesh.face_ids().map(|f| mesh.adjacent_faces(f).len()).collect();
        adjacency.dedup();
        assert_eq!(adjacency, vec![4]);
    }

    let scaled_box = scaled.bounding_box().unwrap();
    assert!((scaled_box.size() - before.size().component_mul(&factors)).norm() < 1e-10);

    let moved_box = moved.bounding_box().unwrap();
    assert!((moved_box.center() - (before.center() + offset)).norm() < 1e-10);
}

#[test]
fn test_detach_vertex_cascades() {
    let mut cube: HalfEdgeMesh = quad_cube().unwrap();
    let v = cube.vertex_ids().next().unwrap();
    let edges: Vec<HalfEdgeId> = cube.outgoing(v).iter().chain(cube.incoming(v)).copied().collect();
    let faces = cube.vertex_faces(v);

    cube.detach_vertex(v).unwrap();

    assert!(!cube.contains_vertex(v));
    assert!(edges.iter().all(|&he| !cube.contains_halfedge(he)));
    assert!(faces.iter().all(|&f| !cube.contains_face(f)));
    assert_eq!(cube.num_faces(), 3);

    // No live entity refers to anything detached.
    for he in cube.halfedges() {
        assert!(cube.contains_vertex(he.from()) && cube.contains_vertex(he.to()));
        if let Some(twin) = he.twin() {
            assert!(cube.contains_halfedge(twin));
        }
        if let Some(f) = he.face() {
            assert!(cube.contains_face(f));
        }
    }
    for f in cube.faces() {
        assert!(f.halfedges().iter().all(|&he| cube.contains_halfedge(he)));
    }
    assert!(cube.is_valid());
}

#[test]
fn test_clone_is_independent() {
    let cube: HalfEdgeMesh = quad_cube().unwrap();
    let mut copy = cube.clone();

    assert_eq!(copy.num_vertices(), cube.num_vertices());
    assert_eq!(copy.num_halfedges(), cube.num_halfedges());
    assert_eq!(copy.num_faces(), cube.num_faces());
    let twins = |m: &HalfEdgeMesh| m.halfedges().filter(|he| he.twin().is_some()).count();
    assert_eq!(twins(&copy), twins(&cube));

    let v = copy.vertex_ids().next().unwrap();
    copy.set_position(v, Point3::new(9.0, 9.0, 9.0));
    copy.detach_vertex(v).unwrap();

    assert_eq!(cube.num_vertices(), 8);
    assert_eq!(cube.num_faces(), 6);
    assert!(cube.vertices().all(|v| v.position.coords.norm() < 2.0));

    let mut source = cube.clone();
    let copy_again = source.clone();
    source.detach_all().unwrap();
    assert_eq!(source.num_vertices(), 0);
    assert_eq!(copy_again.num_faces(), 6);
    assert!(copy_again.is_valid());
}

#[test]
fn test_export_requires_triangles() {
    let cube: HalfEdgeMesh = quad_cube().unwrap();
    assert!(matches!(
        to_triangle_arrays(&cube),
        Err(MeshError::ExportPrecondition { sides: 4, .. })
    ));

    let triangles = triangulate(&cube).unwrap();
    let (vertices, indices) = to_triangle_arrays(&triangles).unwrap();
    assert_eq!(vertices.len(), 8);
    assert_eq!(indices.len(), 12);
}
