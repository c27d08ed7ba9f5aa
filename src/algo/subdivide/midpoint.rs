//! Midpoint subdivision for triangle meshes.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::algo::Progress;
use crate::error::{MeshError, Result};
use crate::mesh::{slot_index, FaceId, HalfEdgeMesh, MeshIndex, VertexId};

use super::SubdivideOptions;

/// Subdivide every triangle of a mesh in place.
///
/// # Errors
/// [`MeshError::InvalidTopology`] if any face is not a triangle.
/// [`MeshError::IndexOverflow`] if the requested levels need more slots than
/// the index type can address. Both checks run before anything is created, so
/// the mesh is left untouched.
pub fn subdivide_triangles<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &SubdivideOptions,
) -> Result<()> {
    subdivide_triangles_with_progress(mesh, options, &Progress::none())
}

/// Midpoint subdivision with progress reporting (one step per level).
pub fn subdivide_triangles_with_progress<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &SubdivideOptions,
    progress: &Progress,
) -> Result<()> {
    if let Some(face) = mesh.faces().find(|f| !f.is_triangle()) {
        return Err(MeshError::invalid_topology(format!(
            "cannot subdivide {:?}: it has {} sides, only triangles can be subdivided",
            face.id(),
            face.sides()
        )));
    }
    ensure_capacity(mesh, options.levels)?;

    for level in 0..options.levels {
        progress.report(level, options.levels, "Midpoint subdivision");
        subdivide_once(mesh)?;
        debug!(
            "subdivision level {}: {} vertices, {} faces",
            level + 1,
            mesh.num_vertices(),
            mesh.num_faces()
        );
    }
    progress.report(options.levels, options.levels, "Midpoint subdivision");
    Ok(())
}

fn subdivide_once<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> Result<()> {
    // Snapshot every triangle before touching any of them so that both faces
    // on an edge see the same midpoint.
    let triangles: Vec<(FaceId<I>, [VertexId<I>; 3])> = mesh
        .face_ids()
        .map(|f| {
            let c: Vec<VertexId<I>> = mesh.face_vertices(f).collect();
            (f, [c[0], c[1], c[2]])
        })
        .collect();

    let mut midpoints: HashMap<(VertexId<I>, VertexId<I>), VertexId<I>> =
        HashMap::with_capacity(triangles.len() * 3 / 2);

    for (face, [a, b, c]) in triangles {
        let mab = midpoint(mesh, &mut midpoints, a, b)?;
        let mbc = midpoint(mesh, &mut midpoints, b, c)?;
        let mca = midpoint(mesh, &mut midpoints, c, a)?;

        mesh.add_face_by_vertices(&[a, mab, mca])?;
        mesh.add_face_by_vertices(&[mab, b, mbc])?;
        mesh.add_face_by_vertices(&[mca, mab, mbc])?;
        mesh.add_face_by_vertices(&[mca, mbc, c])?;

        mesh.detach_face(face, true)?;
    }

    Ok(())
}

/// Get or create the vertex halfway along the edge `a`-`b`.
fn midpoint<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    cache: &mut HashMap<(VertexId<I>, VertexId<I>), VertexId<I>>,
    a: VertexId<I>,
    b: VertexId<I>,
) -> Result<VertexId<I>> {
    let key = if a < b { (a, b) } else { (b, a) };
    if let Some(&m) = cache.get(&key) {
        return Ok(m);
    }
    let m = mesh.add_vertex(nalgebra::center(mesh.position(a), mesh.position(b)))?;
    cache.insert(key, m);
    Ok(m)
}

/// Check that `levels` rounds fit the index type.
///
/// Each round adds one vertex per edge, four faces and twelve half-edges per
/// triangle; edges become `2E + 3T` and triangles `4T`.
fn ensure_capacity<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, levels: usize) -> Result<()> {
    let mut triangles = mesh.num_faces();
    let mut edges = mesh
        .face_ids()
        .flat_map(|f| mesh.face_halfedges(f).iter().copied())
        .map(|he| {
            let (a, b) = (mesh.from(he), mesh.to(he));
            if a < b { (a, b) } else { (b, a) }
        })
        .collect::<HashSet<_>>()
        .len();

    let mut vertex_slots = mesh.vertices.len();
    let mut halfedge_slots = mesh.halfedges.len();
    let mut face_slots = mesh.faces.len();
    for _ in 0..levels {
        vertex_slots = vertex_slots.saturating_add(edges);
        halfedge_slots = halfedge_slots.saturating_add(triangles.saturating_mul(12));
        face_slots = face_slots.saturating_add(triangles.saturating_mul(4));
        edges = edges.saturating_mul(2).saturating_add(triangles.saturating_mul(3));
        triangles = triangles.saturating_mul(4);
    }

    let needed = [
        ("vertex", vertex_slots),
        ("half-edge", halfedge_slots),
        ("face", face_slots),
    ];
    for (kind, slots) in needed {
        if let Some(last) = slots.checked_sub(1) {
            slot_index::<I>(kind, last)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_polygons, build_from_triangles};
    use crate::primitives::{icosahedron, quad_cube};
    use nalgebra::Point3;

    fn square_vertices() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_single_triangle() {
        let vertices = square_vertices();
        let mut mesh: HalfEdgeMesh = build_from_triangles(&vertices[..3], &[[0, 1, 2]]).unwrap();
        subdivide_triangles(&mut mesh, &SubdivideOptions::new(1)).unwrap();

        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.num_vertices(), 6);
        assert_eq!(mesh.num_halfedges(), 12);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_shared_edge_midpoint() {
        let mut mesh: HalfEdgeMesh =
            build_from_triangles(&square_vertices(), &[[0, 1, 2], [0, 2, 3]]).unwrap();
        subdivide_triangles(&mut mesh, &SubdivideOptions::default()).unwrap();

        assert_eq!(mesh.num_faces(), 8);
        assert_eq!(mesh.num_vertices(), 9);
        assert_eq!(mesh.num_halfedges(), 24);

        // Exactly one vertex sits at the middle of the shared diagonal.
        let center = Point3::new(0.5, 0.5, 0.0);
        let at_center: Vec<_> = mesh
            .vertices()
            .filter(|v| (v.position - center).norm() < 1e-10)
            .collect();
        assert_eq!(at_center.len(), 1);
        assert_eq!(mesh.vertex_faces(at_center[0].id()).len(), 6);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_non_triangle_fails_cleanly() {
        let mut mesh: HalfEdgeMesh =
            build_from_polygons(&square_vertices(), &[[0, 1, 2, 3]]).unwrap();
        let result = subdivide_triangles(&mut mesh, &SubdivideOptions::new(1));

        assert!(matches!(result, Err(MeshError::InvalidTopology { .. })));
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_halfedges(), 4);
        assert_eq!(mesh.num_faces(), 1);

        let mut cube: HalfEdgeMesh = quad_cube().unwrap();
        assert!(subdivide_triangles(&mut cube, &SubdivideOptions::new(1)).is_err());
        assert_eq!(cube.num_vertices(), 8);
    }

    #[test]
    fn test_multiple_levels_closed() {
        let mut mesh: HalfEdgeMesh = icosahedron().unwrap();
        subdivide_triangles(&mut mesh, &SubdivideOptions::new(2)).unwrap();

        // V - E + F = 2 on every level.
        assert_eq!(mesh.num_faces(), 320);
        assert_eq!(mesh.num_halfedges(), 960);
        assert_eq!(mesh.num_vertices(), 162);
        assert!(mesh.halfedges().all(|he| he.twin().is_some()));
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_small_index_overflow_is_reported() {
        let mut mesh: HalfEdgeMesh<u16> = icosahedron().unwrap();

        // Level 5 needs 81,900 half-edge slots; u16 addresses 65,536.
        let result = subdivide_triangles(&mut mesh, &SubdivideOptions::new(5));
        assert!(matches!(
            result,
            Err(MeshError::IndexOverflow { kind: "half-edge", max: 65_536, .. })
        ));
        assert_eq!(mesh.num_faces(), 20);
        assert_eq!(mesh.num_vertices(), 12);
        assert_eq!(mesh.num_halfedges(), 60);

        subdivide_triangles(&mut mesh, &SubdivideOptions::new(4)).unwrap();
        assert_eq!(mesh.num_faces(), 20 * 256);
        assert!(mesh.halfedges().all(|he| he.twin().is_some()));
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_zero_levels() {
        let mut mesh: HalfEdgeMesh = icosahedron().unwrap();
        subdivide_triangles(&mut mesh, &SubdivideOptions::new(0)).unwrap();
        assert_eq!(mesh.num_faces(), 20);
    }

    #[test]
    fn test_progress_reports_levels() {
        use std::sync::{Arc, Mutex};

        let steps = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&steps);
        let progress = Progress::new(move |current, total, _| {
            sink.lock().unwrap().push((current, total));
        });

        let mut mesh: HalfEdgeMesh = icosahedron().unwrap();
        subdivide_triangles_with_progress(&mut mesh, &SubdivideOptions::new(2), &progress)
            .unwrap();
        assert_eq!(*steps.lock().unwrap(), vec![(0, 2), (1, 2), (2, 2)]);
    }
}
