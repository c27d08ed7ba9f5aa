//! Geometric dual.
//!
//! The dual swaps the roles of vertices and faces: every face becomes a vertex
//! at its centroid, and every vertex becomes a face whose corners are the
//! centroids of the faces around it, taken in rotational order.
//!
//! # Rotational order
//!
//! Around a vertex `v`, the faces are visited by repeatedly crossing from the
//! current face to its neighbour: take the outgoing half-edge `e` of `v` in the
//! current face, find the half-edge of that face that ends at `v` (the one
//! just before `e`), and step to its twin, which is the next outgoing
//! half-edge of `v`. On a closed, consistently wound mesh this visits every
//! face around `v` once and returns to the start, and neighbouring dual faces
//! are wound consistently.
//!
//! # Boundaries
//!
//! At a boundary vertex the walk runs into a half-edge without a twin (or a
//! twin without a face). The walk then goes back to its starting face and
//! extends the fan in the opposite direction, producing an [`Fan::Open`] fan.
//! What happens to open fans is controlled by [`BoundaryPolicy`]. The walk
//! never takes more steps than `v` has outgoing half-edges, so it always
//! terminates, even on non-manifold input.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::error::Result;
use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

/// What to emit for a vertex whose faces do not close into a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// Emit a dual face through the open fan (when it has at least 3 faces).
    #[default]
    OpenFan,

    /// Emit nothing for boundary vertices.
    Skip,
}

/// Options for [`geometric_dual`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DualOptions {
    /// Treatment of vertices whose faces do not close into a cycle.
    pub boundary: BoundaryPolicy,
}

impl DualOptions {
    /// Default options: open fans become faces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the boundary policy.
    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }
}

/// The faces around a vertex in rotational order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fan<I: MeshIndex = u32> {
    /// The walk returned to its starting face.
    Closed(Vec<FaceId<I>>),

    /// The walk hit a boundary; faces run from one boundary side to the other.
    Open(Vec<FaceId<I>>),

    /// The vertex uses no face.
    Empty,
}

impl<I: MeshIndex> Fan<I> {
    /// The faces of the fan, in order.
    pub fn faces(&self) -> &[FaceId<I>] {
        match self {
            Fan::Closed(faces) | Fan::Open(faces) => faces,
            Fan::Empty => &[],
        }
    }

    /// Whether the walk came back to its start.
    pub fn is_closed(&self) -> bool {
        matches!(self, Fan::Closed(_))
    }
}

/// Walk the faces around a vertex.
pub fn vertex_fan<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, v: VertexId<I>) -> Fan<I> {
    let outgoing = mesh.outgoing(v);
    let start = match outgoing.iter().copied().find(|&he| mesh.face_of(he).is_some()) {
        Some(he) => he,
        None => return Fan::Empty,
    };

    let mut visited = HashSet::with_capacity(outgoing.len());
    let mut forward = Vec::with_capacity(outgoing.len());
    let mut current = start;

    for _ in 0..outgoing.len() {
        visited.insert(current);
        let Some(face) = mesh.face_of(current) else {
            break;
        };
        forward.push(face);

        match mesh.twin(previous_in_face(mesh, face, current)) {
            Some(next) if next == start => return Fan::Closed(forward),
            Some(next) if mesh.face_of(next).is_some() && !visited.contains(&next) => {
                current = next;
            }
            _ => break,
        }
    }

    // Open fan: extend backwards from the starting face.
    let mut backward = Vec::new();
    let mut current = start;
    for _ in 0..outgoing.len() {
        let Some(twin) = mesh.twin(current) else {
            break;
        };
        let Some(face) = mesh.face_of(twin) else {
            break;
        };
        let prev = next_in_face(mesh, face, twin);
        if !visited.insert(prev) {
            break;
        }
        backward.push(face);
        current = prev;
    }

    backward.reverse();
    backward.extend(forward);
    Fan::Open(backward)
}

/// The half-edge before `he` in the boundary cycle of `face`.
fn previous_in_face<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    face: FaceId<I>,
    he: HalfEdgeId<I>,
) -> HalfEdgeId<I> {
    let cycle = mesh.face_halfedges(face);
    let pos = cycle.iter().position(|&e| e == he).unwrap_or(0);
    cycle[(pos + cycle.len() - 1) % cycle.len()]
}

/// The half-edge after `he` in the boundary cycle of `face`.
fn next_in_face<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    face: FaceId<I>,
    he: HalfEdgeId<I>,
) -> HalfEdgeId<I> {
    let cycle = mesh.face_halfedges(face);
    let pos = cycle.iter().position(|&e| e == he).unwrap_or(0);
    cycle[(pos + 1) % cycle.len()]
}

/// Build the geometric dual of a mesh.
///
/// Dual vertices follow the source faces in creation order; dual faces follow
/// the source vertices in creation order. Fans with fewer than three faces
/// never produce a dual face.
pub fn geometric_dual<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    options: &DualOptions,
) -> Result<HalfEdgeMesh<I>> {
    let mut dual = HalfEdgeMesh::with_capacity(mesh.num_faces(), mesh.num_vertices());

    let face_to_vertex: HashMap<FaceId<I>, VertexId<I>> = mesh
        .face_ids()
        .map(|f| Ok((f, dual.add_vertex(mesh.face_centroid(f))?)))
        .collect::<Result<_>>()?;

    let mut open = 0;
    for v in mesh.vertex_ids() {
        let fan = vertex_fan(mesh, v);
        match (&fan, options.boundary) {
            (Fan::Empty, _) => continue,
            (Fan::Open(_), policy) => {
                open += 1;
                if policy == BoundaryPolicy::Skip {
                    continue;
                }
            }
            (Fan::Closed(_), _) => {}
        }

        if fan.faces().len() < 3 {
            continue;
        }
        let corners: Vec<VertexId<I>> = fan.faces().iter().map(|f| face_to_vertex[f]).collect();
        dual.add_face_by_vertices(&corners)?;
    }

    debug!(
        "dual: {} vertices, {} faces ({} boundary fans, policy {:?})",
        dual.num_vertices(),
        dual.num_faces(),
        open,
        options.boundary
    );
    Ok(dual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::subdivide::{subdivide_triangles, SubdivideOptions};
    use crate::mesh::build_from_triangles;
    use crate::primitives::{icosahedron, quad_cube, triangle_cube};
    use nalgebra::Point3;

    fn subdivided_triangle() -> HalfEdgeMesh {
        let vertices = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
        ];
        let mut mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
        subdivide_triangles(&mut mesh, &SubdivideOptions::new(1)).unwrap();
        mesh
    }

    #[test]
    fn test_dual_of_cube() {
        let cube: HalfEdgeMesh = quad_cube().unwrap();
        let dual = geometric_dual(&cube, &DualOptions::default()).unwrap();

        assert_eq!(dual.num_vertices(), 6);
        assert_eq!(dual.num_faces(), 8);
        assert_eq!(dual.num_halfedges(), 24);
        assert!(dual.is_triangle_mesh());
        assert!(dual.halfedges().all(|he| he.twin().is_some()));
        assert!(dual.is_valid());
    }

    #[test]
    fn test_dual_of_icosahedron_is_dodecahedron() {
        let mesh: HalfEdgeMesh = icosahedron().unwrap();
        let dual = geometric_dual(&mesh, &DualOptions::default()).unwrap();

        assert_eq!(dual.num_vertices(), 20);
        assert_eq!(dual.num_faces(), 12);
        assert_eq!(dual.num_halfedges(), 60);
        assert!(dual.faces().all(|f| f.sides() == 5));
    }

    #[test]
    fn test_dual_keeps_outward_winding() {
        let cube: HalfEdgeMesh = triangle_cube().unwrap();
        let dual = geometric_dual(&cube, &DualOptions::default()).unwrap();
        for f in dual.face_ids() {
            let outward = dual.face_centroid(f).coords;
            assert!(dual.face_normal(f).dot(&outward) > 0.0);
        }
    }

    #[test]
    fn test_closed_fan() {
        let cube: HalfEdgeMesh = quad_cube().unwrap();
        for v in cube.vertex_ids() {
            let fan = vertex_fan(&cube, v);
            assert!(fan.is_closed());
            assert_eq!(fan.faces().len(), 3);
        }
    }

    #[test]
    fn test_open_fans() {
        let mesh = subdivided_triangle();
        let fans: Vec<Fan> = mesh.vertex_ids().map(|v| vertex_fan(&mesh, v)).collect();

        // Original corners touch one face, edge midpoints touch three.
        assert_eq!(fans.iter().filter(|f| f.faces().len() == 1).count(), 3);
        assert_eq!(fans.iter().filter(|f| f.faces().len() == 3).count(), 3);
        assert!(fans.iter().all(|f| !f.is_closed()));
    }

    #[test]
    fn test_open_fan_order_is_rotational() {
        let mesh = subdivided_triangle();
        for v in mesh.vertex_ids() {
            let faces = vertex_fan(&mesh, v).faces().to_vec();
            for pair in faces.windows(2) {
                assert!(mesh.are_adjacent(pair[0], pair[1]));
            }
        }
    }

    #[test]
    fn test_boundary_policies() {
        let mesh = subdivided_triangle();

        let dual = geometric_dual(&mesh, &DualOptions::default()).unwrap();
        assert_eq!(dual.num_vertices(), 4);
        assert_eq!(dual.num_faces(), 3);
        assert_eq!(dual.num_halfedges(), 9);
        assert!(dual.is_valid());

        let skipped =
            geometric_dual(&mesh, &DualOptions::new().with_boundary(BoundaryPolicy::Skip)).unwrap();
        assert_eq!(skipped.num_vertices(), 4);
        assert_eq!(skipped.num_faces(), 0);
    }

    #[test]
    fn test_isolated_vertex() {
        let mut mesh: HalfEdgeMesh = quad_cube().unwrap();
        let lonely = mesh.add_vertex(Point3::new(5.0, 5.0, 5.0)).unwrap();
        assert_eq!(vertex_fan(&mesh, lonely), Fan::Empty);

        let dual = geometric_dual(&mesh, &DualOptions::default()).unwrap();
        assert_eq!(dual.num_faces(), 8);
    }
}
