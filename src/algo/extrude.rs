//! Spherical extrusion.
//!
//! Extrusion lifts a patch of faces away from the origin. Every corner of the
//! selection gets a displaced copy at `direction * (|p| + distance)`, each
//! selected face is replaced by a cap over the displaced corners, and every
//! boundary edge of the patch gets a quad wall joining the old and new rims.
//!
//! ```text
//!   before                 after (side view)
//!
//!                          d(a)-----d(b)      cap
//!                           |         |
//!   a--------b              |         |       walls
//!   |  face  |              a         b
//! ```
//!
//! Edges shared by two selected faces end up inside the raised patch; they are
//! detached once the walls exist.

use std::collections::{HashMap, HashSet};

use log::debug;
use nalgebra::Point3;

use super::transform::direction;
use crate::error::{MeshError, Result};
use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};
use crate::selection::FaceSelection;

/// Extrude the selected faces in place by a signed radial distance.
///
/// # Errors
/// - [`MeshError::InvalidParameter`] if `distance` is not finite
/// - [`MeshError::InvalidTopology`] if a selected face is not attached to `mesh`
/// - [`MeshError::InvalidTopology`] if two selected faces meet only at a
///   corner: both would need the wall edge `v -> d(v)` above that corner
///
/// These checks run before anything changes. [`MeshError::IndexOverflow`] may
/// surface part-way through and leave the extrusion incomplete.
pub fn spherical_extrude<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    selection: &FaceSelection<I>,
    distance: f64,
) -> Result<()> {
    if !distance.is_finite() {
        return Err(MeshError::invalid_param("distance", distance, "must be finite"));
    }
    selection.ensure_attached(mesh)?;

    let internal = internal_halfedges(mesh, selection);
    ensure_single_rim(mesh, selection, &internal)?;

    // Read everything from the original faces up front.
    let faces: Vec<(FaceId<I>, Vec<VertexId<I>>, Vec<HalfEdgeId<I>>)> = selection
        .iter()
        .map(|f| {
            (
                f,
                mesh.face_vertices(f).collect(),
                mesh.face_halfedges(f).to_vec(),
            )
        })
        .collect();

    let mut displaced: HashMap<VertexId<I>, VertexId<I>> = HashMap::new();
    let mut walls = 0;

    for (face, corners, halfedges) in &faces {
        let cap: Vec<VertexId<I>> = corners
            .iter()
            .map(|&v| displaced_vertex(mesh, &mut displaced, v, distance))
            .collect::<Result<_>>()?;
        mesh.add_face_by_vertices(&cap)?;

        let sides: Vec<[VertexId<I>; 4]> = halfedges
            .iter()
            .filter(|he| !internal.contains(*he))
            .map(|&he| {
                let (from, to) = (mesh.from(he), mesh.to(he));
                [from, to, displaced[&to], displaced[&from]]
            })
            .collect();

        // Free the rim edges so the walls can take them over.
        mesh.detach_face(*face, false)?;

        for side in &sides {
            mesh.add_face_by_vertices(side)?;
        }
        walls += sides.len();
    }

    for &he in &internal {
        mesh.detach_halfedge(he)?;
    }

    debug!(
        "extruded {} faces by {}: {} new vertices, {} walls, {} internal half-edges removed",
        selection.len(),
        distance,
        displaced.len(),
        walls,
        internal.len()
    );
    Ok(())
}

/// Half-edges of the selection whose twin also belongs to a selected face.
fn internal_halfedges<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    selection: &FaceSelection<I>,
) -> Vec<HalfEdgeId<I>> {
    let selected: HashSet<HalfEdgeId<I>> = selection
        .iter()
        .flat_map(|f| mesh.face_halfedges(f).iter().copied())
        .collect();

    selection
        .iter()
        .flat_map(|f| mesh.face_halfedges(f).iter().copied())
        .filter(|&he| mesh.twin(he).is_some_and(|twin| selected.contains(&twin)))
        .collect()
}

/// Reject selections whose boundary enters some vertex more than once.
///
/// Each boundary half-edge `a -> b` gets a wall that owns `b -> d(b)`, so a
/// second boundary half-edge into `b` would claim the same wall edge.
fn ensure_single_rim<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    selection: &FaceSelection<I>,
    internal: &[HalfEdgeId<I>],
) -> Result<()> {
    let internal: HashSet<HalfEdgeId<I>> = internal.iter().copied().collect();
    let mut entered = HashSet::new();
    for he in selection.iter().flat_map(|f| mesh.face_halfedges(f).iter().copied()) {
        if internal.contains(&he) {
            continue;
        }
        let v = mesh.to(he);
        if !entered.insert(v) {
            return Err(MeshError::invalid_topology(format!(
                "selected faces meet only at {:?}; their walls would share an edge",
                v
            )));
        }
    }
    Ok(())
}

fn displaced_vertex<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    cache: &mut HashMap<VertexId<I>, VertexId<I>>,
    v: VertexId<I>,
    distance: f64,
) -> Result<VertexId<I>> {
    if let Some(&d) = cache.get(&v) {
        return Ok(d);
    }
    let p = mesh.position(v);
    let lifted = direction(p) * (p.coords.norm() + distance);
    let d = mesh.add_vertex(Point3::from(lifted))?;
    cache.insert(v, d);
    Ok(d)
}
