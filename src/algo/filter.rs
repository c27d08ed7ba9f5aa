//! Face filtering.

use std::collections::HashMap;

use log::debug;

use crate::error::Result;
use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};
use crate::selection::FaceSelection;

/// Build a new mesh containing only the selected faces.
///
/// The result holds the distinct corners of the selection (in first-seen
/// order) and one face per selected face, rebuilt from its corners. Twins are
/// derived afresh from the rebuilt faces, so nothing in the result refers to
/// an element outside the selection.
///
/// # Errors
/// [`MeshError::InvalidTopology`](crate::error::MeshError::InvalidTopology)
/// if the selection names a face that is not attached to `mesh`.
pub fn filter_faces<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    selection: &FaceSelection<I>,
) -> Result<HalfEdgeMesh<I>> {
    selection.ensure_attached(mesh)?;

    let keep = selection.vertices(mesh);
    let mut result = HalfEdgeMesh::with_capacity(keep.len(), selection.len());
    let vertex_map: HashMap<VertexId<I>, VertexId<I>> = keep
        .iter()
        .map(|v| Ok((v, result.add_vertex(*mesh.position(v))?)))
        .collect::<Result<_>>()?;

    for f in selection.iter() {
        let corners: Vec<VertexId<I>> = mesh.face_vertices(f).map(|v| vertex_map[&v]).collect();
        result.add_face_by_vertices(&corners)?;
    }

    debug!(
        "filtered {} of {} faces: {} vertices kept",
        selection.len(),
        mesh.num_faces(),
        result.num_vertices()
    );
    Ok(result)
}
