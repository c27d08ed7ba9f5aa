//! Removal of unused elements.
//!
//! Topology rewrites can leave half-edges that no face uses and vertices that
//! no half-edge touches. These passes detach them.

use log::debug;

use crate::error::Result;
use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Detach every half-edge that has no face. Returns the number detached.
pub fn detach_unused_halfedges<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> Result<usize> {
    let unused: Vec<_> = mesh
        .halfedges()
        .filter(|he| he.face().is_none())
        .map(|he| he.id())
        .collect();

    // Newest first.
    for &he in unused.iter().rev() {
        mesh.detach_halfedge(he)?;
    }

    debug!("detached {} unused half-edges", unused.len());
    Ok(unused.len())
}

/// Detach every vertex with no incident half-edge. Returns the number detached.
pub fn detach_unused_vertices<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> Result<usize> {
    let unused: Vec<_> = mesh
        .vertices()
        .filter(|v| v.outgoing().is_empty() && v.incoming().is_empty())
        .map(|v| v.id())
        .collect();

    for &v in unused.iter().rev() {
        mesh.detach_vertex(v)?;
    }

    debug!("detached {} unused vertices", unused.len());
    Ok(unused.len())
}
