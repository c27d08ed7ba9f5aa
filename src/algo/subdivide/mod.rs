//! Mesh subdivision.
//!
//! # Midpoint Subdivision (Triangle Meshes)
//!
//! Each level splits every triangle `(a, b, c)` into four by inserting a vertex
//! at the midpoint of each edge:
//!
//! ```text
//!            c
//!           / \
//!         mca--mbc
//!         / \  / \
//!        a--mab---b
//! ```
//!
//! The new triangles are `(a, mab, mca)`, `(mab, b, mbc)`, `(mca, mab, mbc)`
//! and `(mca, mbc, c)`, all wound like the original. Midpoints are shared by
//! the two triangles on either side of an edge, so the result stays connected
//! and every interior edge stays paired. Positions are interpolated linearly;
//! the shape does not change, only its resolution. Combine with
//! [`VertexTransform::ProjectToSphere`](crate::algo::transform::VertexTransform)
//! to build geodesic spheres.
//!
//! # Example
//!
//! ```
//! use hedra::prelude::*;
//! use hedra::algo::subdivide::{subdivide_triangles, SubdivideOptions};
//! use hedra::primitives::icosahedron;
//!
//! let mut mesh: HalfEdgeMesh = icosahedron().unwrap();
//! subdivide_triangles(&mut mesh, &SubdivideOptions::new(2)).unwrap();
//! assert_eq!(mesh.num_faces(), 20 * 16);
//! ```

mod midpoint;

pub use midpoint::{subdivide_triangles, subdivide_triangles_with_progress};

/// Options for subdivision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubdivideOptions {
    /// Number of subdivision levels; each level quadruples the face count.
    pub levels: usize,
}

impl SubdivideOptions {
    /// Create options with the specified number of levels.
    pub fn new(levels: usize) -> Self {
        Self { levels }
    }

    /// Set the number of levels.
    pub fn with_levels(mut self, levels: usize) -> Self {
        self.levels = levels;
        self
    }
}

impl Default for SubdivideOptions {
    fn default() -> Self {
        Self::new(1)
    }
}
