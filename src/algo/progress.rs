//! Progress reporting for multi-step operations.
//!
//! Operations that run in discrete steps (subdivision levels, pipeline stages)
//! accept a [`Progress`] and report once per completed step.
//!
//! # Example
//!
//! ```
//! use hedra::algo::progress::Progress;
//! use hedra::algo::subdivide::{subdivide_triangles_with_progress, SubdivideOptions};
//! use hedra::primitives::icosahedron;
//! use hedra::prelude::*;
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//!
//! let mut mesh: HalfEdgeMesh = icosahedron().unwrap();
//! subdivide_triangles_with_progress(&mut mesh, &SubdivideOptions::new(2), &progress).unwrap();
//! ```

/// A progress callback that receives updates during multi-step operations.
///
/// The callback receives:
/// - `current`: Number of completed steps
/// - `total`: Total number of steps
/// - `message`: Description of the step that just completed
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
