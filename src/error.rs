//! Error types for hedra.
//!
//! Every failure in this crate is a contract violation reported synchronously:
//! nothing is retried and nothing is recovered internally.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh construction, detachment and operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The requested change would break a structural invariant of the mesh.
    #[error("invalid topology: {details}")]
    InvalidTopology {
        /// Description of the violated invariant.
        details: String,
    },

    /// A relationship that does not currently hold was asked to be removed.
    #[error("inconsistent detach: {details}")]
    InconsistentDetach {
        /// Description of the missing relationship.
        details: String,
    },

    /// The triangle export adapter was given a face that is not a triangle.
    #[error("face {face} has {sides} sides; only triangle meshes can be exported (triangulate first)")]
    ExportPrecondition {
        /// Slot index of the offending face.
        face: usize,
        /// Number of sides of the offending face.
        sides: usize,
    },

    /// A polygon references a vertex index outside the vertex list.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// The index type of the mesh has no slot left for a new element.
    #[error("cannot allocate {kind} slot {slot}: index type holds at most {max} slots")]
    IndexOverflow {
        /// Element kind being allocated.
        kind: &'static str,
        /// The slot that was requested.
        slot: usize,
        /// Number of slots the index type can address.
        max: u128,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid topology error.
    pub fn invalid_topology(details: impl Into<String>) -> Self {
        MeshError::InvalidTopology {
            details: details.into(),
        }
    }

    /// Create an inconsistent detach error.
    pub fn inconsistent_detach(details: impl Into<String>) -> Self {
        MeshError::InconsistentDetach {
            details: details.into(),
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
