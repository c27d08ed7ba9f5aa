//! Handle types for mesh elements.
//!
//! Vertices, half-edges and faces are addressed by type-safe handles. A handle
//! stores the slot index of the element together with the [`MeshTag`] of the
//! mesh that allocated it, so handles compare and hash by identity: two handles
//! are equal only if they name the same slot of the same mesh.
//!
//! The slot index is generic over the underlying integer type ([`MeshIndex`]),
//! allowing `u16`, `u32` or `u64` depending on mesh size.

use std::fmt::{self, Debug};
use std::hash::Hash;
use std::sync::atomic::{AtomicU32, Ordering};

/// Trait for types that can be used as mesh indices.
///
/// This trait is implemented for `u16`, `u32`, and `u64`.
pub trait MeshIndex: Copy + Clone + Eq + PartialEq + Ord + PartialOrd + Hash + Debug + Send + Sync + 'static {
    /// The maximum valid index value.
    const MAX: Self;

    /// Convert from usize, or `None` if the value does not fit.
    fn try_from_usize(v: usize) -> Option<Self>;

    /// Convert to usize.
    fn to_usize(self) -> usize;
}

macro_rules! impl_mesh_index {
    ($ty:ty) => {
        impl MeshIndex for $ty {
            const MAX: Self = <$ty>::MAX;

            #[inline]
            fn try_from_usize(v: usize) -> Option<Self> {
                <$ty>::try_from(v).ok()
            }

            #[inline]
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    };
}

impl_mesh_index!(u16);
impl_mesh_index!(u32);
impl_mesh_index!(u64);

/// Process-unique identity of one mesh instance.
///
/// Every [`HalfEdgeMesh`](super::HalfEdgeMesh), including every clone, receives a
/// fresh tag. Handles remember the tag of the mesh that issued them.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MeshTag(u32);

impl MeshTag {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(0);
        MeshTag(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl Debug for MeshTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

/// A type-safe vertex handle.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VertexId<I: MeshIndex = u32> {
    mesh: MeshTag,
    index: I,
}

/// A type-safe half-edge handle.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct HalfEdgeId<I: MeshIndex = u32> {
    mesh: MeshTag,
    index: I,
}

/// A type-safe face handle.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FaceId<I: MeshIndex = u32> {
    mesh: MeshTag,
    index: I,
}

macro_rules! impl_handle_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            #[inline]
            pub(crate) fn new(mesh: MeshTag, index: I) -> Self {
                Self { mesh, index }
            }

            /// Get the slot index. Slots are allocated in creation order and
            /// never reused within one mesh.
            #[inline]
            pub fn index(self) -> usize {
                self.index.to_usize()
            }

            /// Get the raw value of the underlying index type.
            #[inline]
            pub fn raw(self) -> I {
                self.index
            }

            /// Get the tag of the mesh that issued this handle.
            #[inline]
            pub fn mesh(self) -> MeshTag {
                self.mesh
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.index())
            }
        }
    };
}

impl_handle_type!(VertexId, "V");
impl_handle_type!(HalfEdgeId, "HE");
impl_handle_type!(FaceId, "F");
