//! Index types for mesh elements.
//!
//! Nodes, half-edges and faces are addressed by type-safe handles wrapping an
//! arena position. The handles are generic over the underlying integer type so
//! small meshes can use `u16` and very large ones `u64`.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Trait for types that can be used as mesh indices.
///
/// Implemented for `u16`, `u32`, `u64` and `usize`.
pub trait MeshIndex:
    Copy + Clone + Eq + PartialEq + Ord + PartialOrd + Hash + Debug + Send + Sync + 'static
{
    /// The maximum valid index value.
    const MAX: Self;

    /// A sentinel value representing an unlinked index.
    const INVALID: Self;

    /// Convert from usize to this index type.
    ///
    /// # Panics
    /// Panics in debug builds if the value is too large for this index type.
    fn from_usize(v: usize) -> Self;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// Check if this is a valid (non-sentinel) index.
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! impl_mesh_index {
    ($ty:ty) => {
        impl MeshIndex for $ty {
            const MAX: Self = <$ty>::MAX - 1;
            const INVALID: Self = <$ty>::MAX;

            #[inline]
            fn from_usize(v: usize) -> Self {
                debug_assert!(
                    v as u128 <= Self::MAX as u128,
                    "index {} too large for {}",
                    v,
                    stringify!($ty)
                );
                v as $ty
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
impl_mesh_index!(usize);

/// A type-safe node (vertex) index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct NodeId<I: MeshIndex = u32>(I);

/// A type-safe half-edge index.
///
/// Two half-edges are equal exactly when their handles are equal.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId<I: MeshIndex = u32>(I);

/// A type-safe face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Create a new index from a raw value.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// Create an unlinked index.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Get the raw value of the underlying type.
            #[inline]
            pub fn raw(self) -> I {
                self.0
            }

            /// Check if this is a linked (non-sentinel) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl<I: MeshIndex> From<usize> for $name<I> {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(NodeId, "N");
impl_index_type!(HalfEdgeId, "HE");
impl_index_type!(FaceId, "F");

impl<I: MeshIndex> FaceId<I> {
    /// The sentinel face standing for the unbounded exterior.
    ///
    /// Every mesh reserves face slot 0 for it.
    #[inline]
    pub fn outside() -> Self {
        Self::new(0)
    }

    /// Check if this is the outside sentinel.
    #[inline]
    pub fn is_outside(self) -> bool {
        self.index() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let n: NodeId = NodeId::new(42);
        assert_eq!(n.index(), 42);
        assert!(n.is_valid());

        let invalid: NodeId = NodeId::invalid();
        assert!(!invalid.is_valid());
    }

    #[test]
    fn test_type_safety() {
        // Distinct types with the same raw value
        let n: NodeId = NodeId::new(0);
        let he: HalfEdgeId = HalfEdgeId::new(0);
        let f: FaceId = FaceId::new(0);

        assert_eq!(n.index(), he.index());
        assert_eq!(he.index(), f.index());
    }

    #[test]
    fn test_small_and_native_indices() {
        let n: NodeId<u16> = NodeId::new(1000);
        assert_eq!(n.index(), 1000);
        assert!(!NodeId::<u16>::invalid().is_valid());

        let he: HalfEdgeId<usize> = HalfEdgeId::new(7);
        assert_eq!(he.raw(), 7usize);
    }

    #[test]
    fn test_outside_face() {
        let f: FaceId = FaceId::outside();
        assert!(f.is_outside());
        assert!(!FaceId::<u32>::new(3).is_outside());
    }

    #[test]
    fn test_debug_format() {
        let n: NodeId = NodeId::new(42);
        assert_eq!(format!("{:?}", n), "N(42)");

        let he: HalfEdgeId = HalfEdgeId::invalid();
        assert_eq!(format!("{:?}", he), "HE(INVALID)");
    }
}
