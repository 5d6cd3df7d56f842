//! Index types for mesh elements.
//!
//! This module provides type-safe id wrappers for vertices, edges, and faces.
//! Ids are allocated once per entity and never reused after removal, so an id
//! held across a cleanup pass either still names the same entity or names
//! nothing at all.

use std::fmt::{self, Debug};

/// A type-safe vertex id.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId(u32);

/// A type-safe edge id.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId(u32);

/// A type-safe face id.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId(u32);

macro_rules! impl_id_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Create a new id from a raw value.
            #[inline]
            pub fn new(index: u32) -> Self {
                Self(index)
            }

            /// Get the raw id value.
            #[inline]
            pub fn index(self) -> u32 {
                self.0
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.0)
            }
        }

        impl From<u32> for $name {
            fn from(v: u32) -> Self {
                Self(v)
            }
        }
    };
}

impl_id_type!(VertexId, "V");
impl_id_type!(EdgeId, "E");
impl_id_type!(FaceId, "F");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_id() {
        let v = VertexId::new(42);
        assert_eq!(v.index(), 42);
    }

    #[test]
    fn test_type_safety() {
        // These are different types and cannot be mixed
        let v = VertexId::new(0);
        let e = EdgeId::new(0);
        let f = FaceId::new(0);

        // All have the same raw value but are distinct types
        assert_eq!(v.index(), e.index());
        assert_eq!(e.index(), f.index());
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", VertexId::new(42)), "V(42)");
        assert_eq!(format!("{:?}", EdgeId::new(7)), "E(7)");
        assert_eq!(format!("{:?}", FaceId::new(0)), "F(0)");
    }

    #[test]
    fn test_ordering() {
        assert!(VertexId::new(1) < VertexId::new(2));
    }
}
