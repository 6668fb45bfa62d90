//! Typed identifiers for activities and resources.
//!
//! Plain `usize` indices are easy to swap by accident (an activity id passed
//! where a resource id is expected). Following the teacher's
//! `create_ref_type!` convention in `aries_collections::ref_store`, both kinds
//! of index get their own newtype so the compiler keeps them apart, while
//! still converting cheaply to/from `usize` for array indexing.

use std::fmt;

macro_rules! index_type {
    ($name:ident) => {
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(i: u32) -> Self {
                $name(i)
            }

            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl From<usize> for $name {
            fn from(i: usize) -> Self {
                $name(i as u32)
            }
        }

        impl From<$name> for usize {
            fn from(id: $name) -> Self {
                id.0 as usize
            }
        }

        impl From<u32> for $name {
            fn from(i: u32) -> Self {
                $name(i)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl<V> std::ops::Index<$name> for Vec<V> {
            type Output = V;
            fn index(&self, id: $name) -> &V {
                &self[usize::from(id)]
            }
        }

        impl<V> std::ops::IndexMut<$name> for Vec<V> {
            fn index_mut(&mut self, id: $name) -> &mut V {
                &mut self[usize::from(id)]
            }
        }

        impl<V> std::ops::Index<$name> for [V] {
            type Output = V;
            fn index(&self, id: $name) -> &V {
                &self[usize::from(id)]
            }
        }
    };
}

index_type!(ActivityId);
index_type!(ResourceId);

/// Iterates `ActivityId(0)..ActivityId(n)`.
pub fn activities(n: usize) -> impl Iterator<Item = ActivityId> {
    (0..n).map(ActivityId::from)
}

/// Iterates `ResourceId(0)..ResourceId(n)`.
pub fn resources(n: usize) -> impl Iterator<Item = ResourceId> {
    (0..n).map(ResourceId::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_usize() {
        let a = ActivityId::from(3usize);
        assert_eq!(usize::from(a), 3);
        assert_eq!(a.get(), 3);
    }

    #[test]
    fn ordering_matches_underlying_index() {
        let a = ActivityId::from(1usize);
        let b = ActivityId::from(2usize);
        assert!(a < b);
    }
}
