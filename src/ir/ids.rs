//! Newtype IDs for the three COCO collections.
//!
//! Image and annotation ids come from per-run counters; category ids are the
//! raw YOLO class index. Keeping them as distinct types stops a class index
//! from being written where an annotation id belongs.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            #[inline]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value.
            #[inline]
            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of an image record, assigned in manifest order starting at 1.
    ImageId
);

define_id!(
    /// Identifier of an annotation record, assigned in label-line order starting at 1.
    AnnotationId
);

define_id!(
    /// Identifier of a category record. Equal to the YOLO class index.
    CategoryId
);

/// A run-scoped, monotonically increasing id source.
#[derive(Clone, Debug)]
pub struct IdCounter {
    next: u64,
}

impl IdCounter {
    /// Creates a counter whose first id is 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns the current value and advances the counter.
    pub fn take(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::new()
    }
}
