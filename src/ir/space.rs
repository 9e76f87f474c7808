//! Coordinate space marker types.
//!
//! Zero-sized types used as type parameters so that a normalized YOLO box
//! cannot be written out as a COCO pixel box without going through the
//! conversion that needs the image size.

use std::fmt;

/// Marker for absolute pixel coordinates, origin at the top-left corner.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Marker for coordinates expressed as fractions of the image size.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
