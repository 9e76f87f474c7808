//! Bounding box types for the two layouts this crate moves between.
//!
//! YOLO stores a box as its center plus size, normalized to the image.
//! COCO stores the top-left corner plus size, in pixels. Each layout gets its
//! own type, and the coordinate space is carried as a type parameter.

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use super::{Normalized, Pixel};

/// A box in center form: (x_center, y_center, width, height).
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxCXCYWH<TSpace> {
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> BBoxCXCYWH<TSpace> {
    #[inline]
    pub fn new(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self {
            cx,
            cy,
            w,
            h,
            _space: PhantomData,
        }
    }
}

impl BBoxCXCYWH<Normalized> {
    /// Scales a normalized YOLO box to pixels and moves the origin to the
    /// top-left corner.
    ///
    /// The width and height are scaled first; the corner is then the scaled
    /// center minus half the scaled size.
    pub fn to_pixel_xywh(&self, image_width: f64, image_height: f64) -> BBoxXYWH<Pixel> {
        let w = self.w * image_width;
        let h = self.h * image_height;
        let x = self.cx * image_width - w / 2.0;
        let y = self.cy * image_height - h / 2.0;
        BBoxXYWH::new(x, y, w, h)
    }
}

impl<TSpace> std::fmt::Debug for BBoxCXCYWH<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBoxCXCYWH")
            .field("cx", &self.cx)
            .field("cy", &self.cy)
            .field("w", &self.w)
            .field("h", &self.h)
            .finish()
    }
}

/// A box in corner form: (x, y, width, height) with (x, y) the top-left corner.
///
/// Serialized as the four-element array COCO expects. Like the rest of the
/// records, this type does not reject negative sizes; validation reports them.
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYWH<TSpace> {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> BBoxXYWH<TSpace> {
    #[inline]
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            w,
            h,
            _space: PhantomData,
        }
    }

    /// Width times height. Negative if exactly one side is negative.
    #[inline]
    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    #[inline]
    pub fn xmax(&self) -> f64 {
        self.x + self.w
    }

    #[inline]
    pub fn ymax(&self) -> f64 {
        self.y + self.h
    }

    /// Returns true if all four values are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }

    #[inline]
    pub fn to_array(&self) -> [f64; 4] {
        [self.x, self.y, self.w, self.h]
    }
}

impl<TSpace> std::fmt::Debug for BBoxXYWH<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBoxXYWH")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("w", &self.w)
            .field("h", &self.h)
            .finish()
    }
}

// Hand-written serde keeps TSpace free of Serialize/Deserialize bounds.
impl<TSpace> Serialize for BBoxXYWH<TSpace> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

impl<'de, TSpace> Deserialize<'de> for BBoxXYWH<TSpace> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [x, y, w, h] = <[f64; 4]>::deserialize(deserializer)?;
        Ok(Self::new(x, y, w, h))
    }
}
