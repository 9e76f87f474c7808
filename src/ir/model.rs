//! COCO document model.
//!
//! These records serialize directly into the COCO layout. Field order in the
//! structs is the key order in the JSON output, so keep it stable.

use serde::{Deserialize, Serialize};

use super::bbox::BBoxXYWH;
use super::ids::{AnnotationId, CategoryId, ImageId};
use super::space::Pixel;

/// Supercategory written for every category the converter creates.
pub const DEFAULT_SUPERCATEGORY: &str = "none";

/// A complete COCO detection document for one split.
///
/// Each collection is kept in creation order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CocoDocument {
    pub images: Vec<ImageRecord>,

    pub annotations: Vec<AnnotationRecord>,

    pub categories: Vec<CategoryRecord>,
}

impl CocoDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }
}

/// An image entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: ImageId,

    /// Base filename of the copied image.
    pub file_name: String,

    pub width: u32,

    pub height: u32,
}

impl ImageRecord {
    pub fn new(id: impl Into<ImageId>, file_name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            width,
            height,
        }
    }
}

/// A category entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: CategoryId,

    pub name: String,

    #[serde(default = "default_supercategory")]
    pub supercategory: String,
}

fn default_supercategory() -> String {
    DEFAULT_SUPERCATEGORY.to_string()
}

impl CategoryRecord {
    /// Creates a category with the default `"none"` supercategory.
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            supercategory: default_supercategory(),
        }
    }
}

/// An annotation entry: one detection box on one image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub id: AnnotationId,

    pub image_id: ImageId,

    pub category_id: CategoryId,

    /// `[x, y, width, height]` in pixels, (x, y) being the top-left corner.
    pub bbox: BBoxXYWH<Pixel>,

    pub area: f64,

    /// Always 0; crowd regions are not produced.
    #[serde(default)]
    pub iscrowd: u8,
}

impl AnnotationRecord {
    /// Creates a non-crowd annotation whose area is taken from the box.
    pub fn new(
        id: impl Into<AnnotationId>,
        image_id: impl Into<ImageId>,
        category_id: impl Into<CategoryId>,
        bbox: BBoxXYWH<Pixel>,
    ) -> Self {
        Self {
            id: id.into(),
            image_id: image_id.into(),
            category_id: category_id.into(),
            area: bbox.area(),
            bbox,
            iscrowd: 0,
        }
    }
}
