//! Typed building blocks shared by the readers, the converter and validation.
//!
//! The COCO records in [`model`] are the output model. Boxes carry their
//! coordinate space as a type parameter ([`Pixel`] or [`Normalized`]), and
//! ids are newtypes so the three id sequences cannot be mixed up.
//!
//! # Example
//!
//! ```
//! use yolo2coco::ir::{
//!     AnnotationRecord, BBoxCXCYWH, CategoryRecord, CocoDocument, ImageRecord, Normalized,
//! };
//!
//! let yolo = BBoxCXCYWH::<Normalized>::new(0.5, 0.5, 0.2, 0.4);
//! let document = CocoDocument {
//!     images: vec![ImageRecord::new(1u64, "0001.jpg", 100, 200)],
//!     annotations: vec![AnnotationRecord::new(1u64, 1u64, 0u64, yolo.to_pixel_xywh(100.0, 200.0))],
//!     categories: vec![CategoryRecord::new(0u64, "car")],
//! };
//! assert_eq!(document.annotations[0].bbox.to_array(), [40.0, 60.0, 20.0, 80.0]);
//! ```

mod bbox;
mod ids;
pub mod io_coco_json;
pub mod io_yolo;
mod label_layout;
mod model;
mod space;

pub use bbox::{BBoxCXCYWH, BBoxXYWH};
pub use ids::{AnnotationId, CategoryId, IdCounter, ImageId};
pub use io_yolo::YoloLabelRow;
pub use label_layout::{ImagesToLabels, LabelPathStrategy, SiblingLabels};
pub use model::{
    AnnotationRecord, CategoryRecord, CocoDocument, ImageRecord, DEFAULT_SUPERCATEGORY,
};
pub use space::{Normalized, Pixel};
