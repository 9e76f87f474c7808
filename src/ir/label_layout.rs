//! Rules for locating the YOLO label file that belongs to an image.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// Maps an image path to the path of its label file.
///
/// Returning `None` means the layout does not apply to this image; the
/// converter treats that the same as a missing label file.
pub trait LabelPathStrategy: Debug + Send + Sync {
    fn label_path(&self, image_path: &Path) -> Option<PathBuf>;
}

/// The Ultralytics layout: `.../images/<rest>.jpg` → `.../labels/<rest>.txt`.
///
/// Only the first `/images/` segment is replaced.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImagesToLabels;

const IMAGES_SEGMENT: &str = "/images/";
const LABELS_SEGMENT: &str = "/labels/";
const LABEL_EXTENSION: &str = "txt";

impl LabelPathStrategy for ImagesToLabels {
    fn label_path(&self, image_path: &Path) -> Option<PathBuf> {
        let raw = image_path.to_str()?;
        if !raw.contains(IMAGES_SEGMENT) {
            return None;
        }
        let swapped = raw.replacen(IMAGES_SEGMENT, LABELS_SEGMENT, 1);
        Some(PathBuf::from(swapped).with_extension(LABEL_EXTENSION))
    }
}

/// Label file stored next to the image with the same stem.
#[derive(Clone, Copy, Debug, Default)]
pub struct SiblingLabels;

impl LabelPathStrategy for SiblingLabels {
    fn label_path(&self, image_path: &Path) -> Option<PathBuf> {
        image_path.file_name()?;
        Some(image_path.with_extension(LABEL_EXTENSION))
    }
}
