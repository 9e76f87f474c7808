//! COCO JSON reader and writer.
//!
//! The document model already has the COCO shape, so this module only deals
//! with files, buffering and error context. Output is pretty-printed and keys
//! appear in struct field order, which keeps repeated runs byte-identical.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::model::CocoDocument;
use crate::error::Yolo2CocoError;

/// Reads a COCO document from a JSON file.
///
/// Extra COCO fields (`info`, `licenses`, `segmentation`, ...) are ignored.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use yolo2coco::ir::io_coco_json::read_coco_json;
///
/// let document = read_coco_json(Path::new("annotations/train.json"))?;
/// println!("{} images", document.images.len());
/// # Ok::<(), yolo2coco::Yolo2CocoError>(())
/// ```
pub fn read_coco_json(path: &Path) -> Result<CocoDocument, Yolo2CocoError> {
    let file = File::open(path).map_err(|source| Yolo2CocoError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| Yolo2CocoError::CocoJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a COCO document to a JSON file, replacing any existing file.
pub fn write_coco_json(path: &Path, document: &CocoDocument) -> Result<(), Yolo2CocoError> {
    let file = File::create(path).map_err(|source| Yolo2CocoError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, document).map_err(|source| {
        Yolo2CocoError::CocoJsonWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;

    writer.flush().map_err(|source| Yolo2CocoError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses a COCO document from a string.
pub fn from_coco_str(json: &str) -> Result<CocoDocument, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parses a COCO document from raw bytes.
pub fn from_coco_slice(bytes: &[u8]) -> Result<CocoDocument, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Renders a COCO document as a pretty-printed string.
pub fn to_coco_string(document: &CocoDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}
