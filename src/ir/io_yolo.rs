//! Readers for the YOLO side of a conversion.
//!
//! A YOLO split is described by a manifest (one image path per line), a
//! label file per image and optionally a class-name file. Nothing here
//! writes; the converter owns all output.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{BBoxCXCYWH, Normalized};
use crate::error::Yolo2CocoError;

const LABEL_FIELD_COUNT: usize = 5;

/// One detection parsed from a label line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YoloLabelRow {
    pub class_id: u64,
    pub bbox: BBoxCXCYWH<Normalized>,
}

/// The outcome of parsing a single label line.
#[derive(Clone, Debug, PartialEq)]
pub enum LabelLine {
    /// Empty or whitespace-only line.
    Blank,
    /// A line that is not five numeric fields with an integral class id.
    Malformed(String),
    Row(YoloLabelRow),
}

/// Reads a manifest: one image path per line, surrounding whitespace
/// trimmed, blank lines dropped. Order is preserved.
pub fn read_manifest(path: &Path) -> Result<Vec<PathBuf>, Yolo2CocoError> {
    let content = fs::read_to_string(path).map_err(|source| Yolo2CocoError::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect())
}

/// Reads every line of a label file, keeping blank and malformed lines so
/// callers can report them with their line numbers.
pub fn read_label_file(path: &Path) -> Result<Vec<LabelLine>, Yolo2CocoError> {
    let content = fs::read_to_string(path).map_err(|source| Yolo2CocoError::LabelRead {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content.lines().map(parse_label_line).collect())
}

/// Parses `class_id x_center y_center width height`.
///
/// The class id may be written as a float (`0.0`) but must be a finite,
/// nonnegative whole number. Box values must be finite; out-of-range
/// coordinates are kept and left for validation to report.
pub fn parse_label_line(line: &str) -> LabelLine {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LabelLine::Blank;
    }

    // One token past the limit is enough to know the count is wrong.
    let tokens: Vec<&str> = trimmed
        .split_whitespace()
        .take(LABEL_FIELD_COUNT + 1)
        .collect();
    if tokens.len() != LABEL_FIELD_COUNT {
        return LabelLine::Malformed(format!(
            "expected {LABEL_FIELD_COUNT} fields, found {}{}",
            tokens.len(),
            if tokens.len() > LABEL_FIELD_COUNT { " or more" } else { "" }
        ));
    }

    let mut values = [0.0f64; LABEL_FIELD_COUNT];
    for (slot, token) in values.iter_mut().zip(&tokens) {
        match token.parse::<f64>() {
            Ok(value) if value.is_finite() => *slot = value,
            // `nan` and `inf` parse, but have no JSON form.
            Ok(_) => return LabelLine::Malformed(format!("'{token}' is not a finite number")),
            Err(_) => return LabelLine::Malformed(format!("'{token}' is not a number")),
        }
    }

    let [raw_class, cx, cy, w, h] = values;
    let Some(class_id) = class_id_from_f64(raw_class) else {
        return LabelLine::Malformed(format!(
            "class id '{}' is not a nonnegative integer",
            tokens[0]
        ));
    };

    LabelLine::Row(YoloLabelRow {
        class_id,
        bbox: BBoxCXCYWH::new(cx, cy, w, h),
    })
}

fn class_id_from_f64(value: f64) -> Option<u64> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value >= u64::MAX as f64 {
        return None;
    }
    Some(value as u64)
}

/// Fuzz-only entrypoint for YOLO single-line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_label_line(input: &str) -> LabelLine {
    parse_label_line(input)
}

/// Reads only the image header and returns `(width, height)` in pixels.
pub fn read_image_dimensions(path: &Path) -> Result<(u32, u32), Yolo2CocoError> {
    let size = imagesize::size(path).map_err(|source| Yolo2CocoError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    let width: u32 = size
        .width
        .try_into()
        .map_err(|_| Yolo2CocoError::InvalidImage {
            path: path.to_path_buf(),
            message: format!("image width {} does not fit in u32", size.width),
        })?;

    let height: u32 = size
        .height
        .try_into()
        .map_err(|_| Yolo2CocoError::InvalidImage {
            path: path.to_path_buf(),
            message: format!("image height {} does not fit in u32", size.height),
        })?;

    if width == 0 || height == 0 {
        return Err(Yolo2CocoError::InvalidImage {
            path: path.to_path_buf(),
            message: format!("image has zero size {width}x{height}"),
        });
    }

    Ok((width, height))
}

#[derive(Debug, Deserialize)]
struct DataYaml {
    names: DataYamlNames,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataYamlNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<u64, String>),
}

/// Loads a class-id → name mapping.
///
/// Files ending in `.yaml`/`.yml` are read as a YOLO `data.yaml` whose
/// `names:` is either a list or an index map. Anything else is read as
/// `classes.txt`, one name per line, the line index being the class id.
pub fn read_class_names(path: &Path) -> Result<BTreeMap<u64, String>, Yolo2CocoError> {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    if is_yaml {
        read_data_yaml_names(path)
    } else {
        read_classes_txt(path)
    }
}

fn read_data_yaml_names(path: &Path) -> Result<BTreeMap<u64, String>, Yolo2CocoError> {
    let data = fs::read_to_string(path).map_err(|source| Yolo2CocoError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: DataYaml =
        serde_yaml::from_str(&data).map_err(|source| Yolo2CocoError::ClassMapParse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(match parsed.names {
        DataYamlNames::Sequence(names) => names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| (idx as u64, name))
            .collect(),
        DataYamlNames::Mapping(mapping) => mapping,
    })
}

fn read_classes_txt(path: &Path) -> Result<BTreeMap<u64, String>, Yolo2CocoError> {
    let data = fs::read_to_string(path).map_err(|source| Yolo2CocoError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut names = BTreeMap::new();

    for (line_idx, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(Yolo2CocoError::ClassesTxtInvalid {
                path: path.to_path_buf(),
                message: format!("line {} is empty", line_idx + 1),
            });
        }
        names.insert(line_idx as u64, trimmed.to_string());
    }

    Ok(names)
}
