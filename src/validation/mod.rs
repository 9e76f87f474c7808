//! Structural validation of COCO documents.
//!
//! Checks unique ids, referential integrity between annotations and the
//! image/category collections, 1..N id sequences, and box sanity. A document
//! produced by the converter from well-formed YOLO labels is expected to
//! come out clean.

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::{HashMap, HashSet};

use crate::ir::{AnnotationId, CategoryId, CocoDocument, ImageId};

/// Slack, in pixels, allowed past the image edge before a box counts as
/// out of bounds.
const BOUNDS_TOLERANCE: f64 = 0.5;

/// Relative slack for comparing `area` against the box.
const AREA_TOLERANCE: f64 = 1e-6;

#[derive(Clone, Debug, Default)]
pub struct ValidateOptions {
    /// If true, warnings fail validation too.
    pub strict: bool,
}

/// Validates a document and returns every issue found.
pub fn validate_document(document: &CocoDocument, _opts: &ValidateOptions) -> ValidationReport {
    let mut report = ValidationReport::new();

    let image_ids: HashSet<ImageId> = document.images.iter().map(|i| i.id).collect();
    let category_ids: HashSet<CategoryId> = document.categories.iter().map(|c| c.id).collect();

    validate_images(document, &mut report);
    validate_categories(document, &mut report);
    validate_annotations(document, &image_ids, &category_ids, &mut report);
    validate_sequences(document, &mut report);

    report
}

fn validate_images(document: &CocoDocument, report: &mut ValidationReport) {
    let mut seen_ids: HashMap<ImageId, usize> = HashMap::new();

    for (idx, image) in document.images.iter().enumerate() {
        let id = image.id.as_u64();

        if let Some(first_idx) = seen_ids.get(&image.id) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateImageId,
                format!(
                    "Duplicate image ID {} (first seen at index {})",
                    id, first_idx
                ),
                IssueContext::Image { id },
            ));
        } else {
            seen_ids.insert(image.id, idx);
        }

        if image.width == 0 || image.height == 0 {
            report.add(ValidationIssue::error(
                IssueCode::InvalidImageDimensions,
                format!(
                    "Invalid dimensions {}x{} (must be positive)",
                    image.width, image.height
                ),
                IssueContext::Image { id },
            ));
        }

        if image.file_name.is_empty() {
            report.add(ValidationIssue::warning(
                IssueCode::EmptyFileName,
                "Empty filename",
                IssueContext::Image { id },
            ));
        }
    }
}

fn validate_categories(document: &CocoDocument, report: &mut ValidationReport) {
    let mut seen_ids: HashSet<CategoryId> = HashSet::new();
    let mut seen_names: HashMap<&str, CategoryId> = HashMap::new();

    for category in &document.categories {
        let id = category.id.as_u64();

        if !seen_ids.insert(category.id) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateCategoryId,
                format!("Duplicate category ID {}", id),
                IssueContext::Category { id },
            ));
        }

        if category.name.is_empty() {
            report.add(ValidationIssue::warning(
                IssueCode::EmptyCategoryName,
                "Empty category name",
                IssueContext::Category { id },
            ));
        } else if let Some(first_id) = seen_names.get(category.name.as_str()) {
            report.add(ValidationIssue::warning(
                IssueCode::DuplicateCategoryName,
                format!(
                    "Duplicate category name '{}' (also used by category {})",
                    category.name, first_id
                ),
                IssueContext::Category { id },
            ));
        } else {
            seen_names.insert(&category.name, category.id);
        }
    }
}

fn validate_annotations(
    document: &CocoDocument,
    image_ids: &HashSet<ImageId>,
    category_ids: &HashSet<CategoryId>,
    report: &mut ValidationReport,
) {
    let mut seen_ids: HashSet<AnnotationId> = HashSet::new();

    let image_dims: HashMap<ImageId, (u32, u32)> = document
        .images
        .iter()
        .map(|i| (i.id, (i.width, i.height)))
        .collect();

    for annotation in &document.annotations {
        let id = annotation.id.as_u64();
        let context = || IssueContext::Annotation { id };

        if !seen_ids.insert(annotation.id) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateAnnotationId,
                format!("Duplicate annotation ID {}", id),
                context(),
            ));
        }

        if !image_ids.contains(&annotation.image_id) {
            report.add(ValidationIssue::error(
                IssueCode::MissingImageRef,
                format!("References non-existent image {}", annotation.image_id),
                context(),
            ));
        }

        if !category_ids.contains(&annotation.category_id) {
            report.add(ValidationIssue::error(
                IssueCode::MissingCategoryRef,
                format!(
                    "References non-existent category {}",
                    annotation.category_id
                ),
                context(),
            ));
        }

        let bbox = &annotation.bbox;
        if !bbox.is_finite() {
            report.add(ValidationIssue::error(
                IssueCode::BBoxNotFinite,
                format!("Non-finite box {:?}", bbox.to_array()),
                context(),
            ));
            continue;
        }

        if bbox.w <= 0.0 || bbox.h <= 0.0 {
            report.add(ValidationIssue::warning(
                IssueCode::InvalidBBoxSize,
                format!("Zero or negative size {}x{}", bbox.w, bbox.h),
                context(),
            ));
        }

        let expected_area = bbox.area();
        if (annotation.area - expected_area).abs() > AREA_TOLERANCE * expected_area.abs().max(1.0)
        {
            report.add(ValidationIssue::warning(
                IssueCode::AreaMismatch,
                format!(
                    "Area {} does not match box size {:.3}",
                    annotation.area, expected_area
                ),
                context(),
            ));
        }

        if let Some((width, height)) = image_dims.get(&annotation.image_id) {
            let (w, h) = (f64::from(*width), f64::from(*height));
            if bbox.x < -BOUNDS_TOLERANCE
                || bbox.y < -BOUNDS_TOLERANCE
                || bbox.xmax() > w + BOUNDS_TOLERANCE
                || bbox.ymax() > h + BOUNDS_TOLERANCE
            {
                report.add(ValidationIssue::warning(
                    IssueCode::BBoxOutOfBounds,
                    format!(
                        "Box [{:.1}, {:.1}, {:.1}, {:.1}] extends outside image bounds {}x{}",
                        bbox.x, bbox.y, bbox.w, bbox.h, width, height
                    ),
                    context(),
                ));
            }
        }
    }
}

/// Image and annotation ids should run 1, 2, 3, ... in document order.
fn validate_sequences(document: &CocoDocument, report: &mut ValidationReport) {
    let image_ids = document.images.iter().map(|i| i.id.as_u64());
    if let Some(position) = first_gap(image_ids) {
        report.add(ValidationIssue::warning(
            IssueCode::NonSequentialIds,
            format!("Image ids stop counting up from 1 at index {}", position),
            IssueContext::Document,
        ));
    }

    let annotation_ids = document.annotations.iter().map(|a| a.id.as_u64());
    if let Some(position) = first_gap(annotation_ids) {
        report.add(ValidationIssue::warning(
            IssueCode::NonSequentialIds,
            format!(
                "Annotation ids stop counting up from 1 at index {}",
                position
            ),
            IssueContext::Document,
        ));
    }
}

fn first_gap(ids: impl Iterator<Item = u64>) -> Option<usize> {
    ids.zip(1u64..).position(|(id, expected)| id != expected)
}
