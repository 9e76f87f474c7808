#![allow(dead_code)]

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use yolo2coco::ir::{
    AnnotationRecord, BBoxCXCYWH, CategoryRecord, CocoDocument, ImageRecord, Normalized,
};

pub const EPS_PIXEL: f64 = 1e-9;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// A normalized box that lies inside the unit square.
pub fn arb_normalized_bbox() -> BoxedStrategy<BBoxCXCYWH<Normalized>> {
    (0u32..=1000, 0u32..=1000, 1u32..=1000, 1u32..=1000)
        .prop_map(|(sx, sy, sw, sh)| {
            let w = f64::from(sw) / 1000.0;
            let h = f64::from(sh) / 1000.0;
            let cx = w / 2.0 + (1.0 - w) * f64::from(sx) / 1000.0;
            let cy = h / 2.0 + (1.0 - h) * f64::from(sy) / 1000.0;
            BBoxCXCYWH::new(cx, cy, w, h)
        })
        .boxed()
}

/// One YOLO label line: a class id plus an in-image box.
pub fn arb_label_row() -> BoxedStrategy<(u64, BBoxCXCYWH<Normalized>)> {
    (0u64..20, arb_normalized_bbox()).boxed()
}

/// Labels for a handful of images. `None` means the image file is absent.
pub fn arb_split(
    max_images: usize,
    max_rows: usize,
) -> BoxedStrategy<Vec<Option<Vec<(u64, BBoxCXCYWH<Normalized>)>>>> {
    proptest::collection::vec(
        proptest::option::weighted(
            0.85,
            proptest::collection::vec(arb_label_row(), 0..=max_rows),
        ),
        0..=max_images,
    )
    .boxed()
}

/// Renders a row the way YOLO tools write them.
pub fn format_row(class_id: u64, bbox: &BBoxCXCYWH<Normalized>) -> String {
    format!("{} {} {} {} {}", class_id, bbox.cx, bbox.cy, bbox.w, bbox.h)
}

/// A document with 1..N ids and annotations referencing existing records.
pub fn arb_document(max_images: usize, max_anns: usize) -> BoxedStrategy<CocoDocument> {
    (
        proptest::collection::vec((2u32..=4096, 2u32..=4096), 1..=max_images),
        proptest::collection::vec(
            (any::<u16>(), 0u64..10, arb_normalized_bbox()),
            0..=max_anns,
        ),
    )
        .prop_map(|(dims, ann_seeds)| {
            let images: Vec<ImageRecord> = dims
                .iter()
                .enumerate()
                .map(|(idx, (width, height))| {
                    ImageRecord::new((idx + 1) as u64, format!("{idx:04}.jpg"), *width, *height)
                })
                .collect();

            let mut class_ids = BTreeSet::new();
            let annotations: Vec<AnnotationRecord> = ann_seeds
                .into_iter()
                .enumerate()
                .map(|(idx, (image_seed, class_id, bbox))| {
                    let image = &images[image_seed as usize % images.len()];
                    class_ids.insert(class_id);
                    AnnotationRecord::new(
                        (idx + 1) as u64,
                        image.id,
                        class_id,
                        bbox.to_pixel_xywh(f64::from(image.width), f64::from(image.height)),
                    )
                })
                .collect();

            let categories = class_ids
                .into_iter()
                .map(|id| CategoryRecord::new(id, format!("class_{id}")))
                .collect();

            CocoDocument {
                images,
                annotations,
                categories,
            }
        })
        .boxed()
}

pub fn assert_valid_references(document: &CocoDocument) -> Result<(), String> {
    let image_ids: HashSet<_> = document.images.iter().map(|img| img.id).collect();
    let category_ids: HashSet<_> = document.categories.iter().map(|cat| cat.id).collect();

    for ann in &document.annotations {
        if !image_ids.contains(&ann.image_id) {
            return Err(format!(
                "annotation {} references missing image_id {}",
                ann.id, ann.image_id
            ));
        }
        if !category_ids.contains(&ann.category_id) {
            return Err(format!(
                "annotation {} references missing category_id {}",
                ann.id, ann.category_id
            ));
        }
    }

    Ok(())
}

pub fn assert_contiguous(ids: impl Iterator<Item = u64>) -> Result<(), String> {
    for (position, (id, expected)) in ids.zip(1u64..).enumerate() {
        if id != expected {
            return Err(format!(
                "id {} at position {} (expected {})",
                id, position, expected
            ));
        }
    }
    Ok(())
}
