//! Fuzz target for COCO JSON parsing.
//!
//! Run with:
//!   cargo +nightly fuzz run coco_json_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use yolo2coco::ir::io_coco_json::from_coco_slice;
use yolo2coco::validation::{validate_document, ValidateOptions};

fuzz_target!(|data: &[u8]| {
    // 10MB is generous for an annotation file.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(document) = from_coco_slice(data) {
        let _ = validate_document(&document, &ValidateOptions::default());
    }
});
