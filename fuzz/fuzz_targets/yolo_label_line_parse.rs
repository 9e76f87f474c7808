//! Fuzz target for YOLO single-line label parsing.
//!
//! Feeds arbitrary UTF-8 lines to the label line parser and checks that a
//! parsed row never carries a non-finite box value.

#![no_main]

use libfuzzer_sys::fuzz_target;
use yolo2coco::ir::io_yolo::{fuzz_parse_label_line, LabelLine};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    if let LabelLine::Row(row) = fuzz_parse_label_line(line) {
        let b = row.bbox;
        assert!([b.cx, b.cy, b.w, b.h].iter().all(|v| v.is_finite()));
    }
});
