//! End-to-end behaviour of a single split conversion.

use std::collections::{BTreeMap, HashSet};
use std::fs;

use yolo2coco::conversion::ConversionIssueCode;
use yolo2coco::ir::io_coco_json::read_coco_json;
use yolo2coco::validation::{validate_document, ValidateOptions};
use yolo2coco::{DatasetConverter, Yolo2CocoError};

mod common;
use common::YoloFixture;

#[test]
fn converts_known_box_for_100x200_image() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fx = YoloFixture::new(temp.path());
    let img = fx.image("train", "0001", 100, 200);
    fx.label("train", "0001", "0 0.5 0.5 0.2 0.4\n");
    let manifest = fx.manifest("train", &[img]);

    let out = fx.coco_dir();
    let result = DatasetConverter::new()
        .convert(
            &manifest,
            &out.join("images/train"),
            &out.join("annotations/train.json"),
        )
        .expect("convert");

    let ann = &result.document.annotations[0];
    assert_eq!(ann.bbox.to_array(), [40.0, 60.0, 20.0, 80.0]);
    assert_eq!(ann.area, 1600.0);
    assert_eq!(ann.iscrowd, 0);

    let written = read_coco_json(&out.join("annotations/train.json")).expect("read output");
    assert_eq!(written, result.document);
}

#[test]
fn output_json_has_expected_shape() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fx = YoloFixture::new(temp.path());
    let img = fx.image("val", "a", 100, 200);
    fx.label("val", "a", "0 0.5 0.5 0.2 0.4\n");
    let manifest = fx.manifest("val", &[img]);

    let out_json = fx.coco_dir().join("annotations/val.json");
    DatasetConverter::new()
        .convert(&manifest, &fx.coco_dir().join("images/val"), &out_json)
        .expect("convert");

    let raw = fs::read_to_string(&out_json).expect("read json");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("parse json");
    let keys: Vec<&str> = value
        .as_object()
        .expect("top-level object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys.len(), 3);
    assert!(raw.find("\"images\"").unwrap() < raw.find("\"annotations\"").unwrap());
    assert!(raw.find("\"annotations\"").unwrap() < raw.find("\"categories\"").unwrap());

    assert_eq!(
        value["images"][0],
        serde_json::json!({"id": 1, "file_name": "a.bmp", "width": 100, "height": 200})
    );
    assert_eq!(
        value["categories"][0],
        serde_json::json!({"id": 0, "name": "class_0", "supercategory": "none"})
    );
    assert_eq!(
        value["annotations"][0],
        serde_json::json!({
            "id": 1, "image_id": 1, "category_id": 0,
            "bbox": [40.0, 60.0, 20.0, 80.0], "area": 1600.0, "iscrowd": 0
        })
    );
}

#[test]
fn ids_are_contiguous_and_references_resolve() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fx = YoloFixture::new(temp.path());

    let mut images = Vec::new();
    for (idx, labels) in [
        "0 0.5 0.5 0.2 0.2\n1 0.1 0.1 0.1 0.1\n",
        "",
        "2 0.5 0.5 0.5 0.5\n0 0.3 0.3 0.2 0.2\n1 0.9 0.9 0.1 0.1\n",
    ]
    .iter()
    .enumerate()
    {
        let name = format!("img{idx}");
        images.push(fx.image("train", &name, 32, 24));
        fx.label("train", &name, labels);
    }
    images.insert(1, fx.yolo_dir().join("images/train/missing.bmp"));
    let manifest = fx.manifest("train", &images);

    let result = DatasetConverter::new()
        .convert(
            &manifest,
            &fx.coco_dir().join("images/train"),
            &fx.coco_dir().join("annotations/train.json"),
        )
        .expect("convert");
    let doc = &result.document;

    // One manifest line points nowhere.
    assert_eq!(doc.images.len(), 3);
    let image_ids: Vec<u64> = doc.images.iter().map(|i| i.id.as_u64()).collect();
    assert_eq!(image_ids, vec![1, 2, 3]);
    let names: Vec<&str> = doc.images.iter().map(|i| i.file_name.as_str()).collect();
    assert_eq!(names, vec!["img0.bmp", "img1.bmp", "img2.bmp"]);

    let ann_ids: Vec<u64> = doc.annotations.iter().map(|a| a.id.as_u64()).collect();
    assert_eq!(ann_ids, vec![1, 2, 3, 4, 5]);
    let ann_images: Vec<u64> = doc.annotations.iter().map(|a| a.image_id.as_u64()).collect();
    assert_eq!(ann_images, vec![1, 1, 3, 3, 3]);

    let image_set: HashSet<_> = doc.images.iter().map(|i| i.id).collect();
    let category_set: HashSet<_> = doc.categories.iter().map(|c| c.id).collect();
    for ann in &doc.annotations {
        assert!(image_set.contains(&ann.image_id));
        assert!(category_set.contains(&ann.category_id));
    }
    assert_eq!(doc.categories.len(), 3);

    assert_eq!(result.report.counts.manifest_entries, 4);
    assert_eq!(result.report.counts.images, 3);
    assert_eq!(result.report.counts.annotations, 5);
    assert_eq!(result.report.counts.categories, 3);
    assert_eq!(result.report.counts.missing_images, 1);

    let validation = validate_document(doc, &ValidateOptions::default());
    assert!(validation.is_clean(), "{}", validation);
}

#[test]
fn same_class_across_images_yields_one_category() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fx = YoloFixture::new(temp.path());
    let a = fx.image("train", "a", 10, 10);
    let b = fx.image("train", "b", 10, 10);
    fx.label("train", "a", "7 0.5 0.5 0.1 0.1\n");
    fx.label("train", "b", "7 0.5 0.5 0.2 0.2\n7.0 0.4 0.4 0.2 0.2\n");
    let manifest = fx.manifest("train", &[a, b]);

    let names = BTreeMap::from([(7, "parcel".to_string())]);
    let result = DatasetConverter::new()
        .with_class_names(names)
        .convert(
            &manifest,
            &fx.coco_dir().join("images/train"),
            &fx.coco_dir().join("annotations/train.json"),
        )
        .expect("convert");

    assert_eq!(result.document.categories.len(), 1);
    assert_eq!(result.document.categories[0].id.as_u64(), 7);
    assert_eq!(result.document.categories[0].name, "parcel");
    assert!(result
        .document
        .annotations
        .iter()
        .all(|a| a.category_id.as_u64() == 7));
}

#[test]
fn missing_image_then_valid_image_gets_id_one() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fx = YoloFixture::new(temp.path());
    let valid = fx.image("test", "present", 8, 8);
    let missing = fx.yolo_dir().join("images/test/absent.bmp");
    let manifest = fx.manifest("test", &[missing, valid]);

    let result = DatasetConverter::new()
        .convert(
            &manifest,
            &fx.coco_dir().join("images/test"),
            &fx.coco_dir().join("annotations/test.json"),
        )
        .expect("convert");

    assert_eq!(result.document.images.len(), 1);
    assert_eq!(result.document.images[0].id.as_u64(), 1);
    assert_eq!(result.document.images[0].file_name, "present.bmp");
    assert_eq!(
        result
            .report
            .issues_with(ConversionIssueCode::MissingImage)
            .count(),
        1
    );
    assert!(!fx.coco_dir().join("images/test/absent.bmp").exists());
}

#[test]
fn malformed_lines_do_not_shift_later_ids() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fx = YoloFixture::new(temp.path());
    let img = fx.image("train", "a", 10, 10);
    fx.label(
        "train",
        "a",
        "0 0.5 0.5 0.1\n1 0.5 0.5 0.2 0.2\nnot a label line\n1 0.2 0.2 0.2 0.2\n",
    );
    let manifest = fx.manifest("train", &[img]);

    let result = DatasetConverter::new()
        .convert(
            &manifest,
            &fx.coco_dir().join("images/train"),
            &fx.coco_dir().join("annotations/train.json"),
        )
        .expect("convert");

    let ids: Vec<u64> = result
        .document
        .annotations
        .iter()
        .map(|a| a.id.as_u64())
        .collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(result.report.counts.malformed_lines, 2);
}

#[test]
fn blank_manifest_lines_are_ignored() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fx = YoloFixture::new(temp.path());
    let img = fx.image("train", "a", 10, 10);
    let manifest = fx.yolo_dir().join("train.txt");
    fs::write(&manifest, format!("\n\n{}\n   \n", img.display())).expect("write manifest");

    let result = DatasetConverter::new()
        .convert(
            &manifest,
            &fx.coco_dir().join("images/train"),
            &fx.coco_dir().join("annotations/train.json"),
        )
        .expect("convert");

    assert_eq!(result.report.counts.manifest_entries, 1);
    assert_eq!(result.document.images.len(), 1);
}

#[test]
fn missing_manifest_is_an_error() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let err = DatasetConverter::new()
        .convert(
            &temp.path().join("nope.txt"),
            &temp.path().join("images"),
            &temp.path().join("out.json"),
        )
        .unwrap_err();

    assert!(matches!(err, Yolo2CocoError::ManifestRead { .. }));
    assert!(!temp.path().join("out.json").exists());
}

#[test]
fn empty_manifest_writes_empty_document() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let manifest = temp.path().join("empty.txt");
    fs::write(&manifest, "").expect("write manifest");
    let out = temp.path().join("annotations/empty.json");

    let result = DatasetConverter::new()
        .convert(&manifest, &temp.path().join("images"), &out)
        .expect("convert");

    assert!(result.document.images.is_empty());
    let written = read_coco_json(&out).expect("read output");
    assert!(written.images.is_empty());
    assert!(written.annotations.is_empty());
    assert!(written.categories.is_empty());
}
