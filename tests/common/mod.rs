#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

#[path = "../../src/test_support.rs"]
mod bmp;

pub use bmp::{bmp_bytes, write_bmp};

/// A YOLO dataset laid out as `<root>/yolo/{images,labels}/<split>/`.
pub struct YoloFixture {
    pub root: PathBuf,
}

impl YoloFixture {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn yolo_dir(&self) -> PathBuf {
        self.root.join("yolo")
    }

    /// Writes `images/<split>/<name>.bmp` and returns its path.
    pub fn image(&self, split: &str, name: &str, width: u32, height: u32) -> PathBuf {
        let path = self
            .yolo_dir()
            .join("images")
            .join(split)
            .join(format!("{name}.bmp"));
        write_bmp(&path, width, height);
        path
    }

    /// Writes `labels/<split>/<name>.txt`.
    pub fn label(&self, split: &str, name: &str, content: &str) {
        let path = self
            .yolo_dir()
            .join("labels")
            .join(split)
            .join(format!("{name}.txt"));
        fs::create_dir_all(path.parent().expect("label parent")).expect("create label dir");
        fs::write(path, content).expect("write label file");
    }

    /// Writes `<split>.txt` listing `images` and returns its path.
    pub fn manifest(&self, split: &str, images: &[PathBuf]) -> PathBuf {
        let path = self.yolo_dir().join(format!("{split}.txt"));
        fs::create_dir_all(self.yolo_dir()).expect("create yolo dir");
        let body: String = images
            .iter()
            .map(|p| format!("{}\n", p.display()))
            .collect();
        fs::write(&path, body).expect("write manifest");
        path
    }

    pub fn coco_dir(&self) -> PathBuf {
        self.root.join("coco")
    }
}
