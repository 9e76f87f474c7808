//! Configuration for converting a whole dataset, one split at a time.
//!
//! ```yaml
//! input_path: /data/parcels/yolo
//! output_path: /data/parcels/coco
//! train: train.txt
//! val: val.txt
//! test: test.txt
//! class_names:
//!   0: parcel
//! label_layout: images-to-labels
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::conversion::DatasetConverter;
use crate::error::Yolo2CocoError;
use crate::ir::{ImagesToLabels, SiblingLabels};

/// File name the resolved configuration is saved under in the output root.
pub const SAVED_CONFIG_NAME: &str = "cfg.yaml";

/// A dataset split. Each one is converted independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    pub fn name(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How label files are located relative to their images.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum LabelLayout {
    /// `.../images/x.jpg` → `.../labels/x.txt`
    #[default]
    ImagesToLabels,
    /// `.../x.jpg` → `.../x.txt`
    Sibling,
}

impl LabelLayout {
    /// Installs the matching label-path strategy on `converter`.
    pub fn apply(self, converter: DatasetConverter) -> DatasetConverter {
        match self {
            LabelLayout::ImagesToLabels => converter.with_label_strategy(ImagesToLabels),
            LabelLayout::Sibling => converter.with_label_strategy(SiblingLabels),
        }
    }
}

/// Inputs and outputs for a multi-split conversion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitsConfig {
    /// Directory the manifest names are resolved against.
    pub input_path: PathBuf,

    /// Root of the COCO layout to produce.
    pub output_path: PathBuf,

    /// Manifest file name for each split, relative to `input_path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_names: Option<BTreeMap<u64, String>>,

    #[serde(default)]
    pub label_layout: LabelLayout,
}

impl SplitsConfig {
    /// Loads and checks a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, Yolo2CocoError> {
        let data = fs::read_to_string(path).map_err(|source| Yolo2CocoError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SplitsConfig =
            serde_yaml::from_str(&data).map_err(|source| Yolo2CocoError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        if config.manifests().is_empty() {
            return Err(Yolo2CocoError::ConfigInvalid {
                path: path.to_path_buf(),
                message: "no split configured; set at least one of train, val, test".to_string(),
            });
        }

        Ok(config)
    }

    /// Writes the configuration as YAML.
    pub fn save(&self, path: &Path) -> Result<(), Yolo2CocoError> {
        let yaml = serde_yaml::to_string(self).map_err(|source| Yolo2CocoError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, yaml).map_err(|source| Yolo2CocoError::FileWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Configured splits with their resolved manifest paths, in
    /// train, val, test order.
    pub fn manifests(&self) -> Vec<(Split, PathBuf)> {
        Split::ALL
            .into_iter()
            .filter_map(|split| {
                self.manifest_name(split)
                    .map(|name| (split, self.input_path.join(name)))
            })
            .collect()
    }

    fn manifest_name(&self, split: Split) -> Option<&str> {
        match split {
            Split::Train => self.train.as_deref(),
            Split::Val => self.val.as_deref(),
            Split::Test => self.test.as_deref(),
        }
    }

    /// Output directory for a split's copied images.
    pub fn image_dir(&self, split: Split) -> PathBuf {
        self.output_path.join("images").join(split.name())
    }

    /// Output path for a split's annotation file.
    pub fn annotation_path(&self, split: Split) -> PathBuf {
        self.output_path
            .join("annotations")
            .join(format!("{}.json", split.name()))
    }

    /// A converter configured with this file's class names and label layout.
    pub fn converter(&self) -> DatasetConverter {
        let mut converter = self.label_layout.apply(DatasetConverter::new());
        if let Some(names) = &self.class_names {
            converter = converter.with_class_names(names.clone());
        }
        converter
    }
}
