//! Whole-dataset driver: lays out the COCO output tree and converts each
//! configured split with a fresh run.
//!
//! Output layout under `output_path`:
//!
//! ```text
//! cfg.yaml
//! images/<split>/...
//! annotations/<split>.json
//! ```

use log::info;

use crate::config::{Split, SplitsConfig, SAVED_CONFIG_NAME};
use crate::conversion::{create_dir, Conversion};
use crate::error::Yolo2CocoError;

/// The result of converting one split.
#[derive(Clone, Debug)]
pub struct SplitOutcome {
    pub split: Split,
    pub conversion: Conversion,
}

/// Converts every split named in `config`, in train, val, test order.
///
/// The first fatal error stops the remaining splits; files already written
/// for earlier splits stay in place.
pub fn convert_splits(
    config: &SplitsConfig,
    show_progress: bool,
) -> Result<Vec<SplitOutcome>, Yolo2CocoError> {
    create_dir(&config.output_path)?;
    config.save(&config.output_path.join(SAVED_CONFIG_NAME))?;
    create_dir(&config.output_path.join("images"))?;
    create_dir(&config.output_path.join("annotations"))?;

    let converter = config.converter().with_progress(show_progress);
    let mut outcomes = Vec::new();

    for (split, manifest) in config.manifests() {
        info!("Converting {} split from {}", split, manifest.display());
        let conversion = converter.convert(
            &manifest,
            &config.image_dir(split),
            &config.annotation_path(split),
        )?;
        outcomes.push(SplitOutcome { split, conversion });
    }

    Ok(outcomes)
}
