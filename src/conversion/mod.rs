//! YOLO → COCO conversion for a single split.
//!
//! [`DatasetConverter`] holds the settings that stay fixed across splits
//! (class names, label layout, progress display). Each call to
//! [`DatasetConverter::convert`] starts a fresh run with its own id counters
//! and collections, so converting train, val and test with one converter
//! yields three independent documents.

pub mod report;

pub use report::{
    ConversionCounts, ConversionIssue, ConversionIssueCode, ConversionReport, ConversionSeverity,
};

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};

use crate::error::Yolo2CocoError;
use crate::ir::io_coco_json::write_coco_json;
use crate::ir::io_yolo::{read_image_dimensions, read_label_file, read_manifest, LabelLine};
use crate::ir::{
    AnnotationId, AnnotationRecord, CategoryId, CategoryRecord, CocoDocument, IdCounter, ImageId,
    ImageRecord, ImagesToLabels, LabelPathStrategy, YoloLabelRow,
};

/// The result of converting one split.
#[derive(Clone, Debug)]
pub struct Conversion {
    pub document: CocoDocument,
    pub report: ConversionReport,
}

/// Converts YOLO splits into COCO documents.
#[derive(Debug)]
pub struct DatasetConverter {
    class_names: Option<BTreeMap<u64, String>>,
    label_paths: Box<dyn LabelPathStrategy>,
    show_progress: bool,
}

impl Default for DatasetConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetConverter {
    /// A converter with `class_<id>` names, the `images/` → `labels/`
    /// layout and no progress bar.
    pub fn new() -> Self {
        Self {
            class_names: None,
            label_paths: Box::new(ImagesToLabels),
            show_progress: false,
        }
    }

    /// Names categories from `names` instead of `class_<id>`.
    pub fn with_class_names(mut self, names: BTreeMap<u64, String>) -> Self {
        self.class_names = Some(names);
        self
    }

    /// Replaces the rule used to find an image's label file.
    pub fn with_label_strategy(mut self, strategy: impl LabelPathStrategy + 'static) -> Self {
        self.label_paths = Box::new(strategy);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn class_names(&self) -> Option<&BTreeMap<u64, String>> {
        self.class_names.as_ref()
    }

    /// Converts the images listed in `manifest`.
    ///
    /// Images are copied flat into `image_output_dir` (created if absent) and
    /// the document is written once, at the end, to `annotation_output_path`.
    /// Missing images and label files are reported, not returned as errors;
    /// any other I/O failure aborts the run.
    pub fn convert(
        &self,
        manifest: &Path,
        image_output_dir: &Path,
        annotation_output_path: &Path,
    ) -> Result<Conversion, Yolo2CocoError> {
        let image_paths = read_manifest(manifest)?;

        create_dir(image_output_dir)?;
        if let Some(parent) = annotation_output_path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir(parent)?;
            }
        }

        let report = ConversionReport::new(manifest, annotation_output_path);
        let progress = if self.show_progress {
            create_progress_bar(image_paths.len() as u64, &manifest.display().to_string())
        } else {
            ProgressBar::hidden()
        };

        let mut run = ConversionRun::new(self, image_output_dir, report, progress);
        run.report.counts.manifest_entries = image_paths.len();
        for image_path in &image_paths {
            run.add_image(image_path)?;
            run.progress.inc(1);
        }
        let Conversion { document, report } = run.finish();

        write_coco_json(annotation_output_path, &document)?;

        info!(
            "{}: {} images, {} annotations, {} categories -> {}",
            manifest.display(),
            report.counts.images,
            report.counts.annotations,
            report.counts.categories,
            annotation_output_path.display()
        );

        Ok(Conversion { document, report })
    }
}

/// Converts one split with default settings and returns the document.
///
/// Shorthand for [`DatasetConverter::convert`] when the report is not needed.
pub fn convert(
    manifest: &Path,
    image_output_dir: &Path,
    annotation_output_path: &Path,
    class_names: Option<&BTreeMap<u64, String>>,
) -> Result<CocoDocument, Yolo2CocoError> {
    let mut converter = DatasetConverter::new();
    if let Some(names) = class_names {
        converter = converter.with_class_names(names.clone());
    }
    converter
        .convert(manifest, image_output_dir, annotation_output_path)
        .map(|conversion| conversion.document)
}

/// State for a single run. Dropped once the document is written.
struct ConversionRun<'a> {
    converter: &'a DatasetConverter,
    image_output_dir: &'a Path,
    document: CocoDocument,
    /// Class id → category created for it in this run.
    categories: BTreeMap<u64, CategoryId>,
    image_ids: IdCounter,
    annotation_ids: IdCounter,
    /// Base filename → source path of the image last copied under that name.
    copied: HashMap<String, PathBuf>,
    report: ConversionReport,
    progress: ProgressBar,
}

impl<'a> ConversionRun<'a> {
    fn new(
        converter: &'a DatasetConverter,
        image_output_dir: &'a Path,
        report: ConversionReport,
        progress: ProgressBar,
    ) -> Self {
        Self {
            converter,
            image_output_dir,
            document: CocoDocument::new(),
            categories: BTreeMap::new(),
            image_ids: IdCounter::new(),
            annotation_ids: IdCounter::new(),
            copied: HashMap::new(),
            report,
            progress,
        }
    }

    fn add_image(&mut self, image_path: &Path) -> Result<(), Yolo2CocoError> {
        if !image_path.is_file() {
            self.progress
                .suspend(|| warn!("Image not found: {}", image_path.display()));
            self.report.counts.missing_images += 1;
            self.report.add(ConversionIssue::warning(
                ConversionIssueCode::MissingImage,
                format!("image not found: {}", image_path.display()),
            ));
            return Ok(());
        }

        let file_name = image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Yolo2CocoError::InvalidImage {
                path: image_path.to_path_buf(),
                message: "path has no file name".to_string(),
            })?;

        self.copy_image(image_path, &file_name)?;
        let (width, height) = read_image_dimensions(image_path)?;

        let image_id = ImageId::new(self.image_ids.take());
        self.document
            .images
            .push(ImageRecord::new(image_id, file_name, width, height));

        let label_path = self
            .converter
            .label_paths
            .label_path(image_path)
            .filter(|path| path.is_file());
        let Some(label_path) = label_path else {
            self.record_missing_label(image_path);
            return Ok(());
        };

        for (line_idx, line) in read_label_file(&label_path)?.into_iter().enumerate() {
            match line {
                LabelLine::Blank => {}
                LabelLine::Malformed(reason) => {
                    let line_num = line_idx + 1;
                    debug!(
                        "Skipping {}:{}: {}",
                        label_path.display(),
                        line_num,
                        reason
                    );
                    self.report.counts.malformed_lines += 1;
                    self.report.add(ConversionIssue::info(
                        ConversionIssueCode::MalformedLabelLine,
                        format!("{}:{}: {}", label_path.display(), line_num, reason),
                    ));
                }
                LabelLine::Row(row) => self.add_annotation(image_id, width, height, row),
            }
        }

        Ok(())
    }

    fn copy_image(&mut self, image_path: &Path, file_name: &str) -> Result<(), Yolo2CocoError> {
        let destination = self.image_output_dir.join(file_name);

        // A path listed twice in the manifest overwrites only itself.
        if let Some(previous) = self
            .copied
            .insert(file_name.to_string(), image_path.to_path_buf())
            .filter(|previous| previous != image_path)
        {
            self.progress.suspend(|| {
                warn!(
                    "{} overwrites {} in {}",
                    image_path.display(),
                    previous.display(),
                    self.image_output_dir.display()
                )
            });
            self.report.add(ConversionIssue::warning(
                ConversionIssueCode::DuplicateFileName,
                format!(
                    "'{}' is shared by {} and {}; only the later copy is kept",
                    file_name,
                    previous.display(),
                    image_path.display()
                ),
            ));
        }

        // Copying a file onto itself truncates it.
        if is_same_file(image_path, &destination) {
            return Ok(());
        }

        fs::copy(image_path, &destination).map_err(|source| Yolo2CocoError::ImageCopy {
            from: image_path.to_path_buf(),
            to: destination.clone(),
            source,
        })?;
        Ok(())
    }

    fn record_missing_label(&mut self, image_path: &Path) {
        let message = match self.converter.label_paths.label_path(image_path) {
            Some(label_path) => format!("Label not found: {}", label_path.display()),
            None => format!("No label path for image: {}", image_path.display()),
        };
        self.progress.suspend(|| warn!("{}", message));
        self.report.counts.missing_labels += 1;
        self.report.add(ConversionIssue::warning(
            ConversionIssueCode::MissingLabel,
            message,
        ));
    }

    fn add_annotation(&mut self, image_id: ImageId, width: u32, height: u32, row: YoloLabelRow) {
        let category_id = self.category_for(row.class_id);
        let bbox = row.bbox.to_pixel_xywh(f64::from(width), f64::from(height));

        let annotation_id = AnnotationId::new(self.annotation_ids.take());
        self.document.annotations.push(AnnotationRecord::new(
            annotation_id,
            image_id,
            category_id,
            bbox,
        ));
    }

    /// Returns the category for `class_id`, creating it on first sight.
    /// The category id is the class id itself.
    fn category_for(&mut self, class_id: u64) -> CategoryId {
        if let Some(id) = self.categories.get(&class_id) {
            return *id;
        }

        let id = CategoryId::new(class_id);
        let name = match self.converter.class_names.as_ref() {
            None => default_class_name(class_id),
            Some(names) => match names.get(&class_id) {
                Some(name) => name.clone(),
                None => {
                    let fallback = default_class_name(class_id);
                    self.progress.suspend(|| {
                        warn!("Class id {} has no name; using '{}'", class_id, fallback)
                    });
                    self.report.add(ConversionIssue::warning(
                        ConversionIssueCode::UnmappedClassId,
                        format!("class id {class_id} is not in the class map; named '{fallback}'"),
                    ));
                    fallback
                }
            },
        };

        self.document.categories.push(CategoryRecord::new(id, name));
        self.categories.insert(class_id, id);
        id
    }

    fn finish(mut self) -> Conversion {
        self.progress.finish_and_clear();

        let counts = &mut self.report.counts;
        counts.images = self.document.images.len();
        counts.annotations = self.document.annotations.len();
        counts.categories = self.document.categories.len();

        Conversion {
            document: self.document,
            report: self.report,
        }
    }
}

/// Category name used when no mapping supplies one.
pub fn default_class_name(class_id: u64) -> String {
    format!("class_{class_id}")
}

pub(crate) fn create_dir(path: &Path) -> Result<(), Yolo2CocoError> {
    fs::create_dir_all(path).map_err(|source| Yolo2CocoError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
            label
        ))
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}
