//! Conversion report types.
//!
//! A conversion never fails because of a missing image or label file; it
//! records them here instead, next to the counts of what was produced.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// What a single conversion run produced and what it skipped.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConversionReport {
    /// Manifest the run read from.
    pub manifest: PathBuf,
    /// Annotation file the run wrote.
    pub output: PathBuf,
    pub counts: ConversionCounts,
    pub issues: Vec<ConversionIssue>,
}

impl ConversionReport {
    pub fn new(manifest: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            manifest: manifest.into(),
            output: output.into(),
            ..Default::default()
        }
    }

    /// Add an issue to the report.
    pub fn add(&mut self, issue: ConversionIssue) {
        self.issues.push(issue);
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Warning)
            .count()
    }

    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Info)
            .count()
    }

    /// Issues with the given code, in the order they were recorded.
    pub fn issues_with(&self, code: ConversionIssueCode) -> impl Iterator<Item = &ConversionIssue> {
        self.issues.iter().filter(move |i| i.code == code)
    }

    /// True when every manifest entry became an image with a label file and
    /// no label line was dropped.
    pub fn is_complete(&self) -> bool {
        self.counts.missing_images == 0
            && self.counts.missing_labels == 0
            && self.counts.malformed_lines == 0
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} -> {}",
            self.manifest.display(),
            self.output.display()
        )?;
        writeln!(
            f,
            "  {} images, {} categories, {} annotations",
            self.counts.images, self.counts.categories, self.counts.annotations
        )?;

        if !self.is_complete() {
            writeln!(
                f,
                "  skipped: {} missing image(s), {} missing label file(s), {} malformed label line(s)",
                self.counts.missing_images, self.counts.missing_labels, self.counts.malformed_lines
            )?;
        }

        let warnings = self.warning_count();
        if warnings > 0 {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", warnings)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ConversionSeverity::Warning)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        let infos = self.info_count();
        if infos > 0 {
            writeln!(f)?;
            writeln!(f, "Notes ({}):", infos)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ConversionSeverity::Info)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        Ok(())
    }
}

/// Counts gathered during one run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConversionCounts {
    /// Non-blank lines in the manifest.
    pub manifest_entries: usize,
    pub images: usize,
    pub categories: usize,
    pub annotations: usize,
    pub missing_images: usize,
    pub missing_labels: usize,
    pub malformed_lines: usize,
}

/// A single note recorded during conversion.
#[derive(Clone, Debug, Serialize)]
pub struct ConversionIssue {
    pub severity: ConversionSeverity,
    pub code: ConversionIssueCode,
    pub message: String,
}

impl ConversionIssue {
    pub fn warning(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn info(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Info,
            code,
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionSeverity {
    /// Something in the input did not make it into the output.
    Warning,
    /// Bookkeeping that does not change the output.
    Info,
}

/// Stable issue codes for programmatic consumption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionIssueCode {
    /// A manifest entry points at a file that does not exist.
    MissingImage,
    /// No label file was found for an image; it has no annotations.
    MissingLabel,
    /// A label line was skipped because it did not parse.
    MalformedLabelLine,
    /// Two images share a base filename; the later copy replaced the earlier.
    DuplicateFileName,
    /// A class id had no entry in the supplied name mapping.
    UnmappedClassId,
}
