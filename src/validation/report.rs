//! Validation report types.

use serde::Serialize;
use std::fmt;

/// Everything validation found wrong with a COCO document.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Returns true if there are no issues at all.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns true if any issue carries `code`.
    pub fn has(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "Validation passed: no issues found");
        }

        writeln!(
            f,
            "Validation completed with {} error(s) and {} warning(s):",
            self.error_count(),
            self.warning_count()
        )?;
        writeln!(f)?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        Ok(())
    }
}

/// A single validation finding.
#[derive(Clone, Debug, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: IssueCode,
    pub message: String,
    pub context: IssueContext,
}

impl ValidationIssue {
    pub fn error(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            context,
        }
    }

    pub fn warning(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            context,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(
            f,
            "[{}] {:?} in {}: {}",
            severity, self.code, self.context, self.message
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Suspicious, but COCO tools will still load the document.
    Warning,
    /// The document is inconsistent.
    Error,
}

/// Stable issue codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IssueCode {
    DuplicateImageId,
    DuplicateAnnotationId,
    DuplicateCategoryId,

    /// An annotation references a non-existent image.
    MissingImageRef,
    /// An annotation references a non-existent category.
    MissingCategoryRef,

    /// Image or annotation ids are not 1..N in document order.
    NonSequentialIds,

    InvalidImageDimensions,
    EmptyFileName,

    EmptyCategoryName,
    DuplicateCategoryName,

    /// A box value is NaN or infinite.
    BBoxNotFinite,
    /// A box has zero or negative width or height.
    InvalidBBoxSize,
    /// A box extends past the image edges.
    BBoxOutOfBounds,
    /// `area` disagrees with the box's width times height.
    AreaMismatch,
}

/// Where an issue was found.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueContext {
    Document,
    Image { id: u64 },
    Annotation { id: u64 },
    Category { id: u64 },
}

impl fmt::Display for IssueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueContext::Document => write!(f, "document"),
            IssueContext::Image { id } => write!(f, "image {}", id),
            IssueContext::Annotation { id } => write!(f, "annotation {}", id),
            IssueContext::Category { id } => write!(f, "category {}", id),
        }
    }
}
