use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

pub use parser_csv::TableStats;
pub use parser_template::{FileRequirement, RequiredFieldsMap};

/// Outcome of validating one base
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// Base identifier
    pub base: String,
    /// Files located and checked without error
    pub files_processed: usize,
    /// Files with every required field present
    pub files_valid: usize,
    /// Logical files expected from the template
    pub total_files: usize,
    /// Missing files and per-file processing errors
    pub problems: Vec<String>,
    /// Logical file → required fields absent from its header
    pub missing_fields: BTreeMap<String, Vec<String>>,
    /// Wall time of the core pass
    pub elapsed: Duration,
    /// Only filled in complete mode
    pub statistics: Option<BaseStatistics>,
}

impl ValidationResult {
    pub fn new(base: impl Into<String>, total_files: usize) -> Self {
        Self {
            base: base.into(),
            files_processed: 0,
            files_valid: 0,
            total_files,
            problems: Vec::new(),
            missing_fields: BTreeMap::new(),
            elapsed: Duration::ZERO,
            statistics: None,
        }
    }

    pub fn status(&self) -> BaseStatus {
        if self.files_valid == self.total_files {
            BaseStatus::Success
        } else if self.files_processed == 0 {
            BaseStatus::Failure
        } else {
            BaseStatus::Partial
        }
    }

    pub fn is_fully_valid(&self) -> bool {
        self.status() == BaseStatus::Success
    }

    /// Valid files as a percentage of the expected files
    pub fn success_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            self.files_valid as f64 / self.total_files as f64 * 100.0
        }
    }
}

/// Aggregated verdict for one base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseStatus {
    /// Every expected file is valid
    Success,
    /// Some files processed, not all valid
    Partial,
    /// Nothing could be processed
    Failure,
}

impl fmt::Display for BaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseStatus::Success => write!(f, "success"),
            BaseStatus::Partial => write!(f, "partial"),
            BaseStatus::Failure => write!(f, "failure"),
        }
    }
}

/// Extended per-file statistics of a base, complete mode only
#[derive(Debug, Clone, Serialize)]
pub struct BaseStatistics {
    pub files: BTreeMap<String, FileStatistics>,
    pub elapsed: Duration,
}

/// Statistics for one normalized file, or why they could not be computed
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileStatistics {
    Computed(TableStats),
    Error { message: String },
}

/// How a variant differs from the required spelling. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    /// Equal once whitespace is removed
    Spacing,
    /// Differs in accents, case, punctuation or extra characters
    AccentOrCharacter,
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantKind::Spacing => write!(f, "spacing"),
            VariantKind::AccentOrCharacter => write!(f, "accent/character"),
        }
    }
}

/// A spelling of a required field observed in one or more bases
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldVariant {
    pub name: String,
    /// Sorted base identifiers exhibiting this spelling
    pub bases: Vec<String>,
    pub kind: VariantKind,
}

/// Naming drift of one required field across bases
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inconsistency {
    pub file_name: String,
    pub required_field: String,
    /// Never contains the required spelling itself
    pub variants: Vec<FieldVariant>,
}

/// Process-level aggregate of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub bases_total: usize,
    pub bases_fully_valid: usize,
    pub bases_partial: usize,
    pub bases_failed: usize,
    /// Bases not started because the run was cancelled
    pub bases_skipped: usize,
    pub inconsistency_count: usize,
}

impl RunSummary {
    pub fn from_results(results: &[ValidationResult], skipped: usize, inconsistencies: &[Inconsistency]) -> Self {
        let count = |status: BaseStatus| results.iter().filter(|r| r.status() == status).count();

        Self {
            bases_total: results.len() + skipped,
            bases_fully_valid: count(BaseStatus::Success),
            bases_partial: count(BaseStatus::Partial),
            bases_failed: count(BaseStatus::Failure),
            bases_skipped: skipped,
            inconsistency_count: inconsistencies.len(),
        }
    }

    pub fn is_fully_valid(&self) -> bool {
        self.bases_skipped == 0 && self.bases_fully_valid == self.bases_total
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bases: {} ready, {} partial, {} failed, {} skipped; {} naming inconsistencies",
            self.bases_total,
            self.bases_fully_valid,
            self.bases_partial,
            self.bases_failed,
            self.bases_skipped,
            self.inconsistency_count
        )
    }
}
