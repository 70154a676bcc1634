use std::path::PathBuf;

use parser_template::TemplateError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ValidatorError>;

/// Errors that abort a run. Per-file and per-base failures never surface
/// here; they are recorded in the base's `ValidationResult`.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// Unreadable or malformed configuration file
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Template missing or not a spreadsheet
    #[error("configuration error: {0}")]
    Template(#[from] TemplateError),

    /// Data root missing
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
