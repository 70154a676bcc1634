//! Encoding-aware CSV plumbing for producer exports.
//!
//! Files arrive from several producers, each with its own text encoding. This
//! crate detects that encoding, reads tables and headers with it, and writes
//! derived files back in the same encoding instead of forcing UTF-8.

mod encoding;
mod separator;
mod table;

pub use encoding::{
    copy_preserving_encoding,
    decode_strict,
    detect_encoding,
    detect_file_encoding,
    encode_strict,
    CopyOutcome,
    DETECTION_PREFIX_LEN,
    SAMPLE_LEN,
};
pub use separator::{sniff_separator, Separator, SEPARATOR_CANDIDATES};
pub use table::{read_headers, CsvTable, TableStats};

pub use encoding_rs::Encoding;

use thiserror::Error;

/// Errors raised while reading or writing CSV content
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("content is not valid {encoding}")]
    Decode { encoding: &'static str },

    #[error("content cannot be represented in {encoding}")]
    Encode { encoding: &'static str },

    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("file has no header row")]
    EmptyFile,
}

pub type Result<T> = std::result::Result<T, CsvError>;
