pub mod analyzer;
pub mod batch;
pub mod config;
pub mod context;
pub mod error;
pub mod fields;
pub mod report;
pub mod scanner;
pub mod types;
pub mod utils;
pub mod validator;

pub use analyzer::{find_inconsistencies, ColumnObservation, InconsistencyDetector};
pub use batch::{validate_bases_async, BatchOutcome, BatchValidator, CancelFlag, Progress, ProgressCallback};
pub use config::{ProcessingMode, ValidatorConfig};
pub use context::RunContext;
pub use error::{Result, ValidatorError};
pub use fields::{classify_variant, normalize_field, similar_loose, similar_strict};
pub use scanner::{discover_bases, locate_file, BaseScanner};
pub use types::{
    BaseStatistics,
    BaseStatus,
    FieldVariant,
    FileStatistics,
    Inconsistency,
    RequiredFieldsMap,
    RunSummary,
    ValidationResult,
    VariantKind,
};
pub use validator::{validate_base, BaseValidator};
