#[cfg(test)]
mod tests;

mod derive;
mod stats;
mod validator;

pub use derive::{derive_flow_rate_file, split_flow_rates, Derivation, FLOW_RATE_COLUMN, FLOW_RATE_FILE_COLUMNS};
pub use stats::compute_statistics;
pub use validator::{missing_fields, validate_base};

use crate::context::RunContext;
use crate::types::ValidationResult;

/// Validates bases of one run
pub struct BaseValidator<'a> {
    ctx: &'a RunContext,
}

impl<'a> BaseValidator<'a> {
    pub fn new(ctx: &'a RunContext) -> Self {
        Self { ctx }
    }

    /// Validate a single base
    pub fn validate(&self, base: &str) -> ValidationResult {
        validate_base(self.ctx, base)
    }

    /// Validate bases one after another
    pub fn validate_all(&self, bases: &[String]) -> Vec<ValidationResult> {
        bases.iter().map(|base| self.validate(base)).collect()
    }
}
