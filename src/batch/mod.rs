//! Multi-base scheduling.
//!
//! Bases are independent during validation, so they run in parallel with only
//! the read-only [`RunContext`] shared. Inconsistency detection waits for all
//! of them.

mod runner;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::analyzer::ColumnObservation;
use crate::types::{Inconsistency, RunSummary, ValidationResult};

pub use runner::{validate_bases_async, BatchValidator};

/// Progress of a batch, emitted once per finished base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// Base that just finished
    pub base: String,
}

pub type ProgressCallback = Arc<dyn Fn(&Progress) + Send + Sync>;

/// Cooperative cancellation, checked before each base starts
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything a batch produced
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// One result per base that started, in input order
    pub results: Vec<ValidationResult>,
    /// Bases never started because the run was cancelled
    pub skipped: Vec<String>,
    /// Headers observed in the normalized copies
    pub observation: ColumnObservation,
    pub inconsistencies: Vec<Inconsistency>,
    pub summary: RunSummary,
}
