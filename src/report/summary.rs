use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::batch::BatchOutcome;
use crate::config::ProcessingMode;
use crate::types::{Inconsistency, RunSummary, ValidationResult};

/// Content of `summary.json`
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub generated_at: DateTime<Local>,
    pub mode: ProcessingMode,
    pub summary: &'a RunSummary,
    pub bases: &'a [ValidationResult],
    pub skipped: &'a [String],
    pub inconsistencies: &'a [Inconsistency],
}

impl<'a> RunReport<'a> {
    pub fn new(mode: ProcessingMode, outcome: &'a BatchOutcome) -> Self {
        Self {
            generated_at: Local::now(),
            mode,
            summary: &outcome.summary,
            bases: &outcome.results,
            skipped: &outcome.skipped,
            inconsistencies: &outcome.inconsistencies,
        }
    }
}

pub fn write_summary(path: &Path, report: &RunReport<'_>) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
