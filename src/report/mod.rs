//! Markdown, JSON and spreadsheet artifacts built from run results.
//!
//! Reporting never changes results; callers log its failures and move on.

mod markdown;
mod spreadsheet;
mod summary;

use std::fs;

use anyhow::{Context, Result};
use log::info;

use crate::batch::BatchOutcome;
use crate::config::ProcessingMode;
use crate::context::RunContext;
use crate::types::ValidationResult;

pub use markdown::{render_complete_report, render_validation_report};
pub use spreadsheet::{header_presence, write_inconsistencies_workbook, write_required_fields_workbook, HeaderPresence};
pub use summary::{write_summary, RunReport};

pub const SUMMARY_FILE: &str = "summary.json";
pub const REQUIRED_FIELDS_FILE: &str = "required_fields.xlsx";
pub const INCONSISTENCIES_FILE: &str = "naming_inconsistencies.xlsx";

pub fn validation_report_name(base: &str) -> String {
    format!("validation_report_{}.md", base)
}

pub fn complete_report_name(base: &str) -> String {
    format!("complete_report_{}.md", base)
}

/// Write the markdown reports of one base into `<output>/<BASE>/`
pub fn write_base_reports(ctx: &RunContext, result: &ValidationResult) -> Result<()> {
    let dir = ctx.base_output_dir(&result.base);
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let input_dir = ctx.base_input_dir(&result.base);
    let path = dir.join(validation_report_name(&result.base));
    let report = render_validation_report(result, ctx.mode(), &input_dir)?;
    fs::write(&path, report).with_context(|| format!("writing {}", path.display()))?;

    if ctx.mode() == ProcessingMode::Complete {
        let path = dir.join(complete_report_name(&result.base));
        let report = render_complete_report(result, &input_dir)?;
        fs::write(&path, report).with_context(|| format!("writing {}", path.display()))?;
    }

    info!("Reports for {} written to {}", result.base, dir.display());
    Ok(())
}

/// Write `summary.json` and the spreadsheets into the output root
pub fn write_run_reports(ctx: &RunContext, outcome: &BatchOutcome) -> Result<()> {
    let dir = ctx.output_dir();
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    write_summary(&dir.join(SUMMARY_FILE), &RunReport::new(ctx.mode(), outcome))?;

    let bases: Vec<String> = outcome.results.iter().map(|r| r.base.clone()).collect();
    write_required_fields_workbook(
        &dir.join(REQUIRED_FIELDS_FILE),
        ctx.required_fields(),
        &bases,
        &outcome.observation,
    )?;

    if !outcome.inconsistencies.is_empty() {
        write_inconsistencies_workbook(&dir.join(INCONSISTENCIES_FILE), &outcome.inconsistencies)?;
    }

    info!("Run reports written to {}", dir.display());
    Ok(())
}
