use std::fmt::{self, Write};
use std::path::Path;

use chrono::Local;

use crate::config::ProcessingMode;
use crate::types::{FileStatistics, ValidationResult};

fn mode_label(mode: ProcessingMode) -> &'static str {
    match mode {
        ProcessingMode::Quick => "quick",
        ProcessingMode::Complete => "complete",
    }
}

/// Per-base validation report
pub fn render_validation_report(
    result: &ValidationResult,
    mode: ProcessingMode,
    input_dir: &Path,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_validation_report(&mut out, result, mode, input_dir)?;
    Ok(out)
}

/// Per-base report with per-file fill statistics
pub fn render_complete_report(result: &ValidationResult, input_dir: &Path) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_validation_report(&mut out, result, ProcessingMode::Complete, input_dir)?;
    write_statistics(&mut out, result)?;
    Ok(out)
}

fn write_validation_report(
    out: &mut impl Write,
    result: &ValidationResult,
    mode: ProcessingMode,
    input_dir: &Path,
) -> fmt::Result {
    writeln!(out, "# Validation report: {}", result.base)?;
    writeln!(out)?;
    writeln!(out, "- Date: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "- Mode: {}", mode_label(mode))?;
    writeln!(out, "- Elapsed: {:.2}s", result.elapsed.as_secs_f64())?;
    writeln!(out)?;
    writeln!(out, "## Summary")?;
    writeln!(out)?;
    writeln!(out, "- Files processed: {}/{}", result.files_processed, result.total_files)?;
    writeln!(out, "- Files valid: {}/{}", result.files_valid, result.total_files)?;
    writeln!(out, "- Success rate: {:.1}%", result.success_rate())?;

    let status = if result.is_fully_valid() {
        "READY: every file carries its required fields"
    } else {
        "REQUIRES CORRECTIONS"
    };
    writeln!(out, "- Status: {}", status)?;

    if !result.missing_fields.is_empty() {
        writeln!(out)?;
        writeln!(out, "## Missing fields")?;
        for (file, fields) in &result.missing_fields {
            writeln!(out)?;
            writeln!(out, "### {}", file)?;
            for field in fields {
                writeln!(out, "- {}", field)?;
            }
        }
    }

    if !result.problems.is_empty() {
        writeln!(out)?;
        writeln!(out, "## Problems")?;
        writeln!(out)?;
        for problem in &result.problems {
            writeln!(out, "- {}", problem)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "## Output")?;
    writeln!(out)?;
    writeln!(out, "Normalized files: `{}`", input_dir.display())
}

fn write_statistics(out: &mut impl Write, result: &ValidationResult) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "## File statistics")?;
    writeln!(out)?;

    let Some(statistics) = &result.statistics else {
        return writeln!(out, "No statistics computed.");
    };

    writeln!(out, "Computed in {:.2}s", statistics.elapsed.as_secs_f64())?;
    writeln!(out)?;
    writeln!(out, "| File | Rows | Columns | Empty cells | Fill rate |")?;
    writeln!(out, "|------|-----:|--------:|------------:|----------:|")?;
    for (file, stats) in &statistics.files {
        match stats {
            FileStatistics::Computed(stats) => writeln!(
                out,
                "| {} | {} | {} | {} | {:.1}% |",
                file, stats.rows, stats.columns, stats.empty_cells, stats.fill_rate
            )?,
            FileStatistics::Error { message } => writeln!(out, "| {} | error: {} | | | |", file, message)?,
        }
    }

    Ok(())
}
