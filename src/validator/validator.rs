use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use log::{debug, info, warn};
use parser_csv::{copy_preserving_encoding, read_headers, Separator};
use parser_template::ISLANDS_FILE;

use super::derive::derive_flow_rate_file;
use super::stats::compute_statistics;
use crate::config::ProcessingMode;
use crate::context::RunContext;
use crate::fields::similar_strict;
use crate::scanner::BaseScanner;
use crate::types::ValidationResult;
use crate::utils::{is_plain_name, recreate_dir};

/// Validate one base against the run's required fields.
///
/// Always returns a result; per-file failures land in `problems`.
pub fn validate_base(ctx: &RunContext, base: &str) -> ValidationResult {
    let start = Instant::now();
    let required = ctx.required_fields();
    let mut result = ValidationResult::new(base, required.len());

    info!("Validating base {} ({} files expected)", base, required.len());

    if !is_plain_name(base) {
        warn!("Refusing to validate '{}': not a usable base name", base);
        result.problems.push(format!("invalid base name: {}", base));
        result.elapsed = start.elapsed();
        return result;
    }

    let input_dir = ctx.base_input_dir(base);
    if let Err(e) = recreate_dir(ctx.output_dir(), &input_dir) {
        warn!("{}: cannot prepare {}: {}", base, input_dir.display(), e);
        result.problems.push(format!("cannot prepare output directory {}: {}", input_dir.display(), e));
        result.elapsed = start.elapsed();
        return result;
    }

    let scanner = BaseScanner::new(ctx.data_dir(), ctx.config().min_base_files);
    for (file_name, fields) in required.iter() {
        let copy = input_dir.join(file_name);

        // Derived earlier in this pass, the derived copy wins over any source file
        let checked = if copy.is_file() {
            debug!("{}: using derived {}", base, file_name);
            check_header(&copy, fields, ctx.separator())
        } else {
            let Some(source) = scanner.locate(base, file_name) else {
                warn!("{}: file not found: {}", base, file_name);
                result.problems.push(format!("file not found: {}", file_name));
                continue;
            };
            process_file(&source, &copy, file_name, fields, ctx.separator())
        };

        match checked {
            Ok(missing) => {
                result.files_processed += 1;
                if missing.is_empty() {
                    result.files_valid += 1;
                } else {
                    debug!("{}: {} missing {:?}", base, file_name, missing);
                    result.missing_fields.insert(file_name.to_string(), missing);
                }
            }
            Err(e) => {
                warn!("{}: error processing {}: {:#}", base, file_name, e);
                result.problems.push(format!("error processing {}: {:#}", file_name, e));
            }
        }
    }

    result.elapsed = start.elapsed();

    if ctx.mode() == ProcessingMode::Complete {
        result.statistics = Some(compute_statistics(&input_dir, ctx.separator()));
    }

    info!(
        "Base {}: {}/{} processed, {}/{} valid in {:.2}s",
        base,
        result.files_processed,
        result.total_files,
        result.files_valid,
        result.total_files,
        result.elapsed.as_secs_f64()
    );

    result
}

/// Normalize one file to `copy` and return its missing required fields
fn process_file(
    source: &Path,
    copy: &Path,
    file_name: &str,
    fields: &[String],
    separator: Separator,
) -> anyhow::Result<Vec<String>> {
    let outcome = copy_preserving_encoding(source, copy)
        .with_context(|| format!("copying {}", source.display()))?;
    debug!(
        "{} copied as {} (re-encoded: {})",
        file_name,
        outcome.encoding.name(),
        outcome.reencoded
    );

    if file_name == ISLANDS_FILE {
        if let Err(e) = derive_flow_rate_file(copy, separator) {
            warn!("Flow-rate derivation failed for {}: {:#}", copy.display(), e);
        }
    }

    check_header(copy, fields, separator)
}

fn check_header(copy: &Path, fields: &[String], separator: Separator) -> anyhow::Result<Vec<String>> {
    if fields.is_empty() {
        return Ok(Vec::new());
    }

    let headers = read_headers(copy, separator).context("reading header")?;
    Ok(missing_fields(fields, &headers))
}

/// Required fields matched by no header, exactly or by strict similarity
pub fn missing_fields(required: &[String], headers: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|field| {
            !headers
                .iter()
                .any(|header| header == *field || similar_strict(header, field))
        })
        .cloned()
        .collect()
}
