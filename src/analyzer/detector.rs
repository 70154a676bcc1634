use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, warn};
use parser_csv::read_headers;

use crate::context::RunContext;
use crate::fields::{classify_variant, similar_loose};
use crate::types::{FieldVariant, Inconsistency, RequiredFieldsMap};

/// File name → column name → bases exhibiting that exact column
pub type ColumnObservation = BTreeMap<String, BTreeMap<String, BTreeSet<String>>>;

/// Collects observed headers per base, then reports drift against the
/// required fields
#[derive(Debug, Default)]
pub struct InconsistencyDetector {
    observation: ColumnObservation,
}

impl InconsistencyDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the header of one file of one base
    pub fn observe<S: AsRef<str>>(&mut self, base: &str, file_name: &str, headers: &[S]) {
        let columns = self.observation.entry(file_name.to_string()).or_default();
        for header in headers {
            columns
                .entry(header.as_ref().to_string())
                .or_default()
                .insert(base.to_string());
        }
    }

    /// Read the headers of every normalized copy the given bases produced.
    ///
    /// Missing copies are skipped; unreadable ones are logged and skipped.
    pub fn observe_outputs(&mut self, ctx: &RunContext, bases: &[String]) {
        for base in bases {
            let input_dir = ctx.base_input_dir(base);
            for file_name in ctx.required_fields().file_names() {
                let path = input_dir.join(file_name);
                if !path.is_file() {
                    continue;
                }
                match read_headers(&path, ctx.separator()) {
                    Ok(headers) => self.observe(base, file_name, headers.as_slice()),
                    Err(e) => warn!("Cannot read header of {}: {}", path.display(), e),
                }
            }
        }
    }

    pub fn observation(&self) -> &ColumnObservation {
        &self.observation
    }

    /// Consume the observation and report the inconsistencies found
    pub fn detect(self, required: &RequiredFieldsMap) -> Vec<Inconsistency> {
        find_inconsistencies(required, &self.observation)
    }
}

/// Every observed column loosely similar to a required field but spelled
/// differently, grouped by (file, required field)
pub fn find_inconsistencies(required: &RequiredFieldsMap, observation: &ColumnObservation) -> Vec<Inconsistency> {
    let mut inconsistencies = Vec::new();

    for (file_name, fields) in required.iter() {
        let Some(columns) = observation.get(file_name) else {
            continue;
        };

        for field in fields {
            let variants: Vec<FieldVariant> = columns
                .iter()
                .filter(|(column, _)| column.as_str() != field.as_str() && similar_loose(column, field))
                .map(|(column, bases)| FieldVariant {
                    name: column.clone(),
                    bases: bases.iter().cloned().collect(),
                    kind: classify_variant(column, field),
                })
                .collect();

            if variants.is_empty() {
                continue;
            }

            debug!("{} / {}: {} variants", file_name, field, variants.len());
            inconsistencies.push(Inconsistency {
                file_name: file_name.to_string(),
                required_field: field.clone(),
                variants,
            });
        }
    }

    info!("Found {} naming inconsistencies", inconsistencies.len());
    inconsistencies
}
