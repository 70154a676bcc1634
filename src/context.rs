use std::path::{Path, PathBuf};

use log::{info, warn};
use parser_csv::Separator;
use parser_template::analyze_template;

use crate::config::{ProcessingMode, ValidatorConfig};
use crate::error::{Result, ValidatorError};
use crate::types::RequiredFieldsMap;

/// Everything a run needs, built once per invocation and shared read-only
/// by every base worker.
#[derive(Debug, Clone)]
pub struct RunContext {
    config: ValidatorConfig,
    required_fields: RequiredFieldsMap,
    template_warnings: Vec<String>,
}

impl RunContext {
    /// Check the data directory and analyse the template.
    ///
    /// Fails before any base is touched when either is unusable.
    pub fn from_config(config: ValidatorConfig) -> Result<Self> {
        if !config.data_dir.is_dir() {
            return Err(ValidatorError::DirectoryNotFound(config.data_dir.clone()));
        }

        let analysis = analyze_template(&config.template_path)?;
        for warning in &analysis.warnings {
            warn!("{}", warning);
        }

        info!(
            "Run context ready: {} files, {} required fields, mode {:?}",
            analysis.required_fields.len(),
            analysis.required_fields.total_fields(),
            config.mode
        );

        Ok(Self {
            config,
            required_fields: analysis.required_fields,
            template_warnings: analysis.warnings,
        })
    }

    /// Build a context around an already known field map
    pub fn new(config: ValidatorConfig, required_fields: RequiredFieldsMap) -> Self {
        Self {
            config,
            required_fields,
            template_warnings: Vec::new(),
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn required_fields(&self) -> &RequiredFieldsMap {
        &self.required_fields
    }

    pub fn template_warnings(&self) -> &[String] {
        &self.template_warnings
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    pub fn mode(&self) -> ProcessingMode {
        self.config.mode
    }

    pub fn separator(&self) -> Separator {
        self.config.separator()
    }

    /// `<output>/<BASE>`, home of the base's reports
    pub fn base_output_dir(&self, base: &str) -> PathBuf {
        self.config.output_dir.join(base)
    }

    /// `<output>/<BASE>/input`, home of the normalized copies
    pub fn base_input_dir(&self, base: &str) -> PathBuf {
        self.base_output_dir(base).join("input")
    }
}
