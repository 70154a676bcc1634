use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use log::debug;
use parser_csv::Separator;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidatorError};

/// How much work is done per base
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// Locate, normalize and check headers
    #[default]
    Quick,
    /// Quick plus per-file fill statistics and the complete report
    Complete,
}

/// Configuration for a validation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Spreadsheet declaring the required fields
    pub template_path: PathBuf,
    /// Root directory holding the bases
    pub data_dir: PathBuf,
    /// Root of the normalized copies and reports
    pub output_dir: PathBuf,
    /// Minimum CSV files for a base to be detected
    pub min_base_files: usize,
    pub mode: ProcessingMode,
    /// Worker threads used for the per-base pass
    pub threads: usize,
    /// Sniff `;`, `,`, tab and `|` instead of assuming a comma
    pub detect_separator: bool,
    /// Write per-base and run-level reports
    pub write_reports: bool,
    /// Restrict the run to these bases, all discovered bases when empty
    pub bases: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from("template.xlsx"),
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            min_base_files: 5,
            mode: ProcessingMode::Quick,
            threads: num_cpus::get(),
            detect_separator: false,
            write_reports: true,
            bases: Vec::new(),
        }
    }
}

impl ValidatorConfig {
    /// Load a JSON configuration file, absent keys take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| {
            ValidatorError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            ValidatorError::Configuration(format!("invalid configuration {}: {}", path.display(), e))
        })
    }

    pub fn separator(&self) -> Separator {
        if self.detect_separator {
            Separator::Sniff
        } else {
            Separator::default()
        }
    }
}
