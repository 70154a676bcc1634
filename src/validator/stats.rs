use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use log::{debug, warn};
use parser_csv::{CsvTable, Separator};

use crate::types::{BaseStatistics, FileStatistics};
use crate::utils::{file_name_of, find_files_by_extension};

/// Fill statistics of every normalized file in `input_dir`.
///
/// An unreadable file gets an error marker; nothing here fails the base.
pub fn compute_statistics(input_dir: &Path, separator: Separator) -> BaseStatistics {
    let start = Instant::now();
    let mut files = BTreeMap::new();

    for path in find_files_by_extension(input_dir, "csv") {
        let name = file_name_of(&path);
        let stats = match CsvTable::read(&path, separator) {
            Ok(table) => {
                let stats = table.stats();
                debug!("{}: {} rows, {} columns, {:.1}% filled", name, stats.rows, stats.columns, stats.fill_rate);
                FileStatistics::Computed(stats)
            }
            Err(e) => {
                warn!("Statistics unavailable for {}: {}", name, e);
                FileStatistics::Error { message: e.to_string() }
            }
        };
        files.insert(name, stats);
    }

    BaseStatistics {
        files,
        elapsed: start.elapsed(),
    }
}
