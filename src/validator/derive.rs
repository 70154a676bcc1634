use std::path::Path;

use log::{info, warn};
use parser_csv::{CsvTable, Separator};
use parser_template::ISLAND_FLOW_FILE;

/// Flow-rate column moved out of the islands file
pub const FLOW_RATE_COLUMN: &str = "VazaoMaxima(p95)";

/// Columns of the derived flow-rate file, in order
pub const FLOW_RATE_FILE_COLUMNS: [&str; 3] = ["Codigo", "DescricaoPatio", FLOW_RATE_COLUMN];

/// What happened to an islands copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// Flow-rate file written with this many rows
    Derived { rows: usize },
    /// No flow-rate column, nothing written
    ColumnAbsent,
}

/// Split the flow-rate column off `islands` into its own table.
///
/// `islands` loses the column. Returns `None` when the column is absent; an
/// error when the identifying columns are missing, leaving `islands` untouched.
pub fn split_flow_rates(islands: &mut CsvTable) -> parser_csv::Result<Option<CsvTable>> {
    if !islands.has_column(FLOW_RATE_COLUMN) {
        return Ok(None);
    }

    let flow_rates = islands.select(&FLOW_RATE_FILE_COLUMNS)?;
    islands.drop_column(FLOW_RATE_COLUMN);
    Ok(Some(flow_rates))
}

/// Derive `vazao-ilhas.csv` next to the normalized islands copy and rewrite
/// the copy without the flow-rate column. Both keep the copy's encoding.
pub fn derive_flow_rate_file(islands_copy: &Path, separator: Separator) -> anyhow::Result<Derivation> {
    let mut islands = CsvTable::read(islands_copy, separator)?;

    let Some(flow_rates) = split_flow_rates(&mut islands)? else {
        warn!("{} has no '{}' column, skipping flow-rate derivation", islands_copy.display(), FLOW_RATE_COLUMN);
        return Ok(Derivation::ColumnAbsent);
    };

    let target = islands_copy.with_file_name(ISLAND_FLOW_FILE);
    flow_rates.write(&target)?;
    islands.write(islands_copy)?;

    info!("Derived {} with {} rows", target.display(), flow_rates.rows.len());
    Ok(Derivation::Derived {
        rows: flow_rates.rows.len(),
    })
}
