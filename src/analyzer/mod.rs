//! Cross-base naming drift.
//!
//! Runs after every base of the run has been validated: it reads the headers
//! of the normalized copies and reports observed columns that loosely match a
//! required field but are spelled differently.

mod detector;

pub use detector::{find_inconsistencies, ColumnObservation, InconsistencyDetector};
