use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use log::{debug, info, warn};

use crate::error::{Result, ValidatorError};
use crate::utils::{file_name_of, find_files_by_extension, is_plain_name, list_subdirectories};

/// Bases stored as `<root>/<BASE>-<file>.csv`
pub fn collect_flat_bases(root: &Path, min_files: usize) -> Vec<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    for path in find_files_by_extension(root, "csv") {
        let name = file_name_of(&path);
        let Some((prefix, _)) = name.split_once('-') else {
            continue;
        };
        if !is_plain_name(prefix) {
            if !prefix.is_empty() {
                warn!("Ignoring {}: '{}' is not a usable base name", name, prefix);
            }
            continue;
        }
        *counts.entry(prefix.to_string()).or_default() += 1;
    }

    counts
        .into_iter()
        .filter(|(base, count)| {
            debug!("Flat candidate {}: {} files", base, count);
            *count >= min_files
        })
        .map(|(base, _)| base)
        .collect()
}

/// Bases stored as `<root>/<BASE>/<file>.csv`
pub fn collect_nested_bases(root: &Path, min_files: usize) -> Vec<String> {
    list_subdirectories(root)
        .into_iter()
        .filter_map(|dir| {
            let count = find_files_by_extension(&dir, "csv").len();
            let base = file_name_of(&dir);
            debug!("Nested candidate {}: {} files", base, count);
            (count >= min_files && is_plain_name(&base)).then_some(base)
        })
        .collect()
}

/// Sorted, unique bases found in either layout under `root`.
///
/// An empty list is not an error; a missing `root` is.
pub fn discover_bases(root: &Path, min_files: usize) -> Result<Vec<String>> {
    if !root.is_dir() {
        return Err(ValidatorError::DirectoryNotFound(root.to_path_buf()));
    }

    info!("Discovering bases in {} (minimum {} files)", root.display(), min_files);

    let flat = collect_flat_bases(root, min_files);
    let nested = collect_nested_bases(root, min_files);
    debug!("Flat layout: {:?}, nested layout: {:?}", flat, nested);

    let bases: BTreeSet<String> = flat.into_iter().chain(nested).collect();

    info!("Found {} bases", bases.len());
    Ok(bases.into_iter().collect())
}
