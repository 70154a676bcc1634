
mod collector;
mod locator;

use std::path::{Path, PathBuf};

use crate::error::Result;

pub use collector::{collect_flat_bases, collect_nested_bases, discover_bases};
pub use locator::locate_file;

/// Finds bases and their files under a data root
pub struct BaseScanner<'a> {
    /// Directory holding the bases
    root: &'a Path,
    /// Minimum CSV files for a base to count
    min_files: usize,
}

impl<'a> BaseScanner<'a> {
    pub fn new(root: &'a Path, min_files: usize) -> Self {
        Self { root, min_files }
    }

    /// Discover every base in both layouts
    pub fn discover(&self) -> Result<Vec<String>> {
        discover_bases(self.root, self.min_files)
    }

    /// Locate one logical file of a base
    pub fn locate(&self, base: &str, file_name: &str) -> Option<PathBuf> {
        locate_file(self.root, base, file_name)
    }
}
