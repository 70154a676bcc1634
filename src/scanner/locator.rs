use std::path::{Path, PathBuf};

use log::debug;

/// Physical file of `file_name` for `base`, flat layout first, then nested
pub fn locate_file(root: &Path, base: &str, file_name: &str) -> Option<PathBuf> {
    let candidates = [
        root.join(format!("{}-{}", base, file_name)),
        root.join(base).join(file_name),
    ];

    let found = candidates.into_iter().find(|path| path.is_file());
    match &found {
        Some(path) => debug!("{} / {} -> {}", base, file_name, path.display()),
        None => debug!("{} / {} not found", base, file_name),
    }
    found
}
