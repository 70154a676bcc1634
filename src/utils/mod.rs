use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase() == extension)
        .unwrap_or(false)
}

/// Files directly inside `dir` with the given extension, case-insensitive
pub fn find_files_by_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && has_extension(e.path(), extension))
        .map(|e| e.path().to_path_buf())
        .collect()
}

/// Immediate subdirectories of `dir`
pub fn list_subdirectories(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.path().to_path_buf())
        .collect()
}

/// A single, ordinary path component: not empty, not `.` or `..`, no separators
pub fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none()
        && !name.contains(['/', '\\'])
}

/// `dir` lies strictly below `root` without any `..` or `.` hop
fn is_contained(root: &Path, dir: &Path) -> bool {
    match dir.strip_prefix(root) {
        Ok(relative) => {
            relative.components().next().is_some()
                && relative.components().all(|c| matches!(c, Component::Normal(_)))
        }
        Err(_) => false,
    }
}

/// Remove `dir` with its content and create it again empty.
///
/// Refuses any `dir` that does not lie below `root`.
pub fn recreate_dir(root: &Path, dir: &Path) -> io::Result<()> {
    if !is_contained(root, dir) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is outside {}", dir.display(), root.display()),
        ));
    }

    if dir.exists() {
        debug!("Clearing {}", dir.display());
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)
}

/// File name as UTF-8, lossy
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
