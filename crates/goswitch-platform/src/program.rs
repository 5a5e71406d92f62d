//! Program lookup on an explicit search path.

use std::path::{Path, PathBuf};

/// Finds `program` on `search_path`, the way a shell would, without
/// touching the process `PATH`.
pub fn find_program(program: &str, search_path: &[PathBuf], cwd: &Path) -> Option<PathBuf> {
    if search_path.is_empty() {
        return None;
    }
    let joined = std::env::join_paths(search_path).ok()?;
    which::which_in(program, Some(joined), cwd).ok()
}

/// First of `candidates` found on `search_path`.
pub fn find_first<'a>(
    candidates: &[&'a str],
    search_path: &[PathBuf],
    cwd: &Path,
) -> Option<(&'a str, PathBuf)> {
    candidates
        .iter()
        .find_map(|c| find_program(c, search_path, cwd).map(|p| (*c, p)))
}
