//! Filesystem primitives shared by the goswitch crates.
//!
//! Every mutation of shared state (alias file, version files, shims) goes
//! through [`atomic_write`], so readers observe either the old or the new
//! content, never a truncated file.

mod error;
mod exec;

pub use error::{Error, Result, from_io};
pub use exec::{executable_name, find_executable, is_executable};

use std::io::Write;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[cfg(unix)]
const DEFAULT_PERMISSIONS: u32 = 0o644;

#[cfg(not(unix))]
const DEFAULT_PERMISSIONS: u32 = 0;

#[derive(Clone, Copy, Debug)]
pub struct AtomicWriteOptions {
    permissions: u32,
    prefix:      &'static str,
}

impl Default for AtomicWriteOptions {
    fn default() -> Self { Self::new() }
}

impl AtomicWriteOptions {
    pub fn new() -> Self {
        Self {
            permissions: DEFAULT_PERMISSIONS,
            prefix:      ".goswitch-",
        }
    }

    #[cfg(unix)]
    pub fn permissions(mut self, permissions: u32) -> Self {
        self.permissions = permissions;
        self
    }

    #[cfg(not(unix))]
    pub fn permissions(self, _permissions: u32) -> Self { self }

    pub fn prefix(mut self, prefix: &'static str) -> Self {
        self.prefix = prefix;
        self
    }

    #[cfg(unix)]
    pub fn into_permissions(self) -> Option<std::fs::Permissions> {
        Some(std::fs::Permissions::from_mode(self.permissions))
    }

    #[cfg(not(unix))]
    pub fn into_permissions(self) -> Option<std::fs::Permissions> { None }
}

/// Writes `content` to a temporary file next to `path` and renames it into
/// place. Concurrent writers do not corrupt the file; the last rename wins.
pub fn atomic_write(
    path: impl AsRef<Path>,
    content: &[u8],
    options: AtomicWriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        Some(_) => Path::new("."),
        None => return Err(Error::NoParent(path.to_path_buf())),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(options.prefix)
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| from_io(parent, e))?;

    tmp.write_all(content).map_err(|e| from_io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| from_io(tmp.path(), e))?;

    if let Some(perms) = options.into_permissions() {
        std::fs::set_permissions(tmp.path(), perms).map_err(|e| from_io(tmp.path(), e))?;
    }

    tmp.persist(path).map_err(|e| from_io(path, e.error))?;
    Ok(())
}

/// Reads a file to a string, mapping a missing file to `None`.
pub fn read_optional(path: impl AsRef<Path>) -> Result<Option<String>> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(from_io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write() -> Result<()> {
        let dir = tempdir().map_err(|e| from_io("tmp", e))?;
        let path = dir.path().join("aliases");
        atomic_write(&path, b"stable=1.22.1\n", AtomicWriteOptions::new())?;
        assert_eq!(std::fs::read(&path).unwrap(), b"stable=1.22.1\n");
        Ok(())
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("version");
        std::fs::write(&path, "1.21.0\n").unwrap();

        atomic_write(&path, b"1.22.0\n", AtomicWriteOptions::new()).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1.22.0\n");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_write_permissions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gofmt");
        atomic_write(&path, b"#!/bin/sh\n", AtomicWriteOptions::new().permissions(0o755)).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        assert!(is_executable(&path));
    }

    #[test]
    fn test_atomic_write_missing_parent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope").join("file");
        let err = atomic_write(&path, b"x", AtomicWriteOptions::new()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_read_optional() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("version");
        assert_eq!(read_optional(&path).unwrap(), None);
        std::fs::write(&path, "1.22.0").unwrap();
        assert_eq!(read_optional(&path).unwrap().as_deref(), Some("1.22.0"));
    }
}
