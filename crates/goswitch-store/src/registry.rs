//! Installed toolchains under `<root>/versions`.
//!
//! The installer owns this directory; the registry only reads it. A version
//! counts as installed when its directory holds an executable `bin/go`.

use crate::error::Result;
use crate::layout::Layout;
use goswitch_fs::{find_executable, from_io};
use goswitch_version::{compare_versions, validate_token};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion {
    pub id:    String,
    pub root:  PathBuf,
    pub valid: bool,
}

impl InstalledVersion {
    fn probe(id: String, root: PathBuf) -> Self {
        let valid = find_executable(root.join("bin"), "go").is_some();
        Self { id, root, valid }
    }

    pub fn bin_dir(&self) -> PathBuf { self.root.join("bin") }

    pub fn go_binary(&self) -> Option<PathBuf> { find_executable(self.bin_dir(), "go") }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    Installed,
    Corrupted,
    Missing,
}

#[derive(Debug, Clone)]
pub struct Registry {
    versions: PathBuf,
}

impl Registry {
    pub fn new(layout: &Layout) -> Self { Self::at(&layout.versions) }

    pub fn at(versions: impl AsRef<Path>) -> Self {
        Self {
            versions: versions.as_ref().to_path_buf(),
        }
    }

    /// Every version directory, valid or not, oldest first.
    pub fn list(&self) -> Result<Vec<InstalledVersion>> {
        let entries = match std::fs::read_dir(&self.versions) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(from_io(&self.versions, e).into()),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| from_io(&self.versions, e))?;
            let Some(id) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if id.starts_with('.') || !entry.path().is_dir() {
                continue;
            }
            versions.push(InstalledVersion::probe(id, entry.path()));
        }
        versions.sort_by(|a, b| compare_versions(&a.id, &b.id));
        Ok(versions)
    }

    /// Identifiers of valid installations, oldest first.
    pub fn installed(&self) -> Result<Vec<String>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|v| v.valid)
            .map(|v| v.id)
            .collect())
    }

    pub fn get(&self, id: &str) -> Option<InstalledVersion> {
        validate_token(id).ok()?;
        let root = self.versions.join(id);
        root.is_dir()
            .then(|| InstalledVersion::probe(id.to_string(), root))
    }

    pub fn status(&self, id: &str) -> InstallStatus {
        match self.get(id) {
            Some(v) if v.valid => InstallStatus::Installed,
            Some(_) => InstallStatus::Corrupted,
            None => InstallStatus::Missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    pub(crate) fn fake_install(versions: &Path, id: &str) {
        let bin = versions.join(id).join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let go = bin.join(goswitch_fs::executable_name("go"));
        std::fs::write(&go, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&go, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    #[test]
    fn test_missing_versions_dir_is_empty() {
        let dir = tempdir().unwrap();
        let registry = Registry::at(dir.path().join("versions"));
        assert!(registry.list().unwrap().is_empty());
        assert_eq!(registry.status("1.22.0"), InstallStatus::Missing);
    }

    #[test]
    fn test_list_sorted_numerically() {
        let dir = tempdir().unwrap();
        for id in ["1.9.9", "1.10.10", "1.2.3"] {
            fake_install(dir.path(), id);
        }
        std::fs::write(dir.path().join("README"), "not a version").unwrap();
        std::fs::create_dir_all(dir.path().join(".staging")).unwrap();

        let registry = Registry::at(dir.path());
        assert_eq!(
            registry.installed().unwrap(),
            vec!["1.2.3", "1.9.9", "1.10.10"]
        );
    }

    #[test]
    fn test_corrupted_version() {
        let dir = tempdir().unwrap();
        fake_install(dir.path(), "1.22.0");
        std::fs::create_dir_all(dir.path().join("1.21.5").join("bin")).unwrap();

        let registry = Registry::at(dir.path());
        assert_eq!(registry.status("1.22.0"), InstallStatus::Installed);
        assert_eq!(registry.status("1.21.5"), InstallStatus::Corrupted);
        assert_eq!(registry.installed().unwrap(), vec!["1.22.0"]);

        let all = registry.list().unwrap();
        assert_eq!(all.len(), 2);
        assert!(!all[0].valid);
    }

    #[test]
    fn test_get_rejects_traversal() {
        let dir = tempdir().unwrap();
        fake_install(dir.path(), "1.22.0");
        let registry = Registry::at(dir.path().join("1.22.0"));
        assert_eq!(registry.get(".."), None);
        assert_eq!(registry.get("../1.22.0"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_binary_is_corrupted() {
        let dir = tempdir().unwrap();
        let bin = dir.path().join("1.22.0").join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("go"), "").unwrap();
        assert_eq!(Registry::at(dir.path()).status("1.22.0"), InstallStatus::Corrupted);
    }
}
