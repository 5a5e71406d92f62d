//! Alias store backed by `<root>/aliases`.
//!
//! File format: `name=target` lines, `#` comments, rewritten in sorted order
//! on every mutation.

use crate::error::{Error, Result};
use crate::layout::Layout;
use goswitch_fs::{AtomicWriteOptions, atomic_write, read_optional};
use goswitch_version::{AliasLookup, LATEST, SYSTEM, validate_token};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const MAX_ALIAS_LEN: usize = 64;
const HEADER: &str = "# goswitch aliases\n# Format: alias_name=target_version\n";

pub fn validate_alias_name(name: &str) -> Result<()> {
    if name.eq_ignore_ascii_case(SYSTEM) || name.eq_ignore_ascii_case(LATEST) {
        return Err(Error::ReservedName(name.to_string()));
    }
    let invalid = |reason| {
        Err(Error::InvalidName {
            name: name.to_string(),
            reason,
        })
    };
    if name.is_empty() {
        return invalid("empty");
    }
    if name.len() > MAX_ALIAS_LEN {
        return invalid("longer than 64 characters");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    {
        return invalid("only letters, digits, '.', '-' and '_' are allowed");
    }
    if name.starts_with('.') || name.contains("..") {
        return invalid("must not start with '.' or contain '..'");
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct AliasStore {
    path:    PathBuf,
    entries: BTreeMap<String, String>,
}

impl AliasStore {
    pub fn open(layout: &Layout) -> Result<Self> { Self::load(&layout.aliases_file) }

    /// Loads the store at `path`; a missing file is an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let entries = read_optional(path)?
            .map(|content| parse(&content))
            .unwrap_or_default();
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn resolve(&self, name: &str) -> Option<&str> { self.entries.get(name).map(String::as_str) }

    pub fn set(&mut self, name: &str, target: &str) -> Result<()> {
        validate_alias_name(name)?;
        let target = target.trim();
        validate_token(target).map_err(|source| Error::InvalidTarget {
            target: target.to_string(),
            source,
        })?;

        let mut entries = self.entries.clone();
        entries.insert(name.to_string(), target.to_string());
        self.commit(entries)
    }

    /// Removes `name`, returning its former target.
    pub fn unset(&mut self, name: &str) -> Result<String> {
        let mut entries = self.entries.clone();
        let target = entries
            .remove(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        self.commit(entries)?;
        Ok(target)
    }

    /// All aliases in alphabetical order.
    pub fn list(&self) -> &BTreeMap<String, String> { &self.entries }

    pub fn path(&self) -> &Path { &self.path }

    /// Writes `entries` to disk and adopts them only once the write succeeded.
    fn commit(&mut self, entries: BTreeMap<String, String>) -> Result<()> {
        let mut content = String::from(HEADER);
        for (name, target) in &entries {
            content.push_str(name);
            content.push('=');
            content.push_str(target);
            content.push('\n');
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| goswitch_fs::from_io(parent, e))?;
        }
        atomic_write(&self.path, content.as_bytes(), AtomicWriteOptions::new())?;
        self.entries = entries;
        Ok(())
    }
}

impl AliasLookup for AliasStore {
    fn lookup(&self, name: &str) -> Option<String> { self.resolve(name).map(str::to_string) }
}

fn parse(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let parsed = line
                .split_once('=')
                .map(|(name, target)| (name.trim(), target.trim()))
                .filter(|(name, target)| !name.is_empty() && !target.is_empty());
            if parsed.is_none() {
                debug!(line, "skipping malformed alias line");
            }
            parsed.map(|(n, t)| (n.to_string(), t.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, AliasStore) {
        let dir = tempdir().unwrap();
        let store = AliasStore::load(dir.path().join("aliases")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_reserved_names() {
        let (_dir, mut store) = store();
        for name in ["system", "latest", "Latest"] {
            let err = store.set(name, "1.22.0").unwrap_err();
            assert!(matches!(err, Error::ReservedName(_)), "{name}");
        }
    }

    #[test]
    fn test_invalid_names() {
        let (_dir, mut store) = store();
        let long = "a".repeat(65);
        for name in ["my alias", "", "a/b", ".hidden", "a..b", "tab\t", long.as_str()] {
            let err = store.set(name, "1.22.0").unwrap_err();
            assert!(matches!(err, Error::InvalidName { .. }), "{name:?}");
        }
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_invalid_target() {
        let (_dir, mut store) = store();
        let err = store.set("bad", "../../etc").unwrap_err();
        assert!(matches!(err, Error::InvalidTarget { .. }));
    }

    #[test]
    fn test_set_persists_sorted() {
        let (dir, mut store) = store();
        store.set("stable", "1.21.9").unwrap();
        store.set("edge", "latest").unwrap();
        store.set("stable", "1.22.1").unwrap();

        let content = std::fs::read_to_string(dir.path().join("aliases")).unwrap();
        assert_eq!(content, format!("{HEADER}edge=latest\nstable=1.22.1\n"));

        let reloaded = AliasStore::load(dir.path().join("aliases")).unwrap();
        assert_eq!(reloaded.resolve("stable"), Some("1.22.1"));
        assert_eq!(reloaded.resolve("edge"), Some("latest"));
        assert_eq!(
            reloaded.list().keys().collect::<Vec<_>>(),
            vec!["edge", "stable"]
        );
    }

    #[test]
    fn test_unset() {
        let (_dir, mut store) = store();
        store.set("old", "1.20.14").unwrap();
        assert_eq!(store.unset("old").unwrap(), "1.20.14");
        assert!(matches!(store.unset("old"), Err(Error::NotFound(_))));
        assert_eq!(store.resolve("old"), None);
    }

    #[test]
    fn test_failed_write_leaves_store_unchanged() {
        let (dir, mut store) = store();
        store.set("keep", "1.21.9").unwrap();

        // A directory in place of the file makes every save fail.
        let path = dir.path().join("aliases");
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(store.set("new", "1.22.1").is_err());
        assert_eq!(store.resolve("new"), None);
        assert!(store.unset("keep").is_err());
        assert_eq!(store.resolve("keep"), Some("1.21.9"));
    }

    #[test]
    fn test_parse_skips_comments_and_garbage() {
        let parsed = parse("# comment\n\n a = 1.21 \nnoequals\n=x\nb=\nc=1.22.0\n");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["a"], "1.21");
        assert_eq!(parsed["c"], "1.22.0");
    }
}
