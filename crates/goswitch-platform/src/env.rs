//! Environment snapshots and PATH editing.
//!
//! Components never read or write the process environment directly. The
//! binary snapshots it once into an [`EnvMap`] and every derived
//! environment is a modified copy.

use crate::error::Result;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

fn normalize_key(key: &OsStr) -> OsString {
    if cfg!(windows) {
        key.to_ascii_uppercase()
    } else {
        key.to_os_string()
    }
}

/// Truthy values for boolean environment switches.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvMap {
    vars: BTreeMap<OsString, OsString>,
}

impl EnvMap {
    pub fn new() -> Self { Self::default() }

    pub fn from_process() -> Self { std::env::vars_os().collect() }

    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars
            .get(&normalize_key(OsStr::new(key)))
            .map(OsString::as_os_str)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> { self.get(key).and_then(OsStr::to_str) }

    /// The value of `key` with surrounding whitespace removed, if not empty.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get_str(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn is_truthy(&self, key: &str) -> bool { self.get_str(key).is_some_and(is_truthy) }

    pub fn set(&mut self, key: impl AsRef<OsStr>, value: impl Into<OsString>) {
        self.vars.insert(normalize_key(key.as_ref()), value.into());
    }

    pub fn with(mut self, key: impl AsRef<OsStr>, value: impl Into<OsString>) -> Self {
        self.set(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<OsString> {
        self.vars.remove(&normalize_key(OsStr::new(key)))
    }

    pub fn contains(&self, key: &str) -> bool { self.get(key).is_some() }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    /// Entries of `PATH`, empty segments dropped.
    pub fn path_list(&self) -> Vec<PathBuf> {
        self.get("PATH")
            .map(|val| {
                std::env::split_paths(val)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl<K, V> FromIterator<(K, V)> for EnvMap
where
    K: AsRef<OsStr>,
    V: Into<OsString>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut env = EnvMap::new();
        for (k, v) in iter {
            env.set(k, v);
        }
        env
    }
}

pub fn paths_equal(p1: &Path, p2: &Path) -> bool {
    fn normalize(p: &Path) -> String {
        let s = p.to_string_lossy();
        let s = s.trim_end_matches(['/', '\\']);
        if cfg!(windows) {
            s.replace('/', "\\").to_lowercase()
        } else {
            s.to_string()
        }
    }
    normalize(p1) == normalize(p2)
}

#[derive(Debug, Clone, Default)]
pub struct PathModifier {
    paths: Vec<PathBuf>,
}

impl PathModifier {
    pub fn new(paths: Vec<PathBuf>) -> Self { Self { paths } }

    pub fn from_env(env: &EnvMap) -> Self { Self::new(env.path_list()) }

    /// Moves `path` to the front, dropping any later duplicate.
    pub fn prepend(mut self, path: PathBuf) -> Self {
        self.paths.retain(|p| !paths_equal(p, &path));
        self.paths.insert(0, path);
        self
    }

    pub fn remove(mut self, path: &Path) -> Self {
        self.paths.retain(|p| !paths_equal(p, path));
        self
    }

    pub fn contains(&self, path: &Path) -> bool { self.paths.iter().any(|p| paths_equal(p, path)) }

    pub fn paths(&self) -> &[PathBuf] { &self.paths }

    pub fn into_paths(self) -> Vec<PathBuf> { self.paths }

    pub fn build(&self) -> Result<OsString> { Ok(std::env::join_paths(&self.paths)?) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_env(paths: &[&str]) -> EnvMap {
        let joined = std::env::join_paths(paths).unwrap();
        EnvMap::new().with("PATH", joined)
    }

    #[test]
    fn test_is_truthy() {
        for v in ["1", "true", "TRUE", "yes", " Yes "] {
            assert!(is_truthy(v), "{v}");
        }
        for v in ["", "0", "false", "no", "on"] {
            assert!(!is_truthy(v), "{v}");
        }
    }

    #[test]
    fn test_env_map_copy_on_write() {
        let base = EnvMap::new().with("GOPATH", "/go");
        let mut child = base.clone();
        child.set("GOPATH", "/other");
        child.remove("MISSING");

        assert_eq!(base.get_str("GOPATH"), Some("/go"));
        assert_eq!(child.get_str("GOPATH"), Some("/other"));
    }

    #[test]
    fn test_env_map_non_empty() {
        let env = EnvMap::new().with("A", "  ").with("B", " x ");
        assert_eq!(env.non_empty("A"), None);
        assert_eq!(env.non_empty("B"), Some("x"));
        assert_eq!(env.non_empty("C"), None);
    }

    #[test]
    fn test_path_list_skips_empty_segments() {
        let sep = if cfg!(windows) { ";" } else { ":" };
        let env = EnvMap::new().with("PATH", format!("/a{sep}{sep}/b"));
        assert_eq!(
            env.path_list(),
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }

    #[test]
    fn test_path_modifier_prepend_moves_to_front() {
        let modifier = PathModifier::from_env(&path_env(&["/usr/bin", "/opt/go/bin"]))
            .prepend(PathBuf::from("/opt/go/bin"));
        assert_eq!(
            modifier.paths(),
            &[PathBuf::from("/opt/go/bin"), PathBuf::from("/usr/bin")]
        );
    }

    #[test]
    fn test_path_modifier_remove() {
        let modifier = PathModifier::from_env(&path_env(&["/root/.goswitch/shims", "/usr/bin"]))
            .remove(Path::new("/root/.goswitch/shims/"));
        assert!(!modifier.contains(Path::new("/root/.goswitch/shims")));
        assert!(modifier.contains(Path::new("/usr/bin")));
    }

    #[test]
    fn test_path_modifier_build() {
        let modifier = PathModifier::default().prepend(PathBuf::from("/custom"));
        let built = modifier.build().unwrap();
        assert_eq!(built, OsString::from("/custom"));
    }

    #[test]
    fn test_paths_equal_normalization() {
        assert!(paths_equal(Path::new("/path/"), Path::new("/path")));
        assert!(!paths_equal(Path::new("/path1"), Path::new("/path2")));
        #[cfg(windows)]
        assert!(paths_equal(Path::new("C:\\Go"), Path::new("c:/go")));
        #[cfg(not(windows))]
        assert!(!paths_equal(Path::new("/Go"), Path::new("/go")));
    }
}
