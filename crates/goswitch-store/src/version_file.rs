//! Version files: `.go-version`, the asdf-style `.tool-versions`, and
//! optionally `go.mod`.

use crate::error::Result;
use goswitch_fs::{AtomicWriteOptions, atomic_write, read_optional};
use goswitch_version::{strip_go_prefix, validate_token};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const GO_VERSION_FILE: &str = ".go-version";
pub const TOOL_VERSIONS_FILE: &str = ".tool-versions";
pub const GO_MOD_FILE: &str = "go.mod";

/// A version file together with the version it names, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionFile {
    pub path:    PathBuf,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Plain,
    ToolVersions,
    GoMod,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.file_name().and_then(|n| n.to_str()) {
            Some(TOOL_VERSIONS_FILE) => Format::ToolVersions,
            Some(GO_MOD_FILE) => Format::GoMod,
            _ => Format::Plain,
        }
    }
}

/// Reads the first usable version from `path`. `None` when the file is
/// missing or names no valid version.
pub fn read_version_file(path: impl AsRef<Path>) -> Result<Option<String>> {
    let path = path.as_ref();
    let Some(content) = read_optional(path)? else {
        return Ok(None);
    };
    let version = match Format::of(path) {
        Format::Plain => parse_plain(&content),
        Format::ToolVersions => parse_tool_versions(&content),
        Format::GoMod => parse_go_mod(&content),
    };
    if version.is_none() {
        debug!(path = %path.display(), "version file names no usable version");
    }
    Ok(version)
}

/// Writes `version` to a plain version file.
pub fn write_version_file(path: impl AsRef<Path>, version: &str) -> Result<()> {
    let version = version.trim();
    validate_token(version)?;
    atomic_write(
        path,
        format!("{version}\n").as_bytes(),
        AtomicWriteOptions::new(),
    )?;
    Ok(())
}

/// Walks from `start` towards the filesystem root and stops at the first
/// directory holding a recognized file. Within one directory `.go-version`
/// wins over `.tool-versions`, which wins over `go.mod` when
/// `include_go_mod` is set. A file naming no usable version still ends the
/// walk. Read-only.
pub fn find_version_file(start: &Path, include_go_mod: bool) -> Result<Option<VersionFile>> {
    let mut names = vec![GO_VERSION_FILE, TOOL_VERSIONS_FILE];
    if include_go_mod {
        names.push(GO_MOD_FILE);
    }

    for dir in start.ancestors() {
        for name in &names {
            let path = dir.join(name);
            if path.is_file() {
                let version = read_version_file(&path)?;
                return Ok(Some(VersionFile { path, version }));
            }
        }
    }
    Ok(None)
}

fn accept(token: &str) -> Option<String> {
    match validate_token(token) {
        Ok(()) => Some(token.to_string()),
        Err(e) => {
            debug!(%e, "skipping version entry");
            None
        }
    }
}

fn parse_plain(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .find_map(accept)
}

fn parse_tool_versions(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let line = line.split('#').next().unwrap_or_default();
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("golang" | "go") => fields.next().and_then(accept),
            _ => None,
        }
    })
}

fn parse_go_mod(content: &str) -> Option<String> {
    let mut go = None;
    for line in content.lines() {
        let line = line.split("//").next().unwrap_or_default().trim();
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next()) {
            (Some("toolchain"), Some(v)) => return accept(strip_go_prefix(v)),
            (Some("go"), Some(v)) if go.is_none() => go = accept(v),
            _ => {}
        }
    }
    go
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_plain() {
        assert_eq!(parse_plain("1.22.1\n"), Some("1.22.1".into()));
        assert_eq!(parse_plain("\n# pinned\n  1.21.0  \n1.20\n"), Some("1.21.0".into()));
        assert_eq!(parse_plain("../../etc\n1.21.0\n"), Some("1.21.0".into()));
        assert_eq!(parse_plain("\n\n"), None);
    }

    #[test]
    fn test_parse_tool_versions() {
        let content = "nodejs 20.1.0\ngolang 1.22.1 1.21.0 # primary\nrust 1.77\n";
        assert_eq!(parse_tool_versions(content), Some("1.22.1".into()));
        assert_eq!(parse_tool_versions("go 1.21.3\n"), Some("1.21.3".into()));
        assert_eq!(parse_tool_versions("nodejs 20.1.0\n"), None);
    }

    #[test]
    fn test_parse_go_mod_toolchain_wins() {
        let content = "module example.com/m\n\ngo 1.21\n\ntoolchain go1.22.3 // pinned\n";
        assert_eq!(parse_go_mod(content), Some("1.22.3".into()));
        assert_eq!(parse_go_mod("module m\ngo 1.21\n"), Some("1.21".into()));
        assert_eq!(parse_go_mod("module m\n"), None);
    }

    #[test]
    fn test_find_walks_upward_and_prefers_newer_name() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".tool-versions"), "golang 1.20.1\n").unwrap();
        std::fs::write(dir.path().join(".go-version"), "1.22.0\n").unwrap();

        let found = find_version_file(&nested, false).unwrap().unwrap();
        assert_eq!(found.path, dir.path().join(".go-version"));
        assert_eq!(found.version.as_deref(), Some("1.22.0"));

        std::fs::write(dir.path().join("a").join(".tool-versions"), "golang 1.21.4\n").unwrap();
        let found = find_version_file(&nested, false).unwrap().unwrap();
        assert_eq!(found.version.as_deref(), Some("1.21.4"));
    }

    #[test]
    fn test_find_stops_at_empty_file() {
        let dir = tempdir().unwrap();
        let child = dir.path().join("child");
        std::fs::create_dir_all(&child).unwrap();
        std::fs::write(dir.path().join(".go-version"), "1.20.1\n").unwrap();
        std::fs::write(child.join(".go-version"), "").unwrap();

        let found = find_version_file(&child, false).unwrap().unwrap();
        assert_eq!(found.path, child.join(".go-version"));
        assert_eq!(found.version, None);
    }

    #[test]
    fn test_find_newer_name_wins_even_without_version() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(".go-version"), "# nothing\n").unwrap();
        std::fs::write(dir.path().join(".tool-versions"), "golang 1.21.0\n").unwrap();

        let found = find_version_file(dir.path(), false).unwrap().unwrap();
        assert_eq!(found.path, dir.path().join(".go-version"));
        assert_eq!(found.version, None);
    }

    #[test]
    fn test_find_go_mod_only_when_enabled() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("go.mod"), "module m\ngo 1.21.6\n").unwrap();

        assert_eq!(find_version_file(dir.path(), false).unwrap(), None);
        let found = find_version_file(dir.path(), true).unwrap().unwrap();
        assert_eq!(found.version.as_deref(), Some("1.21.6"));
    }

    #[test]
    fn test_find_does_not_create_files() {
        let dir = tempdir().unwrap();
        find_version_file(dir.path(), true).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_version_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("version");
        write_version_file(&path, " 1.22.1 ").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1.22.1\n");
        assert!(write_version_file(&path, "../x").is_err());
    }
}
