//! Executable probing.

use std::path::{Path, PathBuf};

#[cfg(windows)]
const WINDOWS_EXTENSIONS: &[&str] = &["exe", "cmd", "bat", "com"];

/// Platform file name of an executable: `go` on Unix, `go.exe` on Windows.
pub fn executable_name(name: &str) -> String {
    if cfg!(windows) && Path::new(name).extension().is_none() {
        format!("{name}.exe")
    } else {
        name.to_string()
    }
}

/// Whether `path` is a regular file the current user may execute.
///
/// Symlinks are followed. On Windows a file is executable when its
/// extension is one of the launchable ones.
pub fn is_executable(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    if !meta.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o111 != 0
    }
    #[cfg(windows)]
    {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| WINDOWS_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e)))
    }
    #[cfg(not(any(unix, windows)))]
    {
        true
    }
}

/// Looks for `name` directly inside `dir`, never recursing and never
/// consulting `PATH`.
pub fn find_executable(dir: impl AsRef<Path>, name: &str) -> Option<PathBuf> {
    let dir = dir.as_ref();

    #[cfg(windows)]
    {
        if Path::new(name).extension().is_some() {
            let candidate = dir.join(name);
            return is_executable(&candidate).then_some(candidate);
        }
        WINDOWS_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{name}.{ext}")))
            .find(|c| is_executable(c))
    }
    #[cfg(not(windows))]
    {
        let candidate = dir.join(name);
        is_executable(&candidate).then_some(candidate)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn touch(path: &Path, mode: u32) {
        std::fs::write(path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn test_is_executable_checks_mode() {
        let dir = tempdir().unwrap();
        let exe = dir.path().join("go");
        let plain = dir.path().join("README");
        touch(&exe, 0o755);
        touch(&plain, 0o644);

        assert!(is_executable(&exe));
        assert!(!is_executable(&plain));
        assert!(!is_executable(dir.path()));
        assert!(!is_executable(dir.path().join("missing")));
    }

    #[test]
    fn test_find_executable_only_in_dir() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("gofmt"), 0o755);

        assert_eq!(
            find_executable(dir.path(), "gofmt"),
            Some(dir.path().join("gofmt"))
        );
        assert_eq!(find_executable(dir.path(), "sh"), None);
    }

    #[test]
    fn test_executable_name_unix() {
        assert_eq!(executable_name("go"), "go");
    }
}
