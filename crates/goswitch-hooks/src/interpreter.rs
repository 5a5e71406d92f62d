//! Interpreter selection for hook scripts.

use goswitch_platform::program::{find_first, find_program};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

const SHEBANG_PROBE_LEN: u64 = 512;

/// Recognized hook script kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Bash,
    Sh,
    PowerShell,
    Batch,
    /// No extension; the first line names the interpreter.
    Shebang,
}

impl ScriptKind {
    /// Kind of `path` by extension. Extension-less files qualify only
    /// when they start with `#!`.
    pub fn detect(path: &Path) -> Option<Self> {
        let Some(ext) = path.extension() else {
            return read_shebang(path).map(|_| ScriptKind::Shebang);
        };
        match ext.to_str()?.to_ascii_lowercase().as_str() {
            "bash" => Some(ScriptKind::Bash),
            "sh" => Some(ScriptKind::Sh),
            "ps1" => Some(ScriptKind::PowerShell),
            "cmd" | "bat" => Some(ScriptKind::Batch),
            _ => None,
        }
    }

    /// Interpreters to try, in order.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            ScriptKind::Bash => &["bash", "sh"],
            ScriptKind::Sh => &["sh", "bash"],
            ScriptKind::PowerShell => &["pwsh", "powershell"],
            ScriptKind::Batch if cfg!(windows) => &["cmd"],
            ScriptKind::Batch => &[],
            ScriptKind::Shebang => DEFAULT_SHELLS,
        }
    }

    /// Arguments placed between the interpreter and the script path.
    pub fn args(self) -> &'static [&'static str] {
        match self {
            ScriptKind::PowerShell => &["-NoProfile", "-ExecutionPolicy", "Bypass", "-File"],
            ScriptKind::Batch => &["/C"],
            _ => &[],
        }
    }
}

const DEFAULT_SHELLS: &[&str] = &["bash", "sh"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub program: PathBuf,
    pub args:    Vec<String>,
}

impl Interpreter {
    /// Picks an interpreter for `path` from programs on `search_path`.
    pub fn resolve(
        kind: ScriptKind,
        path: &Path,
        search_path: &[PathBuf],
        cwd: &Path,
    ) -> Option<Self> {
        if kind == ScriptKind::Shebang {
            if let Some((program, args)) = read_shebang(path) {
                if let Some(found) = find_program(&program, search_path, cwd) {
                    return Some(Self {
                        program: found,
                        args,
                    });
                }
            }
        }

        let (_, program) = find_first(kind.candidates(), search_path, cwd)?;
        Some(Self {
            program,
            args: kind.args().iter().map(|a| a.to_string()).collect(),
        })
    }
}

/// Interpreter name and arguments from a `#!` line.
///
/// `#!/usr/bin/env -S bash -e` yields `("bash", ["-e"])`; otherwise the
/// interpreter path is reduced to its file name so it can be found on the
/// caller's PATH.
pub fn parse_shebang(line: &str) -> Option<(String, Vec<String>)> {
    let rest = line.strip_prefix("#!")?.trim();
    let mut parts = rest.split_whitespace();
    let first = parts.next()?;
    let name = Path::new(first).file_name()?.to_str()?.to_string();

    if name == "env" {
        let mut remaining = parts.skip_while(|p| p.starts_with('-'));
        let program = remaining.next()?.to_string();
        return Some((program, remaining.map(str::to_string).collect()));
    }
    Some((name, parts.map(str::to_string).collect()))
}

fn read_shebang(path: &Path) -> Option<(String, Vec<String>)> {
    let file = std::fs::File::open(path).ok()?;
    let mut line = String::new();
    BufReader::new(file.take(SHEBANG_PROBE_LEN))
        .read_line(&mut line)
        .ok()?;
    parse_shebang(line.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_shebang() {
        assert_eq!(
            parse_shebang("#!/bin/bash"),
            Some(("bash".to_string(), vec![]))
        );
        assert_eq!(
            parse_shebang("#! /usr/bin/python3 -u"),
            Some(("python3".to_string(), vec!["-u".to_string()]))
        );
        assert_eq!(
            parse_shebang("#!/usr/bin/env bash"),
            Some(("bash".to_string(), vec![]))
        );
        assert_eq!(
            parse_shebang("#!/usr/bin/env -S bash -e"),
            Some(("bash".to_string(), vec!["-e".to_string()]))
        );
        assert_eq!(parse_shebang("echo hi"), None);
        assert_eq!(parse_shebang("#!"), None);
        assert_eq!(parse_shebang("#!/usr/bin/env"), None);
    }

    #[test]
    fn test_detect_by_extension() {
        let dir = tempdir().unwrap();
        let check = |name: &str| ScriptKind::detect(&dir.path().join(name));
        assert_eq!(check("01-log.bash"), Some(ScriptKind::Bash));
        assert_eq!(check("02.SH"), Some(ScriptKind::Sh));
        assert_eq!(check("03.ps1"), Some(ScriptKind::PowerShell));
        assert_eq!(check("04.bat"), Some(ScriptKind::Batch));
        assert_eq!(check("notes.txt"), None);
    }

    #[test]
    fn test_detect_extensionless_requires_shebang() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("with"), "#!/bin/sh\necho\n").unwrap();
        std::fs::write(dir.path().join("without"), "echo\n").unwrap();
        assert_eq!(
            ScriptKind::detect(&dir.path().join("with")),
            Some(ScriptKind::Shebang)
        );
        assert_eq!(ScriptKind::detect(&dir.path().join("without")), None);
    }

    #[test]
    fn test_interpreter_table() {
        assert_eq!(ScriptKind::Bash.candidates(), &["bash", "sh"]);
        assert_eq!(ScriptKind::Sh.candidates(), &["sh", "bash"]);
        assert_eq!(ScriptKind::PowerShell.args()[0], "-NoProfile");
        #[cfg(not(windows))]
        assert!(ScriptKind::Batch.candidates().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_shebang_falls_back_to_shell() {
        use std::os::unix::fs::PermissionsExt;

        let bin = tempdir().unwrap();
        let sh = bin.path().join("sh");
        std::fs::write(&sh, "").unwrap();
        std::fs::set_permissions(&sh, std::fs::Permissions::from_mode(0o755)).unwrap();

        let hooks = tempdir().unwrap();
        let hook = hooks.path().join("notify");
        std::fs::write(&hook, "#!/usr/bin/env fish\n").unwrap();

        let search = vec![bin.path().to_path_buf()];
        let interp =
            Interpreter::resolve(ScriptKind::Shebang, &hook, &search, hooks.path()).unwrap();
        assert_eq!(interp.program, sh);
        assert!(interp.args.is_empty());
    }

    #[test]
    fn test_resolve_none_without_candidates() {
        let hooks = tempdir().unwrap();
        let hook = hooks.path().join("a.bash");
        assert_eq!(
            Interpreter::resolve(ScriptKind::Bash, &hook, &[], hooks.path()),
            None
        );
    }
}
