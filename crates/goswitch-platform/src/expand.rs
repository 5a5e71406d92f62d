//! Home and variable expansion for user-supplied paths.
//!
//! Toolchains reject unexpanded values such as `~/go` or `$HOME/go`, so
//! every path taken from the environment passes through [`expand_path`].

use crate::dir::user_home;
use crate::env::EnvMap;
use std::path::PathBuf;

/// Expands a leading `~` and `$VAR` / `${VAR}` references against `env`.
/// Unknown variables are left untouched.
pub fn expand_path(input: &str, env: &EnvMap) -> PathBuf {
    let home = || user_home(env).map(|h| h.to_string_lossy().into_owned());
    let expanded = shellexpand::full_with_context_no_errors(input, home, |var| env.get_str(var));
    PathBuf::from(expanded.into_owned())
}

/// Expands each entry of a platform path list (`:`-separated on Unix).
pub fn expand_path_list(input: &str, env: &EnvMap) -> Vec<PathBuf> {
    std::env::split_paths(input)
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| expand_path(&p.to_string_lossy(), env))
        .collect()
}

/// Whether `input` still contains something [`expand_path`] would rewrite.
pub fn needs_expansion(input: &str) -> bool { input.starts_with('~') || input.contains('$') }

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> EnvMap {
        let home = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
        EnvMap::new()
            .with(home, "/home/gopher")
            .with("WORK", "/srv/work")
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(
            expand_path("~/go", &env()),
            PathBuf::from("/home/gopher/go")
        );
    }

    #[test]
    fn test_expand_variables() {
        assert_eq!(
            expand_path("$WORK/go", &env()),
            PathBuf::from("/srv/work/go")
        );
        assert_eq!(
            expand_path("${WORK}/go", &env()),
            PathBuf::from("/srv/work/go")
        );
    }

    #[test]
    fn test_expand_plain_path_unchanged() {
        assert_eq!(expand_path("/opt/go", &env()), PathBuf::from("/opt/go"));
        assert!(!needs_expansion("/opt/go"));
        assert!(needs_expansion("~/go"));
        assert!(needs_expansion("$HOME/go"));
    }

    #[cfg(unix)]
    #[test]
    fn test_expand_path_list() {
        assert_eq!(
            expand_path_list("~/a::$WORK/b", &env()),
            vec![PathBuf::from("/home/gopher/a"), PathBuf::from("/srv/work/b")]
        );
    }
}
