use crate::env::EnvMap;
use std::path::PathBuf;

/// Home directory as seen by `env`, falling back to the platform lookup.
pub fn user_home(env: &EnvMap) -> Option<PathBuf> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    env.non_empty(var)
        .map(PathBuf::from)
        .or_else(home::home_dir)
}
