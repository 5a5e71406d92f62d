//! Command-to-binary resolution.
//!
//! A [`TargetResolver`] maps a command name to an absolute binary path.
//! Installed versions chain directory resolvers and never consult PATH;
//! only `system` searches PATH, with the shims directory removed.

use goswitch_fs::find_executable;
use goswitch_platform::program::find_program;
use goswitch_platform::{EnvMap, PathModifier};
use std::path::{Path, PathBuf};

pub trait TargetResolver {
    fn resolve(&self, command: &str) -> Option<PathBuf>;
}

impl<R: TargetResolver> TargetResolver for Option<R> {
    fn resolve(&self, command: &str) -> Option<PathBuf> {
        self.as_ref().and_then(|r| r.resolve(command))
    }
}

impl<R: TargetResolver + ?Sized> TargetResolver for &R {
    fn resolve(&self, command: &str) -> Option<PathBuf> { (**self).resolve(command) }
}

#[derive(Clone)]
pub struct PairResolver<R1, R2> {
    primary:  R1,
    fallback: R2,
}

impl<R1, R2> PairResolver<R1, R2>
where
    R1: TargetResolver,
    R2: TargetResolver,
{
    pub fn new(primary: R1, fallback: R2) -> Self { Self { primary, fallback } }
}

impl<R1, R2> TargetResolver for PairResolver<R1, R2>
where
    R1: TargetResolver,
    R2: TargetResolver,
{
    fn resolve(&self, command: &str) -> Option<PathBuf> {
        self.primary
            .resolve(command)
            .or_else(|| self.fallback.resolve(command))
    }
}

/// Looks only inside one directory, e.g. `<root>/versions/<v>/bin`.
#[derive(Debug, Clone)]
pub struct VersionBinResolver {
    dir: PathBuf,
}

impl VersionBinResolver {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }
}

impl TargetResolver for VersionBinResolver {
    fn resolve(&self, command: &str) -> Option<PathBuf> {
        if !is_bare_name(command) {
            return None;
        }
        find_executable(&self.dir, command)
    }
}

/// Searches an inherited PATH with the shims directory taken out, so a
/// shim can never resolve to itself.
#[derive(Debug, Clone)]
pub struct SystemPathResolver {
    path: Vec<PathBuf>,
    cwd:  PathBuf,
}

impl SystemPathResolver {
    pub fn new(env: &EnvMap, shims: &Path, cwd: impl Into<PathBuf>) -> Self {
        Self {
            path: PathModifier::from_env(env).remove(shims).into_paths(),
            cwd:  cwd.into(),
        }
    }

    pub fn search_path(&self) -> &[PathBuf] { &self.path }
}

impl TargetResolver for SystemPathResolver {
    fn resolve(&self, command: &str) -> Option<PathBuf> {
        if !is_bare_name(command) {
            return None;
        }
        find_program(command, &self.path, &self.cwd)
    }
}

fn is_bare_name(command: &str) -> bool {
    let mut components = Path::new(command).components();
    matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    )
}
