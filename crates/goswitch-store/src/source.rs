//! Effective-version selection.
//!
//! Precedence, highest first: `GOSWITCH_VERSION`, the nearest local version
//! file, the global `<root>/version` file, then `system`.

use crate::alias::AliasStore;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::registry::{InstalledVersion, Registry};
use crate::version_file::{find_version_file, read_version_file};
use crate::{DIR_ENV, VERSION_ENV};
use goswitch_platform::EnvMap;
use goswitch_platform::expand::expand_path;
use goswitch_version::{Resolved, Resolver, SYSTEM, strip_go_prefix};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    ShellOverride,
    LocalFile(PathBuf),
    GlobalFile(PathBuf),
    SystemFallback,
}

impl VersionSource {
    /// Human-readable origin used in error messages.
    pub fn origin(&self) -> String {
        match self {
            VersionSource::ShellOverride => format!("{VERSION_ENV} environment variable"),
            VersionSource::LocalFile(path) | VersionSource::GlobalFile(path) => {
                path.display().to_string()
            }
            VersionSource::SystemFallback => "system (no version configured)".to_string(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            VersionSource::LocalFile(path) | VersionSource::GlobalFile(path) => Some(path.as_path()),
            _ => None,
        }
    }
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.origin()) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    System,
    Installed(InstalledVersion),
    /// The spec matched a version directory that has no usable binary.
    Corrupted(InstalledVersion),
    /// The spec matched nothing installed.
    Unresolved(goswitch_version::Error),
}

/// Outcome of the source chain. An uninstalled version is not an error
/// here; [`ResolvedVersion::require`] turns it into one with the origin
/// attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// The spec exactly as the source stated it.
    pub spec:      String,
    pub selection: Selection,
    pub source:    VersionSource,
}

impl ResolvedVersion {
    /// `system`, the installed identifier, or the unresolved spec.
    pub fn name(&self) -> &str {
        match &self.selection {
            Selection::System => SYSTEM,
            Selection::Installed(v) | Selection::Corrupted(v) => &v.id,
            Selection::Unresolved(_) => self.spec.trim(),
        }
    }

    pub fn is_system(&self) -> bool { matches!(self.selection, Selection::System) }

    /// The installed version, or `None` for `system`; unresolved and
    /// corrupted selections become errors naming their origin.
    pub fn require(&self) -> Result<Option<&InstalledVersion>> {
        let origin = || self.source.origin();
        match &self.selection {
            Selection::System => Ok(None),
            Selection::Installed(v) => Ok(Some(v)),
            Selection::Corrupted(v) => Err(Error::Corrupted {
                version: v.id.clone(),
                root:    v.root.clone(),
                origin:  origin(),
            }),
            Selection::Unresolved(goswitch_version::Error::AliasCycle { name }) => {
                Err(Error::AliasCycle {
                    name:   name.clone(),
                    origin: origin(),
                })
            }
            Selection::Unresolved(_) => Err(Error::NotInstalled {
                spec:   self.spec.clone(),
                origin: origin(),
            }),
        }
    }
}

pub struct SourceChain<'a> {
    layout:   &'a Layout,
    settings: &'a Settings,
    env:      &'a EnvMap,
}

impl<'a> SourceChain<'a> {
    pub fn new(layout: &'a Layout, settings: &'a Settings, env: &'a EnvMap) -> Self {
        Self {
            layout,
            settings,
            env,
        }
    }

    /// Directory the local-file walk starts from.
    pub fn start_dir(&self, cwd: &Path) -> PathBuf {
        match self.env.non_empty(DIR_ENV) {
            Some(dir) => cwd.join(expand_path(dir, self.env)),
            None => cwd.to_path_buf(),
        }
    }

    /// The raw spec in effect and where it came from, without resolving it.
    pub fn current_spec(&self, cwd: &Path) -> Result<(String, VersionSource)> {
        if let Some(spec) = self.env.non_empty(VERSION_ENV) {
            return Ok((spec.to_string(), VersionSource::ShellOverride));
        }

        let start = self.start_dir(cwd);
        if let Some(file) = find_version_file(&start, self.settings.gomod_version_enable)? {
            match file.version {
                Some(version) => return Ok((version, VersionSource::LocalFile(file.path))),
                None => debug!(path = %file.path.display(), "local version file names no version"),
            }
        }

        if let Some(version) = read_version_file(&self.layout.global_file)? {
            return Ok((
                version,
                VersionSource::GlobalFile(self.layout.global_file.clone()),
            ));
        }

        Ok((SYSTEM.to_string(), VersionSource::SystemFallback))
    }

    /// Path of the local version file that applies to `cwd`, if any.
    pub fn version_file_path(&self, cwd: &Path) -> Result<Option<PathBuf>> {
        Ok(
            find_version_file(&self.start_dir(cwd), self.settings.gomod_version_enable)?
                .map(|f| f.path),
        )
    }

    pub fn current_version(&self, cwd: &Path) -> Result<ResolvedVersion> {
        let (spec, source) = self.current_spec(cwd)?;
        debug!(%spec, %source, "version source selected");
        let selection = self.select(&spec)?;
        Ok(ResolvedVersion {
            spec,
            selection,
            source,
        })
    }

    /// Resolves a spec against the installed versions and aliases.
    pub fn select(&self, spec: &str) -> Result<Selection> {
        let registry = Registry::new(self.layout);
        let aliases = AliasStore::open(self.layout)?;
        let installed = registry.installed()?;

        match Resolver::new(&aliases).resolve(spec, &installed) {
            Ok(Resolved::System) => Ok(Selection::System),
            Ok(Resolved::Version(id)) => Ok(match registry.get(&id) {
                Some(v) => Selection::Installed(v),
                None => Selection::Unresolved(goswitch_version::Error::NotInstalled { spec: id }),
            }),
            Err(err) => {
                let literal = strip_go_prefix(spec.trim());
                let target = aliases.resolve(literal).unwrap_or(literal);
                match registry.get(target) {
                    Some(v) if !v.valid => Ok(Selection::Corrupted(v)),
                    _ => Ok(Selection::Unresolved(err)),
                }
            }
        }
    }
}
