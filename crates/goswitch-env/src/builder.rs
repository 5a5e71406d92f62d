use crate::abi::{GoEnvProbe, ToolchainProbe};
use crate::cache_key::CacheKey;
use crate::error::{Error, Result};
use goswitch_platform::dir::user_home;
use goswitch_platform::expand::{expand_path_list, needs_expansion};
use goswitch_platform::{EnvMap, PathModifier, Target};
use goswitch_store::{InstalledVersion, Layout, ResolvedVersion, Settings};
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

/// Child-process environment: the full PATH plus variable overrides on top
/// of an inherited base. Applying it never touches the base.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionEnvironment {
    pub path:         Vec<PathBuf>,
    pub vars:         BTreeMap<String, OsString>,
    pub cache_key:    Option<CacheKey>,
    /// Unkeyed cache left behind by older layouts. Reported, never moved.
    pub legacy_cache: Option<PathBuf>,
}

impl ExecutionEnvironment {
    pub fn get(&self, key: &str) -> Option<&OsStr> { self.vars.get(key).map(OsString::as_os_str) }

    /// `base` with PATH replaced and the overrides applied.
    pub fn apply(&self, base: &EnvMap) -> Result<EnvMap> {
        let mut env = base.clone();
        env.set("PATH", PathModifier::new(self.path.clone()).build()?);
        for (key, value) in &self.vars {
            env.set(key, value.clone());
        }
        Ok(env)
    }

    /// Gives `cmd` exactly the environment [`apply`](Self::apply) produces.
    pub fn configure(&self, cmd: &mut Command, base: &EnvMap) -> Result<()> {
        let env = self.apply(base)?;
        cmd.env_clear().envs(env.iter());
        Ok(())
    }
}

pub struct EnvironmentBuilder<'a, P = GoEnvProbe> {
    layout:   &'a Layout,
    settings: &'a Settings,
    probe:    P,
}

impl<'a> EnvironmentBuilder<'a, GoEnvProbe> {
    pub fn new(layout: &'a Layout, settings: &'a Settings) -> Self {
        Self::with_probe(layout, settings, GoEnvProbe)
    }
}

impl<'a, P: ToolchainProbe> EnvironmentBuilder<'a, P> {
    pub fn with_probe(layout: &'a Layout, settings: &'a Settings, probe: P) -> Self {
        Self {
            layout,
            settings,
            probe,
        }
    }

    /// Builds the environment for `resolved`. Unresolved or corrupted
    /// versions fail here, before anything runs.
    pub fn build(
        &self,
        resolved: &ResolvedVersion,
        target: &Target,
        base: &EnvMap,
    ) -> Result<ExecutionEnvironment> {
        match resolved.require()? {
            Some(version) => self.build_installed(version, target, base),
            None => Ok(self.build_system(base)),
        }
    }

    /// The per-version GOPATH entry, before any user GOPATH is appended.
    pub fn version_gopath(&self, version: &str, base: &EnvMap) -> Result<PathBuf> {
        match self.settings.gopath_prefix(base) {
            Some(prefix) => Ok(prefix.join(version)),
            None => Ok(user_home(base)
                .ok_or(Error::NoHome)?
                .join("go")
                .join(version)),
        }
    }

    fn build_system(&self, base: &EnvMap) -> ExecutionEnvironment {
        let mut env = ExecutionEnvironment {
            path: base.path_list(),
            ..Default::default()
        };
        if let Some(gopath) = base.non_empty("GOPATH").filter(|g| needs_expansion(g)) {
            if let Ok(joined) = std::env::join_paths(expand_path_list(gopath, base)) {
                env.vars.insert("GOPATH".into(), joined);
            }
        }
        env
    }

    fn build_installed(
        &self,
        version: &InstalledVersion,
        target: &Target,
        base: &EnvMap,
    ) -> Result<ExecutionEnvironment> {
        let mut env = ExecutionEnvironment {
            path: PathModifier::from_env(base)
                .prepend(version.bin_dir())
                .into_paths(),
            ..Default::default()
        };
        env.vars
            .insert("GOROOT".into(), version.root.clone().into_os_string());

        let user_gopath = base
            .non_empty("GOPATH")
            .map(|g| expand_path_list(g, base))
            .unwrap_or_default();
        if !self.settings.disable_gopath {
            let mut entries = vec![self.version_gopath(&version.id, base)?];
            entries.extend(user_gopath);
            env.vars
                .insert("GOPATH".into(), PathModifier::new(entries).build()?);
        } else if !user_gopath.is_empty() {
            env.vars
                .insert("GOPATH".into(), PathModifier::new(user_gopath).build()?);
        }

        if base.non_empty("GOMODCACHE").is_none() {
            env.vars.insert(
                "GOMODCACHE".into(),
                self.layout.shared_gomod.clone().into_os_string(),
            );
        }

        if !self.settings.disable_gocache {
            let defaults = self
                .probe
                .abi_defaults(version.go_binary().as_deref(), base);
            let key = CacheKey::derive(target, base, &defaults);
            let cache_dir = match self.settings.gocache_dir(base) {
                Some(dir) => dir.join(&version.id).join(key.suffix()),
                None => version.root.join(key.suffix()),
            };
            debug!(version = %version.id, cache = %cache_dir.display(), "isolated build cache");
            env.vars
                .insert("GOCACHE".into(), cache_dir.into_os_string());
            env.cache_key = Some(key);
        }

        let legacy = version.root.join("go-build");
        if legacy.is_dir() {
            warn!(
                path = %legacy.display(),
                "unkeyed build cache from an older layout; it is no longer used and can be removed"
            );
            env.legacy_cache = Some(legacy);
        }

        Ok(env)
    }
}
