//! Layered settings: defaults, then `<root>/config.toml`, then
//! `GOSWITCH_*` variables from the environment snapshot.

use crate::error::{Error, Result};
use crate::layout::Layout;
use figment::Figment;
use figment::providers::{Format, Serialized, Toml};
use goswitch_platform::EnvMap;
use goswitch_platform::expand::{expand_path, expand_path_list};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hook search path, a platform path list.
    pub hook_path:            Option<String>,
    /// External root for isolated build caches.
    pub gocache_dir:          Option<String>,
    pub gopath_prefix:        Option<String>,
    pub disable_gocache:      bool,
    pub disable_gopath:       bool,
    pub gomod_version_enable: bool,
    pub no_auto_rehash:       bool,
    pub debug:                bool,
}

/// The subset of settings present in the environment. Absent variables
/// are skipped so they do not mask the config file.
#[derive(Debug, Default, Serialize)]
struct EnvOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    hook_path:            Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gocache_dir:          Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gopath_prefix:        Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    disable_gocache:      Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    disable_gopath:       Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gomod_version_enable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    no_auto_rehash:       Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug:                Option<bool>,
}

impl EnvOverrides {
    fn from_env(env: &EnvMap) -> Self {
        let text = |key: &str| env.non_empty(key).map(str::to_string);
        let flag = |key: &str| env.get_str(key).map(goswitch_platform::env::is_truthy);
        Self {
            hook_path:            text("GOSWITCH_HOOK_PATH"),
            gocache_dir:          text("GOSWITCH_GOCACHE_DIR"),
            gopath_prefix:        text("GOSWITCH_GOPATH_PREFIX"),
            disable_gocache:      flag("GOSWITCH_DISABLE_GOCACHE"),
            disable_gopath:       flag("GOSWITCH_DISABLE_GOPATH"),
            gomod_version_enable: flag("GOSWITCH_GOMOD_VERSION_ENABLE"),
            no_auto_rehash:       flag("GOSWITCH_NO_AUTO_REHASH"),
            debug:                flag("GOSWITCH_DEBUG"),
        }
    }
}

impl Settings {
    pub fn load(layout: &Layout, env: &EnvMap) -> Result<Self> {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(&layout.config_file))
            .merge(Serialized::defaults(EnvOverrides::from_env(env)))
            .extract()
            .map_err(|e| Error::Config(Box::new(e)))
    }

    /// Hook directories, relative entries anchored at `cwd`.
    pub fn hook_dirs(&self, layout: &Layout, env: &EnvMap, cwd: &Path) -> Vec<PathBuf> {
        let dirs = match &self.hook_path {
            Some(list) => expand_path_list(list, env),
            None => vec![layout.hooks.clone()],
        };
        dirs.into_iter()
            .map(|d| if d.is_absolute() { d } else { cwd.join(d) })
            .collect()
    }

    pub fn gocache_dir(&self, env: &EnvMap) -> Option<PathBuf> {
        self.gocache_dir.as_deref().map(|d| expand_path(d, env))
    }

    pub fn gopath_prefix(&self, env: &EnvMap) -> Option<PathBuf> {
        self.gopath_prefix.as_deref().map(|d| expand_path(d, env))
    }
}
