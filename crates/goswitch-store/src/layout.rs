use crate::error::{Error, Result};
use crate::ROOT_ENV;
use goswitch_platform::EnvMap;
use goswitch_platform::dir::user_home;
use goswitch_platform::expand::expand_path;
use std::path::{Path, PathBuf};

/// Directory layout of a goswitch root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root:         PathBuf,
    pub versions:     PathBuf,
    pub shims:        PathBuf,
    pub global_file:  PathBuf,
    pub aliases_file: PathBuf,
    pub config_file:  PathBuf,
    pub hooks:        PathBuf,
    pub shared_gomod: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            versions: root.join("versions"),
            shims: root.join("shims"),
            global_file: root.join("version"),
            aliases_file: root.join("aliases"),
            config_file: root.join("config.toml"),
            hooks: root.join("goswitch.d"),
            shared_gomod: root.join("shared").join("go-mod"),
            root,
        }
    }

    /// `GOSWITCH_ROOT` (expanded) or `~/.goswitch`.
    pub fn from_env(env: &EnvMap) -> Result<Self> {
        if let Some(root) = env.non_empty(ROOT_ENV) {
            return Ok(Self::new(expand_path(root, env)));
        }
        let home = user_home(env).ok_or(Error::NoHome)?;
        Ok(Self::new(home.join(".goswitch")))
    }

    pub fn version_dir(&self, id: &str) -> PathBuf { self.versions.join(id) }

    pub fn version_bin(&self, id: &str) -> PathBuf { self.version_dir(id).join("bin") }

    pub fn is_shims_dir(&self, dir: &Path) -> bool {
        goswitch_platform::env::paths_equal(dir, &self.shims)
    }
}
