//! Shim dispatch: resolve the version, find the binary, build its
//! environment, then run it with hooks around it.

use crate::error::{Error, Result};
use crate::rehash::ShimWriter;
use crate::resolver::{PairResolver, SystemPathResolver, TargetResolver, VersionBinResolver};
use goswitch_env::{EnvironmentBuilder, ExecutionEnvironment, GoEnvProbe, ToolchainProbe};
use goswitch_hooks::{
    EVENT_EXEC, EVENT_POST_EXEC, HOOK_COMMAND_ENV, HOOK_EXIT_CODE_ENV, HOOK_VERSION_ENV,
    HookEngine,
};
use goswitch_platform::{EnvMap, Target};
use goswitch_store::{Layout, ResolvedVersion, Settings, SourceChain, VersionSource};
use goswitch_version::GoVersion;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::{debug, warn};

/// Everything needed to run one command, resolved but not yet started.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub command:     String,
    pub binary:      PathBuf,
    pub version:     ResolvedVersion,
    pub environment: ExecutionEnvironment,
}

pub struct Dispatcher<'a, P = GoEnvProbe> {
    layout:   &'a Layout,
    settings: &'a Settings,
    env:      &'a EnvMap,
    cwd:      PathBuf,
    target:   Target,
    builder:  EnvironmentBuilder<'a, P>,
    program:  Option<PathBuf>,
}

impl<'a> Dispatcher<'a, GoEnvProbe> {
    pub fn new(
        layout: &'a Layout,
        settings: &'a Settings,
        env: &'a EnvMap,
        cwd: impl Into<PathBuf>,
    ) -> Self {
        Self::with_probe(layout, settings, env, cwd, GoEnvProbe)
    }
}

impl<'a, P: ToolchainProbe> Dispatcher<'a, P> {
    pub fn with_probe(
        layout: &'a Layout,
        settings: &'a Settings,
        env: &'a EnvMap,
        cwd: impl Into<PathBuf>,
        probe: P,
    ) -> Self {
        Self {
            layout,
            settings,
            env,
            cwd: cwd.into(),
            target: Target::from_env(env),
            builder: EnvironmentBuilder::with_probe(layout, settings, probe),
            program: None,
        }
    }

    /// Dispatcher binary shims should call back into. Without it, shims
    /// are not regenerated after `go install`.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn hooks(&self) -> HookEngine {
        HookEngine::new(
            self.settings.hook_dirs(self.layout, self.env, &self.cwd),
            &self.cwd,
        )
    }

    pub fn current_version(&self) -> Result<ResolvedVersion> {
        Ok(SourceChain::new(self.layout, self.settings, self.env).current_version(&self.cwd)?)
    }

    /// Path of the binary `command` would run, without running it.
    pub fn which(&self, command: &str) -> Result<PathBuf> {
        let version = self.current_version()?;
        self.find_binary(command, &version)
    }

    /// Installed versions whose `bin` (or GOPATH `bin`) provides `command`.
    pub fn whence(&self, command: &str) -> Result<Vec<String>> {
        let mut found = Vec::new();
        for version in goswitch_store::Registry::new(self.layout).list()? {
            if !version.valid {
                continue;
            }
            if self.installed_resolver(&version.bin_dir(), &version.id)?.resolve(command).is_some() {
                found.push(version.id);
            }
        }
        Ok(found)
    }

    pub fn locate(&self, command: &str) -> Result<Dispatch> {
        let version = self.current_version()?;
        let binary = self.find_binary(command, &version)?;
        let environment = self.builder.build(&version, &self.target, self.env)?;
        debug!(command, binary = %binary.display(), version = version.name(), "dispatching");
        Ok(Dispatch {
            command: command.to_string(),
            binary,
            version,
            environment,
        })
    }

    /// Runs `command` and waits for it. Returns the exit code to propagate.
    pub fn exec(&self, command: &str, args: &[OsString]) -> Result<i32> {
        let dispatch = self.locate(command)?;
        let child_env = dispatch.environment.apply(self.env)?;
        let hooks = self.hooks();
        let version = dispatch.version.name().to_string();

        hooks.execute(
            EVENT_EXEC,
            self.env,
            &[(HOOK_VERSION_ENV, version.as_str()), (HOOK_COMMAND_ENV, command)],
        );

        let status = Command::new(&dispatch.binary)
            .args(args)
            .current_dir(&self.cwd)
            .env_clear()
            .envs(child_env.iter())
            .status()
            .map_err(|source| Error::Spawn {
                path: dispatch.binary.clone(),
                source,
            })?;
        let code = exit_code(status);

        let code_str = code.to_string();
        hooks.execute(
            EVENT_POST_EXEC,
            self.env,
            &[
                (HOOK_VERSION_ENV, version.as_str()),
                (HOOK_COMMAND_ENV, command),
                (HOOK_EXIT_CODE_ENV, code_str.as_str()),
            ],
        );

        if status.success() && should_auto_rehash(command, args, &dispatch.version) {
            self.auto_rehash(&hooks);
        }
        Ok(code)
    }

    fn auto_rehash(&self, hooks: &HookEngine) {
        if self.settings.no_auto_rehash {
            debug!("auto-rehash disabled");
            return;
        }
        let Some(program) = &self.program else {
            debug!("auto-rehash skipped: dispatcher path unknown");
            return;
        };
        if let Err(e) = ShimWriter::new(self.layout, self.settings, self.env, program).rehash(hooks) {
            warn!("auto-rehash failed: {e}");
        }
    }

    fn find_binary(&self, command: &str, version: &ResolvedVersion) -> Result<PathBuf> {
        let found = match version.require()? {
            Some(installed) => self
                .installed_resolver(&installed.bin_dir(), &installed.id)?
                .resolve(command),
            None => SystemPathResolver::new(self.env, &self.layout.shims, &self.cwd).resolve(command),
        };

        found.ok_or_else(|| match version.source {
            VersionSource::SystemFallback => Error::NoVersionConfigured {
                command: command.to_string(),
            },
            _ => Error::CommandNotFound {
                command: command.to_string(),
                version: version.name().to_string(),
                origin:  version.source.origin(),
            },
        })
    }

    /// Version `bin`, then the per-version GOPATH `bin`. Never PATH.
    fn installed_resolver(
        &self,
        bin_dir: &Path,
        id: &str,
    ) -> Result<PairResolver<VersionBinResolver, Option<VersionBinResolver>>> {
        let gopath_bin = if self.settings.disable_gopath {
            None
        } else {
            Some(VersionBinResolver::new(
                self.builder.version_gopath(id, self.env)?.join("bin"),
            ))
        };
        Ok(PairResolver::new(VersionBinResolver::new(bin_dir), gopath_bin))
    }
}

/// `go install`, or `go get` on toolchains that still installed binaries
/// with it (before 1.18).
fn should_auto_rehash(command: &str, args: &[OsString], version: &ResolvedVersion) -> bool {
    let name = Path::new(command)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    if name != "go" {
        return false;
    }

    let Some(subcommand) = args
        .iter()
        .filter_map(|a| a.to_str())
        .find(|a| !a.starts_with('-'))
    else {
        return false;
    };

    match subcommand {
        "install" => true,
        "get" => GoVersion::parse(version.name())
            .is_ok_and(|v| v.major() == 1 && v.minor().is_some_and(|m| m < 18)),
        _ => false,
    }
}

/// Exit code to propagate. A Unix signal N becomes 128 + N, as shells do.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
