//! Hook discovery and execution.

use crate::error::Error;
use crate::interpreter::{Interpreter, ScriptKind};
use goswitch_platform::EnvMap;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, warn};

/// Set for every hook to the name of the event being run.
pub const HOOK_EVENT_ENV: &str = "GOSWITCH_HOOK_EVENT";

/// A discovered hook script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook {
    pub path: PathBuf,
    pub kind: ScriptKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotExecutable,
    NoInterpreter,
}

#[derive(Debug)]
pub enum HookOutcome {
    Ran { status: ExitStatus },
    Skipped { reason: SkipReason },
    Failed { error: Error },
}

/// Outcome of every hook run for one event, in execution order.
#[derive(Debug, Default)]
pub struct HookReport {
    pub entries: Vec<(PathBuf, HookOutcome)>,
}

impl HookReport {
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn ran(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, o)| matches!(o, HookOutcome::Ran { .. }))
            .count()
    }

    /// Hooks that did not start or exited non-zero.
    pub fn failures(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, o)| match o {
                HookOutcome::Ran { status } => !status.success(),
                HookOutcome::Failed { .. } => true,
                HookOutcome::Skipped { .. } => false,
            })
            .count()
    }
}

/// Runs `<dir>/<event>/*` scripts from an ordered list of hook directories.
#[derive(Debug, Clone)]
pub struct HookEngine {
    dirs: Vec<PathBuf>,
    cwd:  PathBuf,
}

impl HookEngine {
    pub fn new(dirs: Vec<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        let cwd = cwd.into();
        let dirs = dirs
            .into_iter()
            .map(|d| if d.is_relative() { cwd.join(d) } else { d })
            .collect();
        Self { dirs, cwd }
    }

    pub fn dirs(&self) -> &[PathBuf] { &self.dirs }

    /// Hook paths for `event`, sorted. Only recognized scripts are listed.
    pub fn find(&self, event: &str) -> Vec<PathBuf> {
        self.hooks(event).into_iter().map(|h| h.path).collect()
    }

    pub fn hooks(&self, event: &str) -> Vec<Hook> {
        let mut hooks: Vec<Hook> = self
            .dirs
            .iter()
            .map(|dir| dir.join(event))
            .filter_map(|dir| std::fs::read_dir(&dir).ok())
            .flat_map(|entries| entries.filter_map(|e| e.ok()))
            .filter_map(|entry| {
                let path = entry.path();
                // metadata() follows symlinks, so linked scripts count as files.
                if !std::fs::metadata(&path).is_ok_and(|m| m.is_file()) {
                    return None;
                }
                let kind = ScriptKind::detect(&path)?;
                let path = std::fs::canonicalize(&path).unwrap_or(path);
                Some(Hook { path, kind })
            })
            .collect();

        hooks.sort_by(|a, b| a.path.cmp(&b.path));
        hooks.dedup_by(|a, b| a.path == b.path);
        hooks
    }

    /// Runs every hook for `event` in order.
    ///
    /// Each hook sees `base` plus [`HOOK_EVENT_ENV`] and `extra`. Hook stdout
    /// is sent to stderr so it never mixes with the wrapped command's output.
    pub fn execute(&self, event: &str, base: &EnvMap, extra: &[(&str, &str)]) -> HookReport {
        let hooks = self.hooks(event);
        if hooks.is_empty() {
            return HookReport::default();
        }

        let mut env = base.clone().with(HOOK_EVENT_ENV, event);
        for (key, value) in extra {
            env.set(*key, *value);
        }
        let search_path = env.path_list();

        let mut report = HookReport::default();
        for hook in hooks {
            let outcome = self.run_one(&hook, &env, &search_path);
            report.entries.push((hook.path, outcome));
        }
        report
    }

    fn run_one(&self, hook: &Hook, env: &EnvMap, search_path: &[PathBuf]) -> HookOutcome {
        if cfg!(unix) && !goswitch_fs::is_executable(&hook.path) {
            debug!("skipping hook {}: not executable", hook.path.display());
            return HookOutcome::Skipped {
                reason: SkipReason::NotExecutable,
            };
        }

        let Some(interpreter) = Interpreter::resolve(hook.kind, &hook.path, search_path, &self.cwd)
        else {
            debug!("skipping hook {}: no interpreter", hook.path.display());
            return HookOutcome::Skipped {
                reason: SkipReason::NoInterpreter,
            };
        };

        match spawn(&interpreter, &hook.path, env, &self.cwd) {
            Ok(status) => {
                if !status.success() {
                    warn!("hook {} exited with {status}", hook.path.display());
                }
                HookOutcome::Ran { status }
            }
            Err(source) => {
                let error = Error::HookExecutionFailed {
                    path: hook.path.clone(),
                    source,
                };
                warn!("{error}");
                HookOutcome::Failed { error }
            }
        }
    }
}

fn spawn(
    interpreter: &Interpreter,
    script: &Path,
    env: &EnvMap,
    cwd: &Path,
) -> std::io::Result<ExitStatus> {
    Command::new(&interpreter.program)
        .args(&interpreter.args)
        .arg(script)
        .current_dir(cwd)
        .env_clear()
        .envs(env.iter())
        .stdin(Stdio::null())
        .stdout(Stdio::from(std::io::stderr()))
        .status()
}
