//! Shim regeneration.
//!
//! Rehash rebuilds `shims/` from scratch: one entry point per executable
//! found in any installed version's `bin` directory (and per-version GOPATH
//! `bin`), with stale entries removed. Running it twice yields the same
//! directory.

use crate::error::Result;
use goswitch_env::EnvironmentBuilder;
use goswitch_fs::{AtomicWriteOptions, atomic_write, from_io, is_executable};
use goswitch_hooks::{EVENT_REHASH, HookEngine};
use goswitch_platform::EnvMap;
use goswitch_store::{Layout, Registry, Settings};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[cfg(windows)]
const SHIM_EXTENSION: Option<&str> = Some("cmd");
#[cfg(not(windows))]
const SHIM_EXTENSION: Option<&str> = None;

/// Names written and removed by one rehash, each sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RehashReport {
    pub written: Vec<String>,
    pub removed: Vec<String>,
}

pub struct ShimWriter<'a> {
    layout:   &'a Layout,
    settings: &'a Settings,
    env:      &'a EnvMap,
    /// Absolute path of the dispatcher binary the shims call back into.
    program:  PathBuf,
}

impl<'a> ShimWriter<'a> {
    pub fn new(
        layout: &'a Layout,
        settings: &'a Settings,
        env: &'a EnvMap,
        program: impl Into<PathBuf>,
    ) -> Self {
        Self {
            layout,
            settings,
            env,
            program: program.into(),
        }
    }

    /// Every command name a shim should exist for.
    pub fn commands(&self) -> Result<BTreeSet<String>> {
        let builder = EnvironmentBuilder::new(self.layout, self.settings);
        let mut names = BTreeSet::new();

        for version in Registry::new(self.layout).list()? {
            collect_executables(&version.bin_dir(), &mut names);
            if !self.settings.disable_gopath {
                match builder.version_gopath(&version.id, self.env) {
                    Ok(gopath) => collect_executables(&gopath.join("bin"), &mut names),
                    Err(e) => debug!("no GOPATH for {}: {e}", version.id),
                }
            }
        }
        Ok(names)
    }

    /// Current shim names, without platform extensions.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.layout.shims) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(from_io(&self.layout.shims, e).into()),
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_ok_and(|t| !t.is_dir()))
            .filter_map(|e| shim_command(&e.path()))
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn rehash(&self, hooks: &HookEngine) -> Result<RehashReport> {
        let wanted = self.commands()?;
        std::fs::create_dir_all(&self.layout.shims).map_err(|e| from_io(&self.layout.shims, e))?;

        let mut report = RehashReport::default();
        for name in &wanted {
            let path = self.shim_path(name);
            atomic_write(
                &path,
                shim_script(&self.program, name).as_bytes(),
                AtomicWriteOptions::new()
                    .permissions(0o755)
                    .prefix(".shim-"),
            )?;
            report.written.push(name.clone());
        }

        for name in self.list()? {
            if !wanted.contains(&name) {
                let path = self.shim_path(&name);
                std::fs::remove_file(&path).map_err(|e| from_io(&path, e))?;
                report.removed.push(name);
            }
        }

        info!(
            written = report.written.len(),
            removed = report.removed.len(),
            "shims regenerated"
        );
        hooks.execute(EVENT_REHASH, self.env, &[]);
        Ok(report)
    }

    fn shim_path(&self, name: &str) -> PathBuf {
        match SHIM_EXTENSION {
            Some(ext) => self.layout.shims.join(format!("{name}.{ext}")),
            None => self.layout.shims.join(name),
        }
    }
}

fn collect_executables(dir: &Path, names: &mut BTreeSet<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !is_executable(&path) {
            continue;
        }
        if let Some(name) = command_name(&path) {
            names.insert(name);
        }
    }
}

/// Command name of a binary: the file name, minus `.exe` on Windows.
fn command_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    if cfg!(windows) {
        if let Some(stem) = name.strip_suffix(".exe") {
            return Some(stem.to_string());
        }
    }
    Some(name.to_string())
}

fn shim_command(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    if name.starts_with('.') {
        return None;
    }
    match SHIM_EXTENSION {
        Some(ext) => name
            .strip_suffix(ext)
            .and_then(|n| n.strip_suffix('.'))
            .map(str::to_string),
        None => Some(name.to_string()),
    }
}

#[cfg(not(windows))]
fn shim_script(program: &Path, name: &str) -> String {
    format!(
        "#!/bin/sh\nexec {} exec {} \"$@\"\n",
        sh_quote(&program.to_string_lossy()),
        sh_quote(name)
    )
}

#[cfg(windows)]
fn shim_script(program: &Path, name: &str) -> String {
    format!(
        "@echo off\r\n\"{}\" exec \"{}\" %*\r\nexit /b %ERRORLEVEL%\r\n",
        program.display(),
        name
    )
}

#[cfg(not(windows))]
fn sh_quote(value: &str) -> String { format!("'{}'", value.replace('\'', r"'\''")) }
