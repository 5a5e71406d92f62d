//! Version-spec resolution.
//!
//! Resolution order for a spec:
//!
//! 1. `system` always resolves to [`Resolved::System`].
//! 2. `latest` resolves to the numerically highest installed version.
//! 3. An alias is substituted and resolution restarts with its target.
//! 4. An exact installed version matches itself.
//! 5. A bare integer matches on the major component, and failing that on
//!    the minor component (`2` picks the newest `1.2.x` when no `2.x`
//!    exists).
//! 6. `major.minor` picks the newest patch of that line.
//!
//! Anything else is [`Error::NotInstalled`] carrying the spec as typed.

use crate::error::{Error, Result};
use crate::token::strip_go_prefix;
use crate::version::{GoVersion, compare_versions};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

pub const SYSTEM: &str = "system";
pub const LATEST: &str = "latest";

static BARE_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap_or_else(|e| unreachable!("static regex: {e}")));

static MAJOR_MINOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?<major>[0-9]+)\.(?<minor>[0-9]+)$")
        .unwrap_or_else(|e| unreachable!("static regex: {e}"))
});

/// Source of alias indirection.
pub trait AliasLookup {
    fn lookup(&self, name: &str) -> Option<String>;
}

/// An alias source with no entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAliases;

impl AliasLookup for NoAliases {
    fn lookup(&self, _name: &str) -> Option<String> { None }
}

impl AliasLookup for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> { self.get(name).cloned() }
}

impl AliasLookup for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> { self.get(name).cloned() }
}

impl<A: AliasLookup + ?Sized> AliasLookup for &A {
    fn lookup(&self, name: &str) -> Option<String> { (**self).lookup(name) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    System,
    Version(String),
}

impl Resolved {
    pub fn as_str(&self) -> &str {
        match self {
            Resolved::System => SYSTEM,
            Resolved::Version(v) => v,
        }
    }

    pub fn is_system(&self) -> bool { matches!(self, Resolved::System) }
}

#[derive(Debug, Clone, Copy)]
pub struct Resolver<A> {
    aliases: A,
}

impl<A: AliasLookup> Resolver<A> {
    pub fn new(aliases: A) -> Self { Self { aliases } }

    /// Resolves `spec` against `installed`, which holds version directory
    /// names in any order.
    pub fn resolve(&self, spec: &str, installed: &[String]) -> Result<Resolved> {
        let not_installed = || Error::NotInstalled {
            spec: spec.to_string(),
        };

        let mut current = spec.trim().to_string();
        let mut seen = BTreeSet::new();

        loop {
            if current == SYSTEM {
                return Ok(Resolved::System);
            }
            if current == LATEST {
                return latest(installed.iter()).map(Resolved::Version).ok_or_else(not_installed);
            }
            match self.aliases.lookup(&current) {
                Some(target) => {
                    if !seen.insert(current.clone()) {
                        return Err(Error::AliasCycle { name: current });
                    }
                    debug!(alias = %current, %target, "substituting alias");
                    current = target.trim().to_string();
                }
                None => break,
            }
        }

        let wanted = strip_go_prefix(&current);
        if let Some(exact) = installed
            .iter()
            .find(|v| v.as_str() == current || strip_go_prefix(v) == wanted)
        {
            return Ok(Resolved::Version(exact.clone()));
        }

        let parsed: Vec<GoVersion> = installed
            .iter()
            .filter_map(|v| GoVersion::parse(v).ok())
            .collect();

        if BARE_INTEGER.is_match(wanted) {
            let n: u64 = wanted.parse().map_err(|_| not_installed())?;
            let by_major = newest(parsed.iter().filter(|v| v.major() == n));
            let found = by_major.or_else(|| {
                debug!(spec = wanted, "no major match, trying minor component");
                newest(parsed.iter().filter(|v| v.minor() == Some(n)))
            });
            return found.map(Resolved::Version).ok_or_else(not_installed);
        }

        if let Some(caps) = MAJOR_MINOR.captures(wanted) {
            let major: u64 = caps["major"].parse().map_err(|_| not_installed())?;
            let minor: u64 = caps["minor"].parse().map_err(|_| not_installed())?;
            return newest(
                parsed
                    .iter()
                    .filter(|v| v.major() == major && v.minor() == Some(minor)),
            )
            .map(Resolved::Version)
            .ok_or_else(not_installed);
        }

        Err(not_installed())
    }
}

impl Default for Resolver<NoAliases> {
    fn default() -> Self { Self::new(NoAliases) }
}

/// Highest of `versions` under [`compare_versions`].
pub fn latest<'a>(versions: impl Iterator<Item = &'a String>) -> Option<String> {
    versions
        .max_by(|a, b| compare_versions(a, b))
        .cloned()
}

fn newest<'a>(versions: impl Iterator<Item = &'a GoVersion>) -> Option<String> {
    versions.max().map(|v| v.as_str().to_string())
}
