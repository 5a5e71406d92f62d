//! Build-cache keys.
//!
//! The key is the directory name of an isolated `GOCACHE`:
//!
//! ```text
//! go-build-<goos>-<goarch>[-<abi>...][-exp-<experiments>][-cgo-<hash8>]
//! ```
//!
//! It is a pure function of its inputs. Equal inputs give byte-identical
//! keys in every process; changing any input changes the key.

use crate::abi::{ABI_VARIABLES, AbiDefaults};
use goswitch_platform::{EnvMap, Target};
use sha2::{Digest, Sha256};
use std::fmt;

/// Environment that changes how cgo objects are compiled and linked.
/// Sorted; hashed in this order.
pub const INTEROP_VARIABLES: &[&str] = &[
    "AR",
    "CC",
    "CFLAGS",
    "CGO_CFLAGS",
    "CGO_CXXFLAGS",
    "CGO_LDFLAGS",
    "CXX",
    "CXXFLAGS",
    "LDFLAGS",
    "PKG_CONFIG",
    "PKG_CONFIG_LIBDIR",
    "PKG_CONFIG_PATH",
    "SYSROOT",
];

const INTEROP_HASH_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub goos:              String,
    pub goarch:            String,
    pub abi_suffix:        String,
    pub experiment_suffix: String,
    pub interop_hash:      Option<String>,
}

impl CacheKey {
    pub fn derive(target: &Target, env: &EnvMap, defaults: &AbiDefaults) -> Self {
        Self {
            goos:              sanitize(&target.goos),
            goarch:            sanitize(&target.goarch),
            abi_suffix:        abi_suffix(&target.goarch, env, defaults),
            experiment_suffix: env
                .non_empty("GOEXPERIMENT")
                .map(|exp| format!("-exp-{}", sanitize(exp)))
                .unwrap_or_default(),
            interop_hash:      interop_enabled(env).then(|| interop_hash(env)),
        }
    }

    pub fn suffix(&self) -> String { self.to_string() }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "go-build-{}-{}{}{}",
            self.goos, self.goarch, self.abi_suffix, self.experiment_suffix
        )?;
        if let Some(hash) = &self.interop_hash {
            write!(f, "-cgo-{hash}")?;
        }
        Ok(())
    }
}

/// Keeps a value usable as one path component.
fn sanitize(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            ',' | ' ' | '/' | '\\' | ':' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect()
}

fn abi_suffix(goarch: &str, env: &EnvMap, defaults: &AbiDefaults) -> String {
    let mut suffix = String::new();
    for var in ABI_VARIABLES.iter().filter(|v| v.arches.contains(&goarch)) {
        let default = defaults
            .get(var.name)
            .map(String::as_str)
            .unwrap_or(var.default);
        let value = env.non_empty(var.name).unwrap_or(default);
        if !value.is_empty() && value != default {
            suffix.push('-');
            suffix.push_str(&sanitize(value));
        }
    }
    suffix
}

fn interop_enabled(env: &EnvMap) -> bool { env.get_str("CGO_ENABLED").map(str::trim) != Some("0") }

fn interop_hash(env: &EnvMap) -> String {
    let mut hasher = Sha256::new();
    // NUL cannot occur in environment values, so fields cannot run together.
    hasher.update(b"cgo\0");
    for key in INTEROP_VARIABLES {
        if let Some(value) = env.get_str(key).filter(|v| !v.is_empty()) {
            hasher.update(key.as_bytes());
            hasher.update(b"\0");
            hasher.update(value.as_bytes());
            hasher.update(b"\0");
        }
    }
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(INTEROP_HASH_LEN);
    digest
}
