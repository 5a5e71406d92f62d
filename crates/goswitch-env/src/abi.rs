//! ABI-relevant toolchain variables.
//!
//! Some architectures have sub-variants that change instruction selection
//! or calling convention (`GOAMD64=v3`, `GOARM=6`). Objects built for one
//! variant must not be served from the cache to another, so a variant that
//! differs from the toolchain default becomes part of the cache key.

use goswitch_platform::EnvMap;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Default value per ABI variable name.
pub type AbiDefaults = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy)]
pub struct AbiVariable {
    pub name:    &'static str,
    pub default: &'static str,
    /// GOARCH values the variable applies to.
    pub arches:  &'static [&'static str],
}

/// Sorted by name; the cache key walks this table in order.
pub const ABI_VARIABLES: &[AbiVariable] = &[
    AbiVariable { name: "GO386", default: "sse2", arches: &["386"] },
    AbiVariable { name: "GOAMD64", default: "v1", arches: &["amd64"] },
    AbiVariable { name: "GOARM", default: "7", arches: &["arm"] },
    AbiVariable { name: "GOMIPS", default: "hardfloat", arches: &["mips", "mipsle"] },
    AbiVariable { name: "GOMIPS64", default: "hardfloat", arches: &["mips64", "mips64le"] },
    AbiVariable { name: "GOPPC64", default: "power8", arches: &["ppc64", "ppc64le"] },
    AbiVariable { name: "GORISCV64", default: "rva20u64", arches: &["riscv64"] },
    AbiVariable { name: "GOWASM", default: "", arches: &["wasm"] },
];

/// Source of ABI defaults for a toolchain.
pub trait ToolchainProbe {
    fn abi_defaults(&self, go_binary: Option<&Path>, base: &EnvMap) -> AbiDefaults;
}

/// The built-in default table, without running anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinDefaults;

impl BuiltinDefaults {
    pub fn table() -> AbiDefaults {
        ABI_VARIABLES
            .iter()
            .map(|v| (v.name.to_string(), v.default.to_string()))
            .collect()
    }
}

impl ToolchainProbe for BuiltinDefaults {
    fn abi_defaults(&self, _go_binary: Option<&Path>, _base: &EnvMap) -> AbiDefaults { Self::table() }
}

/// Asks the toolchain itself through `go env -json`, with the ABI
/// variables removed so the answer is the toolchain default rather than the
/// caller's setting. Falls back to [`BuiltinDefaults`] on any failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoEnvProbe;

impl GoEnvProbe {
    fn query(go_binary: &Path, base: &EnvMap) -> Option<AbiDefaults> {
        let mut cmd = Command::new(go_binary);
        cmd.args(["env", "-json"])
            .env_clear()
            .envs(base.iter())
            .env("GOTOOLCHAIN", "local")
            .stdin(Stdio::null())
            .stderr(Stdio::null());
        for var in ABI_VARIABLES {
            cmd.env_remove(var.name);
        }

        let output = match cmd.output() {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                debug!(status = %output.status, "go env probe failed");
                return None;
            }
            Err(e) => {
                debug!(%e, "go env probe could not start");
                return None;
            }
        };
        parse_go_env(&output.stdout)
    }
}

impl ToolchainProbe for GoEnvProbe {
    fn abi_defaults(&self, go_binary: Option<&Path>, base: &EnvMap) -> AbiDefaults {
        let mut defaults = BuiltinDefaults::table();
        if let Some(reported) = go_binary.and_then(|go| Self::query(go, base)) {
            // Variables that do not apply to the probed GOARCH come back empty.
            defaults.extend(reported.into_iter().filter(|(_, v)| !v.is_empty()));
        }
        defaults
    }
}

/// Extracts the ABI variables from `go env -json` output.
fn parse_go_env(stdout: &[u8]) -> Option<AbiDefaults> {
    let all: BTreeMap<String, serde_json::Value> = match serde_json::from_slice(stdout) {
        Ok(all) => all,
        Err(e) => {
            debug!(%e, "unparseable go env output");
            return None;
        }
    };
    Some(
        ABI_VARIABLES
            .iter()
            .filter_map(|var| {
                let value = all.get(var.name)?.as_str()?;
                Some((var.name.to_string(), value.to_string()))
            })
            .collect(),
    )
}
