//! Host and target platform names, spelled the way the Go toolchain spells
//! them (`darwin`, `amd64`, ...).

use crate::env::EnvMap;
use once_cell::sync::Lazy;

static HOST_GOARCH: Lazy<&'static str> = Lazy::new(|| {
    let cpu_arch = sysinfo::System::cpu_arch();
    goarch_from_machine(&cpu_arch).unwrap_or_else(|| goarch_from_rust(std::env::consts::ARCH))
});

/// Maps a Rust `target_os` name to a Go `GOOS`.
pub fn goos_from_rust(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}

/// Maps a Rust `target_arch` name to a Go `GOARCH`.
pub fn goarch_from_rust(arch: &str) -> &'static str {
    match arch {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "arm" => "arm",
        "riscv64" => "riscv64",
        "powerpc64" if cfg!(target_endian = "little") => "ppc64le",
        "powerpc64" => "ppc64",
        "s390x" => "s390x",
        "loongarch64" => "loong64",
        "mips" => "mips",
        "mips64" => "mips64",
        "wasm32" => "wasm",
        _ => "unknown",
    }
}

/// Maps a kernel machine name (`uname -m` style) to a Go `GOARCH`.
pub fn goarch_from_machine(machine: &str) -> Option<&'static str> {
    let arch = match machine {
        "x86_64" | "amd64" => "amd64",
        "i386" | "i486" | "i586" | "i686" | "x86" => "386",
        "aarch64" | "arm64" => "arm64",
        "arm" | "armv6l" | "armv7l" | "armv7" => "arm",
        "riscv64" => "riscv64",
        "ppc64le" => "ppc64le",
        "ppc64" => "ppc64",
        "s390x" => "s390x",
        "loongarch64" => "loong64",
        "mips" => "mips",
        "mipsel" | "mipsle" => "mipsle",
        "mips64" => "mips64",
        "mips64el" | "mips64le" => "mips64le",
        _ => return None,
    };
    Some(arch)
}

pub fn host_goos() -> &'static str { goos_from_rust(std::env::consts::OS) }

pub fn host_goarch() -> &'static str { *HOST_GOARCH }

/// The platform a toolchain invocation builds for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub goos:   String,
    pub goarch: String,
}

impl Target {
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>) -> Self {
        Self {
            goos:   goos.into(),
            goarch: goarch.into(),
        }
    }

    pub fn host() -> Self { Self::new(host_goos(), host_goarch()) }

    /// `GOOS`/`GOARCH` from `env`, each defaulting to the host.
    pub fn from_env(env: &EnvMap) -> Self {
        Self::new(
            env.non_empty("GOOS").unwrap_or(host_goos()),
            env.non_empty("GOARCH").unwrap_or(host_goarch()),
        )
    }
}
