//! Execution environments for a resolved Go toolchain.
//!
//! [`EnvironmentBuilder::build`] turns a resolved version and a target
//! platform into an [`ExecutionEnvironment`]: PATH with the version's `bin`
//! first, `GOROOT`, a per-version `GOPATH`, and a `GOCACHE` isolated by
//! [`CacheKey`] so artifacts built for one OS/arch/ABI are never reused for
//! another.

pub use abi::{ABI_VARIABLES, AbiDefaults, AbiVariable, BuiltinDefaults, GoEnvProbe, ToolchainProbe};
pub use builder::{EnvironmentBuilder, ExecutionEnvironment};
pub use cache_key::{CacheKey, INTEROP_VARIABLES};
pub use error::{Error, Result};

mod abi;
mod builder;
mod cache_key;
mod error;
