//! Persistent state of a goswitch root.
//!
//! Every type here is a repository object bound to an explicit root
//! ([`Layout`]) and environment snapshot, so independent roots can be used
//! side by side.

pub use alias::{AliasStore, validate_alias_name};
pub use config::Settings;
pub use error::{Error, Result};
pub use goswitch_version::Error as ResolveError;
pub use layout::Layout;
pub use registry::{InstallStatus, InstalledVersion, Registry};
pub use source::{ResolvedVersion, Selection, SourceChain, VersionSource};
pub use version_file::{VersionFile, find_version_file, read_version_file, write_version_file};

pub mod alias;
pub mod config;
mod error;
pub mod layout;
pub mod registry;
pub mod source;
pub mod version_file;

/// Shell-level version override.
pub const VERSION_ENV: &str = "GOSWITCH_VERSION";
/// Starting directory for the local version-file walk.
pub const DIR_ENV: &str = "GOSWITCH_DIR";
/// Tool root override.
pub const ROOT_ENV: &str = "GOSWITCH_ROOT";
