use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] goswitch_fs::Error),

    #[error("invalid configuration: {0}")]
    Config(Box<figment::Error>),

    #[error("cannot determine the home directory; set GOSWITCH_ROOT")]
    NoHome,

    #[error("'{0}' is a reserved name and cannot be used as an alias")]
    ReservedName(String),

    #[error("invalid alias name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("invalid alias target '{target}': {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: goswitch_version::Error,
    },

    #[error("alias '{0}' does not exist")]
    NotFound(String),

    #[error("version '{spec}' is not installed (set by {origin})")]
    NotInstalled { spec: String, origin: String },

    #[error("version '{version}' is corrupted: {} has no go binary (set by {origin})", .root.display())]
    Corrupted {
        version: String,
        root:    PathBuf,
        origin:  String,
    },

    #[error("alias '{name}' refers back to itself (set by {origin})")]
    AliasCycle { name: String, origin: String },

    #[error(transparent)]
    Version(#[from] goswitch_version::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
