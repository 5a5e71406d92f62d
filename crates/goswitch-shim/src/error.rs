//! Error types for dispatch and rehash.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] goswitch_store::Error),

    #[error(transparent)]
    Env(#[from] goswitch_env::Error),

    #[error(transparent)]
    Fs(#[from] goswitch_fs::Error),

    #[error("command '{command}' not found in Go {version} (set by {origin})")]
    CommandNotFound {
        command: String,
        version: String,
        origin:  String,
    },

    #[error("no Go version configured and '{command}' is not on PATH")]
    NoVersionConfigured { command: String },

    #[error("failed to run {}: {source}", .path.display())]
    Spawn {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
