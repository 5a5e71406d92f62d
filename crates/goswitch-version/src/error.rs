use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid Go version: {0}")]
    InvalidVersion(String),

    #[error("invalid version token '{token}': {reason}")]
    InvalidToken { token: String, reason: &'static str },

    #[error("version '{spec}' is not installed")]
    NotInstalled { spec: String },

    #[error("alias '{name}' refers back to itself")]
    AliasCycle { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
