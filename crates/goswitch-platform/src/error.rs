use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("PATH entry contains the platform separator: {0}")]
    JoinPaths(#[from] std::env::JoinPathsError),
}
