use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] goswitch_store::Error),

    #[error(transparent)]
    Platform(#[from] goswitch_platform::Error),

    #[error("cannot determine the home directory for GOPATH; set GOSWITCH_GOPATH_PREFIX")]
    NoHome,
}

pub type Result<T> = std::result::Result<T, Error>;
