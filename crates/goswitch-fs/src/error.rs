use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("'{}' has no parent directory", .0.display())]
    NoParent(PathBuf),

    #[error("i/o failed on {}: {source}", .path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Error {
    let path = path.into();
    match err.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path),
        std::io::ErrorKind::PermissionDenied => Error::PermissionDenied(path),
        _ => Error::Io { path, source: err },
    }
}
