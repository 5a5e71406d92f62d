use std::path::PathBuf;
use thiserror::Error;

/// A hook that could not be run. Logged by the engine, never returned to
/// the command the hook augments.
#[derive(Debug, Error)]
pub enum Error {
    #[error("hook {} could not be started: {source}", .path.display())]
    HookExecutionFailed {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}
