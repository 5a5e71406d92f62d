//! Shim dispatch for goswitch.
//!
//! # Architecture
//!
//! A shim is a tiny script in `<root>/shims` that calls back into the
//! dispatcher with its command name. The [`Dispatcher`] resolves the version
//! in effect, maps the command to a binary through a [`TargetResolver`]
//! chain, builds the execution environment and runs the binary with hooks
//! around it. [`ShimWriter`] regenerates the shims.

pub use dispatcher::{Dispatch, Dispatcher, exit_code};
pub use error::{Error, Result};
pub use rehash::{RehashReport, ShimWriter};
pub use resolver::{PairResolver, SystemPathResolver, TargetResolver, VersionBinResolver};

mod dispatcher;
mod error;
mod rehash;
mod resolver;
