pub use error::{Error, Result};

pub mod dir;
pub mod env;
mod error;
pub mod expand;
pub mod program;
pub mod target;

pub use env::{EnvMap, PathModifier};
pub use target::Target;
