//! Go toolchain versions: ordering, token validation and resolution of a
//! user-supplied spec (`latest`, an alias, `1.22`, `1`, ...) against the set
//! of installed versions.
//!
//! Ordering is numeric per dotted component, never lexicographic:
//!
//! ```
//! use goswitch_version::GoVersion;
//!
//! let a: GoVersion = "1.10.10".parse().unwrap();
//! let b: GoVersion = "1.9.10".parse().unwrap();
//! assert!(a > b);
//! ```

pub use error::{Error, Result};
pub use resolver::{AliasLookup, LATEST, NoAliases, Resolved, Resolver, SYSTEM, latest};
pub use token::{strip_go_prefix, validate_token};
pub use version::{GoVersion, PreRelease, compare_versions};

mod error;
mod resolver;
mod token;
mod version;
