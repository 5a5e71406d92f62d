//! Lifecycle hooks.
//!
//! Hooks are scripts in `<hook dir>/<event>/`. They run one after another in
//! alphabetical path order with the caller's environment plus event
//! variables. A hook can observe an event but never change its outcome:
//! failures are logged and the remaining hooks still run.

pub use engine::{HOOK_EVENT_ENV, Hook, HookEngine, HookOutcome, HookReport, SkipReason};
pub use error::Error;
pub use interpreter::{Interpreter, ScriptKind, parse_shebang};

mod engine;
mod error;
mod interpreter;

/// Before the dispatched command runs.
pub const EVENT_EXEC: &str = "exec";
/// After the dispatched command exits.
pub const EVENT_POST_EXEC: &str = "post-exec";
/// After shims are regenerated.
pub const EVENT_REHASH: &str = "rehash";

/// Version the dispatched command runs under.
pub const HOOK_VERSION_ENV: &str = "GOSWITCH_HOOK_VERSION";
/// Name of the dispatched command.
pub const HOOK_COMMAND_ENV: &str = "GOSWITCH_HOOK_COMMAND";
/// Exit code of the dispatched command, for `post-exec` hooks.
pub const HOOK_EXIT_CODE_ENV: &str = "GOSWITCH_HOOK_EXIT_CODE";
