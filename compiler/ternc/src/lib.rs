//! Tern command-line front end.
//!
//! The `tern` binary is a thin wrapper around this library:
//!
//! - `tern file.tern ?arg ...?` runs a script file
//! - `tern -e script ?arg ...?` runs an inline script
//! - `tern` with no arguments reads commands from stdin
//!
//! Logging goes through `tracing`; set `TERN_LOG` (or `RUST_LOG`) to a
//! filter such as `tern_eval=debug` to see it on stderr.

mod invocation;
mod logging;
mod repl;
mod runner;

pub use invocation::{parse_args, Invocation, UsageError, USAGE};
pub use logging::init_tracing;
pub use repl::run_repl;
pub use runner::{exit_status, render_error, run};
