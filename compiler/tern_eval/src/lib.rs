//! Tern evaluator: interpreter state, command dispatch and the core
//! command set.
//!
//! # Architecture
//!
//! - [`Interp`]: command table, call frames, global variables, packages,
//!   pending events
//! - [`Flow`]: everything that can stop a script early, returned as the
//!   `Err` side of [`EvalResult`]
//! - `environment`: per-frame variable tables with weak links for `upvar`
//!   and `global`
//! - `expr`: the expression language behind `expr`, `if`, `while` and `for`
//! - `builtins`: the core commands, registered into every new interpreter
//!
//! # Embedding
//!
//! ```text
//! let mut interp = Interp::builder().print_handler(buffer_handler()).build();
//! interp.create_command("double", |_, argv| Ok(Obj::int(argv[1].get_int()? * 2)));
//! let value = interp.eval("double 21")?;
//! ```

mod builtins;
mod commands;
mod environment;
pub mod errors;
mod events;
mod expr;
mod glob;
mod interp;
mod packages;
mod print_handler;
mod signal;
pub mod subcmd;

pub use commands::{Command, CommandKind, CommandTable, NativeFn, Param, Proc};
pub use environment::{split_element, LocalScope, Var, VarTable, Vars};
pub use errors::{
    one_of, Code, ErrorKind, EvalError, EvalResult, Flow, ScriptError, StackTrace, TraceFrame,
};
pub use events::{event_name, EventFlags, EventKind};
pub use expr::{expr_of, floor_div, floor_mod, parse_expr, BinaryOp, Expr, MathFn, UnaryOp};
pub use glob::glob_match;
pub use interp::{Frame, FrameKind, Interp, InterpBuilder, InterpConfig, ScopedInterp};
pub use packages::{compare_versions, version_satisfies, Extension, PackageRegistry};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, Channel, PrintHandlerImpl, SharedPrintHandler,
};
pub use signal::{signal_name, SignalHandle};
pub use tern_value::Obj;

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
