//! Running an [`Invocation`] to completion.

use std::io::{self, IsTerminal};
use std::path::Path;

use tern_eval::{EvalError, Interp, ScriptError};
use tern_value::Obj;

use crate::invocation::{Invocation, USAGE};
use crate::repl::run_repl;

/// Run what the command line asked for and return the process exit status.
///
/// The interpreter is dropped before this returns, so command delete
/// callbacks run even though the caller exits the process directly.
pub fn run(invocation: Invocation) -> i32 {
    match invocation {
        Invocation::Help => {
            print!("{USAGE}");
            0
        }
        Invocation::Version => {
            println!("tern {}", env!("CARGO_PKG_VERSION"));
            0
        }
        Invocation::Inline { script, args } => {
            let mut interp = Interp::builder()
                .script_name("tern")
                .argv(args)
                .auto_path(["."])
                .build();
            let outcome = interp.eval(&script);
            exit_status(&interp, outcome)
        }
        Invocation::File { path, args } => {
            let dir = Path::new(&path)
                .parent()
                .map(|dir| dir.to_string_lossy().into_owned())
                .filter(|dir| !dir.is_empty())
                .unwrap_or_else(|| ".".to_string());
            tracing::debug!(file = %path, "running script file");
            let mut interp = Interp::builder()
                .script_name(path.as_str())
                .argv(args)
                .auto_path([dir])
                .build();
            let outcome = interp.eval_file(&path);
            exit_status(&interp, outcome)
        }
        Invocation::Interactive => {
            let mut interp = Interp::builder()
                .script_name("tern")
                .auto_path(["."])
                .interactive(true)
                .build();
            let stdin = io::stdin();
            let prompt = stdin.is_terminal();
            let status = run_repl(
                &mut interp,
                stdin.lock(),
                &mut io::stdout(),
                &mut io::stderr(),
                prompt,
            );
            match status {
                Ok(status) => status,
                Err(err) => {
                    eprintln!("tern: {err}");
                    1
                }
            }
        }
    }
}

/// Exit status for the outcome of a top-level evaluation, reporting an
/// error on stderr.
pub fn exit_status(interp: &Interp, outcome: Result<Obj, EvalError>) -> i32 {
    interp.print_handler().flush();
    match outcome {
        Ok(_) => 0,
        Err(EvalError::Exit(code)) => code,
        Err(EvalError::Script(err)) => {
            eprint!("{}", render_error(&err));
            1
        }
    }
}

/// `error: <message>` followed by the stack trace, newline-terminated.
pub fn render_error(err: &ScriptError) -> String {
    let mut out = format!("error: {}", err.error_info());
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
