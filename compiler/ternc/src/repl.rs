//! Interactive line loop.

use std::io::{self, BufRead, Write};

use tern_eval::{EvalError, Interp};
use tern_parse::is_complete;

use crate::runner::render_error;

/// Read commands from `input` until end of input or `exit`.
///
/// Lines are collected until they form a complete command, which is then
/// evaluated; a non-empty result is echoed to `output` and an error is
/// reported to `errors` without ending the loop. Returns the exit status:
/// the `exit` code, or 0 at end of input.
pub fn run_repl<R: BufRead, W: Write, E: Write>(
    interp: &mut Interp,
    input: R,
    output: &mut W,
    errors: &mut E,
    prompt: bool,
) -> io::Result<i32> {
    let mut pending = String::new();
    let mut lines = input.lines();
    loop {
        if prompt {
            interp.print_handler().flush();
            output.write_all(if pending.is_empty() { b"% " } else { b"> " })?;
            output.flush()?;
        }
        let Some(line) = lines.next().transpose()? else {
            return Ok(0);
        };
        pending.push_str(&line);
        pending.push('\n');
        if !is_complete(&pending) {
            continue;
        }

        let outcome = interp.eval(&pending);
        pending.clear();
        interp.print_handler().flush();
        match outcome {
            Ok(value) if value.is_empty_string() => {}
            Ok(value) => writeln!(output, "{value}")?,
            Err(EvalError::Exit(code)) => return Ok(code),
            Err(EvalError::Script(err)) => errors.write_all(render_error(&err).as_bytes())?,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
