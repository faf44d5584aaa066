//! Script-level tests of the core command set.
//!
//! Each file drives a fresh interpreter through scripts and checks results,
//! error messages and captured output.

mod control_tests;
mod info_tests;
mod list_tests;

use crate::print_handler::buffer_handler;
use crate::{EvalError, Interp};

fn interp() -> Interp {
    Interp::builder().print_handler(buffer_handler()).build()
}

/// Evaluate `script`, panicking with the message if it fails.
fn eval_ok(interp: &mut Interp, script: &str) -> String {
    match interp.eval(script) {
        Ok(value) => value.as_str().to_string(),
        Err(err) => panic!("script failed: {err}\n{script}"),
    }
}

/// Evaluate `script`, which must fail with an error; returns the message.
fn eval_err(interp: &mut Interp, script: &str) -> String {
    match interp.eval(script) {
        Err(EvalError::Script(err)) => err.message().to_string(),
        Err(EvalError::Exit(code)) => panic!("unexpected exit {code}\n{script}"),
        Ok(value) => panic!("expected an error, got \"{value}\"\n{script}"),
    }
}

/// Evaluate in a fresh interpreter.
fn run(script: &str) -> String {
    eval_ok(&mut interp(), script)
}
