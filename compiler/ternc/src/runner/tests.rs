use pretty_assertions::assert_eq;
use tern_eval::{buffer_handler, EvalError, Interp};

use super::*;

fn failure(script: &str) -> Box<ScriptError> {
    let mut interp = Interp::builder().print_handler(buffer_handler()).build();
    match interp.eval(script) {
        Err(EvalError::Script(err)) => err,
        other => panic!("expected an error, got {other:?}"),
    }
}

#[test]
fn error_without_trace_frames_in_procs() {
    let err = failure("error plain");
    assert_eq!(
        render_error(&err),
        "error: plain\nstack backtrace:\n  0: <top> at line 1\n"
    );
}

#[test]
fn error_lists_each_proc_level() {
    let err = failure("proc inner {} {\n  error deep\n}\nproc outer {} { inner }\nouter");
    assert_eq!(
        render_error(&err),
        "error: deep\nstack backtrace:\n  0: inner at line 2\n  1: outer at line 1\n  2: <top> at line 5\n"
    );
}

#[test]
fn exit_status_passes_exit_code_through() {
    let mut interp = Interp::builder().print_handler(buffer_handler()).build();
    let outcome = interp.eval("exit 9");
    assert_eq!(exit_status(&interp, outcome), 9);
    let outcome = interp.eval("set ok 1");
    assert_eq!(exit_status(&interp, outcome), 0);
}
