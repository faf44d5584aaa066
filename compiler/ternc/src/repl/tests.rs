use pretty_assertions::assert_eq;
use tern_eval::{buffer_handler, Interp};

use super::*;

/// Run `input` through the loop; returns (status, echoed results, errors,
/// `puts` output).
fn session(input: &str) -> (i32, String, String, String) {
    let mut interp = Interp::builder()
        .print_handler(buffer_handler())
        .interactive(true)
        .build();
    let mut output = Vec::new();
    let mut errors = Vec::new();
    let status = run_repl(&mut interp, input.as_bytes(), &mut output, &mut errors, false).unwrap();
    (
        status,
        String::from_utf8(output).unwrap(),
        String::from_utf8(errors).unwrap(),
        interp.print_handler().get_output(),
    )
}

#[test]
fn echoes_non_empty_results() {
    let (status, output, errors, printed) = session("set x 4\nincr x\nputs done\n");
    assert_eq!(status, 0);
    assert_eq!(output, "4\n5\n");
    assert_eq!(errors, "");
    assert_eq!(printed, "done\n");
}

#[test]
fn continues_after_errors() {
    let (status, output, errors, _) = session("set x 1\nnosuch\nset x\n");
    assert_eq!(status, 0);
    assert_eq!(output, "1\n1\n");
    assert!(errors.starts_with("error: invalid command name \"nosuch\""));
}

#[test]
fn collects_lines_until_complete() {
    let (_, output, errors, _) = session("proc f {} {\n  return 3\n}\nf\n");
    assert_eq!(errors, "");
    assert_eq!(output, "3\n");
}

#[test]
fn exit_stops_reading() {
    let (status, output, _, printed) = session("puts before\nexit 3\nputs after\n");
    assert_eq!(status, 3);
    assert_eq!(output, "");
    assert_eq!(printed, "before\n");
}

#[test]
fn interactive_flag_is_visible() {
    let (_, output, _, _) = session("set tern_interactive\n");
    assert_eq!(output, "1\n");
}

#[test]
fn prompts_when_asked() {
    let mut interp = Interp::builder().print_handler(buffer_handler()).build();
    let mut output = Vec::new();
    let mut errors = Vec::new();
    run_repl(&mut interp, "list {a\nb}\n".as_bytes(), &mut output, &mut errors, true).unwrap();
    assert_eq!(String::from_utf8(output).unwrap(), "% > {a\nb}\n% ");
}
