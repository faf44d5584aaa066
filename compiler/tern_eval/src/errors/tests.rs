use super::*;
use pretty_assertions::assert_eq;

#[test]
fn factory_messages() {
    assert_eq!(unknown_command("frob").message(), "invalid command name \"frob\"");
    assert_eq!(
        wrong_num_args("set varName ?newValue?").message(),
        "wrong # args: should be \"set varName ?newValue?\""
    );
    assert_eq!(
        no_such_variable("read", "x").message(),
        "can't read \"x\": no such variable"
    );
    assert_eq!(divide_by_zero().message(), "divide by zero");
}

#[test]
fn usage_from_argv() {
    let argv = [Obj::new_string("incr")];
    assert_eq!(
        wrong_num_args_for(&argv, "varName ?increment?").message(),
        "wrong # args: should be \"incr varName ?increment?\""
    );
}

#[test]
fn option_lists_read_naturally() {
    assert_eq!(one_of(&["a"]), "a");
    assert_eq!(one_of(&["a", "b"]), "a or b");
    assert_eq!(one_of(&["a", "b", "c"]), "a, b, or c");
    assert_eq!(
        bad_subcommand("option", "x", &["length", "index"]).message(),
        "bad option \"x\": must be length or index"
    );
}

#[test]
fn value_errors_map_to_kinds() {
    let err = ScriptError::from(ValueError::NotAnInteger("abc".into()));
    assert_eq!(
        err.kind,
        ErrorKind::NotAnInteger {
            text: "abc".into()
        }
    );
    assert_eq!(err.message(), "expected integer but got \"abc\"");
    let err = ScriptError::from(ValueError::UnmatchedBrace);
    assert_eq!(err.message(), "unmatched open brace in list");
}

#[test]
fn trace_is_capped() {
    let mut trace = StackTrace::default();
    for line in 1..=5 {
        trace.push(
            TraceFrame {
                proc: Rc::from("f"),
                file: None,
                line,
            },
            3,
        );
    }
    assert_eq!(trace.len(), 3);
    let text = trace.to_string();
    assert!(text.starts_with("stack backtrace:\n  0: f at line 1\n"));
    assert!(text.ends_with("  ...\n"));
}

#[test]
fn trace_as_list() {
    let mut trace = StackTrace::default();
    trace.push(
        TraceFrame {
            proc: Rc::from("g"),
            file: Some(Rc::from("a.tern")),
            line: 4,
        },
        10,
    );
    assert_eq!(trace.to_list().as_str(), "g a.tern 4");
}

#[test]
fn error_info_joins_message_and_trace() {
    let mut err = ScriptError::new("boom");
    assert_eq!(err.error_info(), "boom");
    err.trace.push(
        TraceFrame {
            proc: Rc::from(""),
            file: None,
            line: 2,
        },
        10,
    );
    assert_eq!(err.error_info(), "boom\nstack backtrace:\n  0: <top> at line 2\n");
    assert_eq!(err.error_code_obj().as_str(), "NONE");
}

#[test]
fn code_names_and_numbers() {
    assert_eq!(Code::parse("break"), Some(Code::Break));
    assert_eq!(Code::parse("4"), Some(Code::Continue));
    assert_eq!(Code::parse("nope"), None);
    assert_eq!(Code::Exit.as_i64(), 6);
    assert_eq!(Flow::Break.code().name(), "break");
}
