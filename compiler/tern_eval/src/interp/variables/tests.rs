use pretty_assertions::assert_eq;

use crate::print_handler::silent_handler;
use crate::{EvalError, Interp, Obj};

fn interp() -> Interp {
    Interp::builder().print_handler(silent_handler()).build()
}

fn eval_ok(interp: &mut Interp, script: &str) -> String {
    match interp.eval(script) {
        Ok(value) => value.as_str().to_string(),
        Err(err) => panic!("script failed: {err}\n{script}"),
    }
}

fn eval_msg(interp: &mut Interp, script: &str) -> String {
    match interp.eval(script) {
        Err(EvalError::Script(err)) => err.message().to_string(),
        other => panic!("expected an error, got {other:?}"),
    }
}

#[test]
fn missing_variable_message() {
    let mut interp = interp();
    assert_eq!(
        eval_msg(&mut interp, "set nope"),
        "can't read \"nope\": no such variable"
    );
}

#[test]
fn array_elements() {
    let mut interp = interp();
    eval_ok(&mut interp, "set a(x) 1; set a(y) 2");
    assert_eq!(eval_ok(&mut interp, "set a(y)"), "2");
    assert_eq!(eval_ok(&mut interp, "set a"), "x 1 y 2");
    assert_eq!(
        eval_msg(&mut interp, "set a(z)"),
        "can't read \"a(z)\": no such element in array"
    );
    eval_ok(&mut interp, "unset a(x)");
    assert_eq!(eval_ok(&mut interp, "set a"), "y 2");
}

#[test]
fn element_index_is_substituted() {
    let mut interp = interp();
    eval_ok(&mut interp, "set i k; set a($i) v");
    assert_eq!(eval_ok(&mut interp, "set a(k)"), "v");
    assert_eq!(eval_ok(&mut interp, "set x $a($i)"), "v");
}

#[test]
fn proc_locals_are_private() {
    let mut interp = interp();
    eval_ok(&mut interp, "set x global; proc f {} { set x local; return $x }");
    assert_eq!(eval_ok(&mut interp, "f"), "local");
    assert_eq!(eval_ok(&mut interp, "set x"), "global");
}

#[test]
fn global_links_to_the_global_table() {
    let mut interp = interp();
    eval_ok(&mut interp, "set counter 1; proc bump {} { global counter; incr counter }");
    eval_ok(&mut interp, "bump; bump");
    assert_eq!(eval_ok(&mut interp, "set counter"), "3");
}

#[test]
fn upvar_writes_through_to_caller() {
    let mut interp = interp();
    eval_ok(
        &mut interp,
        "proc setter {name value} { upvar 1 $name v; set v $value }
         proc outer {} { setter local 42; return $local }",
    );
    assert_eq!(eval_ok(&mut interp, "outer"), "42");
}

#[test]
fn upvar_to_absolute_level() {
    let mut interp = interp();
    eval_ok(
        &mut interp,
        "proc a {} { b }
         proc b {} { upvar #0 top t; set t reached }",
    );
    eval_ok(&mut interp, "a");
    assert_eq!(eval_ok(&mut interp, "set top"), "reached");
}

#[test]
fn upvar_to_array_element() {
    let mut interp = interp();
    eval_ok(
        &mut interp,
        "set arr(k) 1
         proc f {} { upvar arr(k) e; incr e }",
    );
    assert_eq!(eval_ok(&mut interp, "f"), "2");
    assert_eq!(eval_ok(&mut interp, "set arr(k)"), "2");
}

#[test]
fn upvar_to_element_of_missing_array() {
    let mut interp = interp();
    eval_ok(&mut interp, "proc f {} { upvar nothing(k) e }");
    assert_eq!(
        eval_msg(&mut interp, "f"),
        "can't upvar to \"nothing(k)\": variable isn't array"
    );
}

#[test]
fn upvar_rejects_existing_local() {
    let mut interp = interp();
    eval_ok(&mut interp, "proc f {} { set v 1; upvar x v }");
    assert_eq!(eval_msg(&mut interp, "f"), "variable \"v\" already exists");
}

#[test]
fn bad_level_is_reported() {
    let mut interp = interp();
    eval_ok(&mut interp, "proc f {} { upvar 5 x y }");
    assert_eq!(eval_msg(&mut interp, "f"), "bad level \"5\"");
}

#[test]
fn link_into_popped_frame_is_dangling() {
    let mut interp = interp();
    // Links global `kept` to the local `local` of whichever proc calls it.
    interp.create_command("keep", |interp, _| {
        let proc_frame = interp.frames.current_index();
        interp.with_level(0, |interp| interp.link_var("kept", proc_frame, "local"))?;
        Ok(Obj::empty())
    });
    eval_ok(&mut interp, "proc make {} { set local 1; keep; set ::seen $::kept }");
    eval_ok(&mut interp, "make");
    assert_eq!(eval_ok(&mut interp, "set seen"), "1");
    assert_eq!(
        eval_msg(&mut interp, "set kept"),
        "can't read \"kept\": upvar target no longer exists"
    );
}

#[test]
fn variable_declares_namespace_variable() {
    let mut interp = interp();
    eval_ok(
        &mut interp,
        "namespace eval cfg {
             variable mode fast
             proc get {} { variable mode; return $mode }
         }",
    );
    assert_eq!(eval_ok(&mut interp, "cfg::get"), "fast");
    assert_eq!(eval_ok(&mut interp, "set ::cfg::mode"), "fast");
}

#[test]
fn unset_reports_missing_unless_nocomplain() {
    let mut interp = interp();
    assert_eq!(
        eval_msg(&mut interp, "unset ghost"),
        "can't unset \"ghost\": no such variable"
    );
    assert_eq!(eval_ok(&mut interp, "unset -nocomplain ghost; return ok"), "ok");
}

#[test]
fn incr_checks_integer_and_overflow() {
    let mut interp = interp();
    assert_eq!(eval_ok(&mut interp, "incr fresh"), "1");
    assert_eq!(eval_ok(&mut interp, "set n 10; incr n -3"), "7");
    assert_eq!(
        eval_msg(&mut interp, "set s abc; incr s"),
        "expected integer but got \"abc\""
    );
    assert_eq!(eval_ok(&mut interp, "set s"), "abc");
    assert_eq!(
        eval_msg(&mut interp, "set big 9223372036854775807; incr big"),
        "integer overflow"
    );
}
