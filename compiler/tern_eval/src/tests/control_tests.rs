use pretty_assertions::assert_eq;

use super::{eval_err, eval_ok, interp, run};

// Conditionals

#[test]
fn if_elseif_else() {
    let script = "proc classify {n} {
        if {$n < 0} { return neg } elseif {$n == 0} then { return zero } else { return pos }
    }";
    let mut interp = interp();
    eval_ok(&mut interp, script);
    assert_eq!(
        eval_ok(&mut interp, "list [classify -3] [classify 0] [classify 9]"),
        "neg zero pos"
    );
}

#[test]
fn if_without_match_is_empty() {
    assert_eq!(run("if 0 { set x 1 }"), "");
}

#[test]
fn if_condition_must_be_boolean() {
    let mut interp = interp();
    assert_eq!(
        eval_err(&mut interp, "if {\"abc\"} { }"),
        "expected boolean value but got \"abc\""
    );
}

// Loops

#[test]
fn while_with_continue() {
    assert_eq!(
        run("set i 0; set sum 0
             while {$i < 10} { incr i; if {$i % 2} continue; incr sum $i }
             set sum"),
        "30"
    );
}

#[test]
fn for_loop_result_is_empty() {
    let mut interp = interp();
    assert_eq!(eval_ok(&mut interp, "for {set i 0} {$i < 3} {incr i} { }"), "");
    assert_eq!(eval_ok(&mut interp, "set i"), "3");
}

#[test]
fn for_break_skips_next() {
    assert_eq!(
        run("set out {}; for {set i 0} {$i < 10} {incr i} { if {$i == 3} break; lappend out $i }; set out"),
        "0 1 2"
    );
}

#[test]
fn foreach_multiple_vars_and_lists() {
    assert_eq!(
        run("set out {}; foreach {a b} {1 2 3 4 5} { lappend out $a-$b }; set out"),
        "1-2 3-4 5-"
    );
    assert_eq!(
        run("set out {}; foreach x {a b} y {1 2 3} { lappend out $x$y }; set out"),
        "a1 b2 3"
    );
}

#[test]
fn foreach_empty_varlist() {
    let mut interp = interp();
    assert_eq!(
        eval_err(&mut interp, "foreach {} {1 2} {}"),
        "foreach varlist is empty"
    );
}

// Return

#[test]
fn return_code_error_from_proc() {
    let mut interp = interp();
    eval_ok(&mut interp, "proc f {} { return -code error -errorcode {MY CODE} oops }");
    assert_eq!(
        eval_ok(&mut interp, "list [catch f msg] $msg $errorCode"),
        "1 oops {MY CODE}"
    );
}

#[test]
fn return_code_break_from_proc_breaks_callers_loop() {
    let mut interp = interp();
    eval_ok(&mut interp, "proc stop {} { return -code break }");
    assert_eq!(
        eval_ok(&mut interp, "set n 0; foreach i {1 2 3} { incr n; stop }; set n"),
        "1"
    );
}

#[test]
fn return_level_two_leaves_caller() {
    let mut interp = interp();
    eval_ok(&mut interp, "proc inner {} { return -level 2 early }");
    eval_ok(&mut interp, "proc outer {} { inner; return late }");
    assert_eq!(eval_ok(&mut interp, "outer"), "early");
}

#[test]
fn return_bad_code() {
    let mut interp = interp();
    assert_eq!(
        eval_err(&mut interp, "proc f {} { return -code bogus x }; f"),
        "bad completion code \"bogus\": must be ok, error, return, break, continue, signal, or exit"
    );
}

// Errors and catch

#[test]
fn catch_codes() {
    assert_eq!(run("catch {set x 1}"), "0");
    assert_eq!(run("catch {error x}"), "1");
    assert_eq!(run("catch {return x}"), "2");
    assert_eq!(run("catch break"), "3");
    assert_eq!(run("catch continue"), "4");
}

#[test]
fn catch_options_dict() {
    let mut interp = interp();
    eval_ok(&mut interp, "catch {error boom {} {APP FAIL}} msg opts");
    assert_eq!(eval_ok(&mut interp, "dict get $opts -code"), "1");
    assert_eq!(eval_ok(&mut interp, "dict get $opts -errorcode"), "APP FAIL");
    assert_eq!(eval_ok(&mut interp, "string first boom [dict get $opts -errorinfo]"), "0");
}

#[test]
fn catch_does_not_absorb_exit_by_default() {
    let mut interp = interp();
    assert!(matches!(
        interp.eval("catch {exit 3}"),
        Err(crate::EvalError::Exit(3))
    ));
    assert_eq!(eval_ok(&mut interp, "list [catch -exit {exit 3} v] $v"), "6 3");
}

#[test]
fn error_with_info_and_code() {
    let mut interp = interp();
    eval_ok(&mut interp, "catch {error msg custom-info {A B}}");
    assert_eq!(eval_ok(&mut interp, "string match custom-info* $errorInfo"), "1");
    assert_eq!(eval_ok(&mut interp, "set errorCode"), "A B");
}

// switch

#[test]
fn switch_exact_and_default() {
    let script = "proc pick {x} { switch $x { a { return A } b - c { return BC } default { return other } } }";
    let mut interp = interp();
    eval_ok(&mut interp, script);
    assert_eq!(
        eval_ok(&mut interp, "list [pick a] [pick b] [pick c] [pick z]"),
        "A BC BC other"
    );
}

#[test]
fn switch_glob_with_separate_args() {
    assert_eq!(run("switch -glob -- foo.txt *.c {set r c} *.txt {set r text}"), "text");
    assert_eq!(run("switch nomatch a {set r 1}"), "");
}

#[test]
fn switch_default_only_matches_last() {
    assert_eq!(run("switch default default {set r literal} x {set r x}"), "literal");
}

#[test]
fn switch_odd_cases() {
    let mut interp = interp();
    assert_eq!(
        eval_err(&mut interp, "switch x {a}"),
        "extra switch pattern with no body"
    );
}

// eval, uplevel, subst, apply

#[test]
fn eval_concatenates_args() {
    assert_eq!(run("eval set x {{hello world}}"), "hello world");
    assert_eq!(run("eval {set y 2}; set y"), "2");
}

#[test]
fn uplevel_runs_in_caller() {
    let mut interp = interp();
    eval_ok(&mut interp, "proc setter {name value} { uplevel 1 [list set $name $value] }");
    eval_ok(&mut interp, "proc outer {} { setter v 42; return $v }");
    assert_eq!(eval_ok(&mut interp, "outer"), "42");
    eval_ok(&mut interp, "proc deep {} { uplevel #0 {set top yes} }");
    eval_ok(&mut interp, "proc mid {} { deep }");
    eval_ok(&mut interp, "mid");
    assert_eq!(eval_ok(&mut interp, "set top"), "yes");
}

#[test]
fn subst_flags() {
    let mut interp = interp();
    eval_ok(&mut interp, "set x 1");
    assert_eq!(eval_ok(&mut interp, "subst {$x [expr {1+1}] \\t}"), "1 2 \t");
    assert_eq!(eval_ok(&mut interp, "subst -nocommands {$x [y]}"), "1 [y]");
    assert_eq!(eval_ok(&mut interp, "subst -novariables {$x}"), "$x");
    assert_eq!(eval_ok(&mut interp, "subst -nobackslashes {a\\nb}"), "a\\nb");
}

#[test]
fn apply_lambda() {
    assert_eq!(run("apply {{x {y 10}} { expr {$x + $y} }} 5"), "15");
    assert_eq!(run("set sq {{x} {expr {$x * $x}}}; list [apply $sq 3] [apply $sq 4]"), "9 16");
}

#[test]
fn apply_bad_lambda() {
    let mut interp = interp();
    assert_eq!(
        eval_err(&mut interp, "apply {a b c d}"),
        "can't interpret \"a b c d\" as a lambda expression"
    );
}

#[test]
fn expr_command_joins_args() {
    assert_eq!(run("expr 1 + 2"), "3");
    assert_eq!(run("expr {10 / 3}"), "3");
    assert_eq!(run("expr {-7 / 2}"), "-4");
    assert_eq!(run("expr {-7 % 2}"), "1");
    assert_eq!(run("expr {\"abc\" < \"abd\"}"), "1");
}

#[test]
fn expr_divide_by_zero() {
    let mut interp = interp();
    assert_eq!(eval_err(&mut interp, "expr {1 / 0}"), "divide by zero");
    assert_eq!(eval_ok(&mut interp, "set errorCode"), "ARITH DIVZERO {divide by zero}");
}
