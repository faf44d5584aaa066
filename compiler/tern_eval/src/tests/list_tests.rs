use pretty_assertions::assert_eq;

use super::{eval_err, eval_ok, interp, run};

#[test]
fn list_quotes_elements() {
    assert_eq!(run("list a {b c} {} d\\ e"), "a {b c} {} {d e}");
    assert_eq!(run("llength [list a {b c} {}]"), "3");
}

#[test]
fn llength_rejects_bad_list() {
    let mut interp = interp();
    assert_eq!(eval_err(&mut interp, "llength \"a {b\""), "unmatched open brace in list");
}

#[test]
fn lindex_forms() {
    assert_eq!(run("lindex {a b c} 1"), "b");
    assert_eq!(run("lindex {a b c} end"), "c");
    assert_eq!(run("lindex {a b c} end-1"), "b");
    assert_eq!(run("lindex {a b c} 5"), "");
    assert_eq!(run("lindex {a b c} -1"), "");
    assert_eq!(run("lindex {a b c}"), "a b c");
    assert_eq!(run("lindex {{a b} {c d}} 1 0"), "c");
    assert_eq!(run("lindex {{a b} {c d}} {1 1}"), "d");
}

#[test]
fn lindex_bad_index() {
    let mut interp = interp();
    assert_eq!(
        eval_err(&mut interp, "lindex {a b} x"),
        "bad index \"x\": must be integer?[+-]integer? or end?[+-]integer?"
    );
}

#[test]
fn lappend_creates_and_extends() {
    let mut interp = interp();
    assert_eq!(eval_ok(&mut interp, "lappend fresh a"), "a");
    assert_eq!(eval_ok(&mut interp, "lappend fresh {b c} d"), "a {b c} d");
    assert_eq!(eval_ok(&mut interp, "set arr(k) x; lappend arr(k) y"), "x y");
}

#[test]
fn lappend_to_non_list_fails_and_keeps_value() {
    let mut interp = interp();
    eval_ok(&mut interp, "set bad \"a {b\"");
    assert!(interp.eval("lappend bad c").is_err());
    assert_eq!(eval_ok(&mut interp, "set bad"), "a {b");
}

#[test]
fn lrange_clamps() {
    assert_eq!(run("lrange {a b c d} 1 2"), "b c");
    assert_eq!(run("lrange {a b c d} -5 1"), "a b");
    assert_eq!(run("lrange {a b c d} 2 end+3"), "c d");
    assert_eq!(run("lrange {a b c d} 3 1"), "");
}

#[test]
fn linsert_positions() {
    assert_eq!(run("linsert {a b} 0 x"), "x a b");
    assert_eq!(run("linsert {a b} 1 x y"), "a x y b");
    assert_eq!(run("linsert {a b} end x"), "a b x");
    assert_eq!(run("linsert {a b} 99 x"), "a b x");
}

#[test]
fn lreplace_ranges() {
    assert_eq!(run("lreplace {a b c d} 1 2 X"), "a X d");
    assert_eq!(run("lreplace {a b c d} 1 1"), "a c d");
    assert_eq!(run("lreplace {a b c} 1 0 X"), "a X b c");
    assert_eq!(run("lreplace {a b c} end end"), "a b");
}

#[test]
fn lset_nested_and_append() {
    let mut interp = interp();
    eval_ok(&mut interp, "set l {a {b c} d}");
    assert_eq!(eval_ok(&mut interp, "lset l 1 1 X"), "a {b X} d");
    assert_eq!(eval_ok(&mut interp, "lset l end Z"), "a {b X} Z");
    assert_eq!(eval_ok(&mut interp, "lset l 3 W"), "a {b X} Z W");
    assert_eq!(eval_ok(&mut interp, "lset l {} whole"), "whole");
    assert_eq!(eval_err(&mut interp, "set l {a b}; lset l 5 x"), "list index out of range");
    assert_eq!(eval_ok(&mut interp, "set l"), "a b");
}

#[test]
fn failed_lset_leaves_variable_unchanged() {
    let mut interp = interp();
    eval_ok(&mut interp, "set l {a b}");
    assert_eq!(eval_err(&mut interp, "lset l 2 1 x"), "list index out of range");
    assert_eq!(eval_ok(&mut interp, "set l"), "a b");
    assert_eq!(eval_err(&mut interp, "lset l 0 5 x"), "list index out of range");
    assert_eq!(eval_ok(&mut interp, "set l"), "a b");
    assert_eq!(eval_ok(&mut interp, "lset l 2 0 x"), "a b x");
}

#[test]
fn lindex_rejects_malformed_end_suffix() {
    let mut interp = interp();
    assert_eq!(
        eval_err(&mut interp, "lindex {a b} endé"),
        "bad index \"endé\": must be integer?[+-]integer? or end?[+-]integer?"
    );
    assert!(eval_err(&mut interp, "lindex {a b c} endx1").starts_with("bad index"));
}

#[test]
fn lset_leaves_copies_alone() {
    assert_eq!(run("set a {1 2 3}; set b $a; lset a 0 X; list $a $b"), "{X 2 3} {1 2 3}");
}

#[test]
fn lsearch_options() {
    assert_eq!(run("lsearch {apple banana cherry} b*"), "1");
    assert_eq!(run("lsearch {apple banana cherry} z*"), "-1");
    assert_eq!(run("lsearch -exact {a* b a*} a*"), "0");
    assert_eq!(run("lsearch -all {a b a c} a"), "0 2");
    assert_eq!(run("lsearch -all -inline -not {a b a c} a"), "b c");
    assert_eq!(run("lsearch -nocase -exact {Foo BAR} bar"), "1");
    assert_eq!(run("lsearch -inline {x y} q"), "");
}

#[test]
fn lsort_modes() {
    assert_eq!(run("lsort {pear apple fig}"), "apple fig pear");
    assert_eq!(run("lsort -integer {10 9 100 -1}"), "-1 9 10 100");
    assert_eq!(run("lsort -real {2.5 1e1 -0.5}"), "-0.5 2.5 1e1");
    assert_eq!(run("lsort -decreasing {b c a}"), "c b a");
    assert_eq!(run("lsort -unique {b a b c a}"), "a b c");
}

#[test]
fn lsort_integer_rejects_text() {
    let mut interp = interp();
    assert_eq!(
        eval_err(&mut interp, "lsort -integer {1 x}"),
        "expected integer but got \"x\""
    );
}

#[test]
fn lreverse_concat_join_split() {
    assert_eq!(run("lreverse {a {b c} d}"), "d {b c} a");
    assert_eq!(run("concat {a b} {} { c  }"), "a b c");
    assert_eq!(run("concat {  a b  }"), "a b");
    assert_eq!(run("join {a b c} ,"), "a,b,c");
    assert_eq!(run("join {a {b c}}"), "a b c");
    assert_eq!(run("split a,b,,c ,"), "a b {} c");
    assert_eq!(run("split abc {}"), "a b c");
    assert_eq!(run("split {}"), "");
}
