use pretty_assertions::assert_eq;

use super::{eval_err, eval_ok, interp, run};

// info

#[test]
fn proc_introspection() {
    let mut interp = interp();
    eval_ok(&mut interp, "proc greet {name {greeting hello}} { return \"$greeting $name\" }");
    assert_eq!(eval_ok(&mut interp, "info args greet"), "name greeting");
    assert_eq!(
        eval_ok(&mut interp, "info body greet"),
        " return \"$greeting $name\" "
    );
    assert_eq!(eval_ok(&mut interp, "info default greet greeting d"), "1");
    assert_eq!(eval_ok(&mut interp, "set d"), "hello");
    assert_eq!(eval_ok(&mut interp, "info default greet name d"), "0");
    assert_eq!(eval_ok(&mut interp, "set d"), "");
    assert_eq!(
        eval_err(&mut interp, "info args set"),
        "\"set\" isn't a procedure"
    );
    assert_eq!(
        eval_err(&mut interp, "info default greet nope d"),
        "procedure \"greet\" doesn't have an argument \"nope\""
    );
}

#[test]
fn procs_and_commands_filter() {
    let mut interp = interp();
    eval_ok(&mut interp, "proc alpha {} {}; proc alps {} {}; proc beta {} {}");
    assert_eq!(eval_ok(&mut interp, "lsort [info procs al*]"), "alpha alps");
    assert_eq!(eval_ok(&mut interp, "info procs beta"), "beta");
    assert_eq!(eval_ok(&mut interp, "info commands lappend"), "lappend");
    assert_eq!(eval_ok(&mut interp, "info commands nosuch"), "");
    assert_eq!(
        eval_ok(&mut interp, "expr {[llength [info commands]] > 50}"),
        "1"
    );
}

#[test]
fn exists_and_locals() {
    let mut interp = interp();
    eval_ok(&mut interp, "set g 1");
    assert_eq!(eval_ok(&mut interp, "info exists g"), "1");
    assert_eq!(eval_ok(&mut interp, "info exists nope"), "0");
    eval_ok(&mut interp, "proc f {a} { global g; set b 2; list [lsort [info locals]] [lsort [info vars]] }");
    assert_eq!(eval_ok(&mut interp, "f 1"), "{a b} {a b g}");
    assert_eq!(eval_ok(&mut interp, "info locals"), "");
    assert_eq!(eval_ok(&mut interp, "expr {[lsearch [info globals] g] >= 0}"), "1");
}

#[test]
fn level_and_frame() {
    let mut interp = interp();
    assert_eq!(eval_ok(&mut interp, "info level"), "0");
    assert_eq!(eval_ok(&mut interp, "info frame"), "1");
    eval_ok(&mut interp, "proc inner {x} { list [info level] [info level 0] [info level -1] }");
    eval_ok(&mut interp, "proc outer {} { inner 7 }");
    assert_eq!(eval_ok(&mut interp, "outer"), "2 {inner 7} outer");
    eval_ok(&mut interp, "proc where {} { dict get [info frame 2] type }");
    assert_eq!(eval_ok(&mut interp, "where"), "proc");
    assert_eq!(eval_err(&mut interp, "info level 5"), "bad level \"5\"");
}

#[test]
fn complete_and_version() {
    assert_eq!(run("info complete {set x 1}"), "1");
    assert_eq!(run("info complete {set x \\{}"), "1");
    assert_eq!(run("info complete \"if 1 \\{\""), "0");
    assert_eq!(run("info complete {puts \"abc}"), "0");
    assert_eq!(run("info version"), env!("CARGO_PKG_VERSION"));
}

#[test]
fn stacktrace_after_error() {
    let mut interp = interp();
    eval_ok(&mut interp, "proc fail {} { error bad }");
    eval_ok(&mut interp, "catch fail");
    // proc, file and line for `fail` and for the top level
    assert_eq!(eval_ok(&mut interp, "llength [info stacktrace]"), "6");
    assert_eq!(eval_ok(&mut interp, "lindex [info stacktrace] 0"), "fail");
}

// namespace

#[test]
fn namespace_eval_qualifies_names() {
    let mut interp = interp();
    eval_ok(
        &mut interp,
        "namespace eval util { variable count 0; proc bump {} { variable count; incr count } }",
    );
    assert_eq!(eval_ok(&mut interp, "util::bump; util::bump"), "2");
    assert_eq!(eval_ok(&mut interp, "set ::util::count"), "2");
    assert_eq!(eval_ok(&mut interp, "namespace eval util { namespace current }"), "::util");
    assert_eq!(eval_ok(&mut interp, "namespace current"), "::");
    assert_eq!(eval_ok(&mut interp, "namespace eval util { bump }"), "3");
}

#[test]
fn nested_namespaces() {
    let mut interp = interp();
    eval_ok(&mut interp, "namespace eval a { namespace eval b { proc f {} { return deep } } }");
    assert_eq!(eval_ok(&mut interp, "a::b::f"), "deep");
    assert_eq!(eval_ok(&mut interp, "::a::b::f"), "deep");
    assert_eq!(
        eval_ok(&mut interp, "namespace eval a { namespace eval b { namespace current } }"),
        "::a::b"
    );
}

#[test]
fn qualifiers_and_tail() {
    assert_eq!(run("namespace qualifiers ::a::b::c"), "::a::b");
    assert_eq!(run("namespace tail ::a::b::c"), "c");
    assert_eq!(run("namespace qualifiers c"), "");
    assert_eq!(run("namespace tail c"), "c");
}

// puts and source

#[test]
fn puts_channels() {
    let mut interp = interp();
    eval_ok(&mut interp, "puts hello; puts -nonewline stdout a; puts stderr oops");
    assert_eq!(interp.print_handler().get_output(), "hello\na");
    assert_eq!(interp.print_handler().get_errors(), "oops\n");
    assert_eq!(
        eval_err(&mut interp, "puts nowhere x"),
        "can not find channel named \"nowhere\""
    );
}

#[test]
fn source_runs_file_in_current_frame() {
    let dir = std::env::temp_dir().join(format!("tern-source-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("lib.tern");
    std::fs::write(&path, "set loaded yes\nproc helper {} { return ok }\nreturn done\nset after 1\n").unwrap();

    let mut interp = interp();
    let script = format!("source {{{}}}", path.display());
    assert_eq!(eval_ok(&mut interp, &script), "done");
    assert_eq!(eval_ok(&mut interp, "list $loaded [helper] [info exists after]"), "yes ok 0");
    assert!(eval_err(&mut interp, "source /nonexistent/tern/file.tern")
        .starts_with("couldn't read file \"/nonexistent/tern/file.tern\""));
    std::fs::remove_dir_all(&dir).unwrap();
}
