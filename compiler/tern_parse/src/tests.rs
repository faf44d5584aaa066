use std::rc::Rc;

use super::*;
use pretty_assertions::assert_eq;
use tern_value::{shimmer_count, SourceLoc};

/// Parse `obj` in one go, or take its cached parse.
fn script_of(obj: &Obj) -> Rc<Script> {
    cached_script(obj).unwrap_or_else(|| cache_script(obj, script_parser(obj).script().unwrap()))
}

#[test]
fn parsed_script_is_cached_on_the_object() {
    let body = Obj::new_string("set a 1; incr a");
    let first = script_of(&body);
    let conversions = shimmer_count();
    let second = script_of(&body);
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(shimmer_count(), conversions);
    assert_eq!(body.type_name(), "script");
    assert_eq!(body.as_str(), "set a 1; incr a");
}

#[test]
fn cache_is_dropped_when_object_shimmers() {
    let body = Obj::new_string("1 2 3");
    let first = script_of(&body);
    assert_eq!(body.list_len().unwrap(), 3);
    let second = script_of(&body);
    assert!(!Rc::ptr_eq(&first, &second));
}

#[test]
fn source_annotation_sets_lines_and_file() {
    let body = Obj::new_string("a\nb");
    body.set_source(SourceLoc {
        file: Rc::from("lib.tern"),
        line: 10,
    });
    let script = script_of(&body);
    let lines: Vec<u32> = script.commands.iter().map(|c| c.line).collect();
    assert_eq!(lines, vec![10, 11]);
    assert_eq!(script.file.as_deref(), Some("lib.tern"));
}

#[test]
fn braced_words_carry_their_line() {
    let file = Obj::new_string("proc f {} {\n  error x\n}");
    file.set_source(SourceLoc {
        file: Rc::from("main.tern"),
        line: 1,
    });
    let script = script_of(&file);
    let body = script.commands[0].words[3].kind.as_literal().unwrap();
    assert_eq!(body.source().map(|loc| loc.line), Some(1));
    let inner = script_of(body);
    assert_eq!(inner.commands[0].line, 2);
}
