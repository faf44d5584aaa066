use std::cell::Cell;

use super::*;
use pretty_assertions::assert_eq;

fn noop() -> Command {
    Command::native(|_, _| Ok(Obj::empty()))
}

/// A command whose delete callback bumps `counter`.
fn counted(counter: &Rc<Cell<u32>>) -> Command {
    let counter = Rc::clone(counter);
    noop().with_delete(Box::new(move || counter.set(counter.get() + 1)))
}

#[test]
fn delete_runs_callback_once() {
    let deleted = Rc::new(Cell::new(0));
    let mut table = CommandTable::new();
    table.insert(Rc::from("db"), counted(&deleted));
    assert!(table.remove("db"));
    assert!(!table.remove("db"));
    assert_eq!(deleted.get(), 1);
}

#[test]
fn rename_keeps_callback() {
    let deleted = Rc::new(Cell::new(0));
    let mut table = CommandTable::new();
    table.insert(Rc::from("db"), counted(&deleted));
    table.rename("db", Rc::from("handle")).unwrap();
    assert_eq!(deleted.get(), 0);
    assert!(table.get("db").is_none());
    assert!(table.get("handle").is_some());
    table.remove("handle");
    assert_eq!(deleted.get(), 1);
}

#[test]
fn replacing_deletes_the_old_command() {
    let deleted = Rc::new(Cell::new(0));
    let mut table = CommandTable::new();
    table.insert(Rc::from("db"), counted(&deleted));
    table.insert(Rc::from("db"), noop());
    assert_eq!(deleted.get(), 1);
}

#[test]
fn drop_runs_every_callback_once() {
    let deleted = Rc::new(Cell::new(0));
    {
        let mut table = CommandTable::new();
        table.insert(Rc::from("a"), counted(&deleted));
        table.insert(Rc::from("b"), counted(&deleted));
        table.remove("a");
    }
    assert_eq!(deleted.get(), 2);
}

#[test]
fn rename_errors() {
    let mut table = CommandTable::new();
    table.insert(Rc::from("a"), noop());
    table.insert(Rc::from("b"), noop());
    assert_eq!(
        table.rename("missing", Rc::from("c")).unwrap_err().message(),
        "can't rename \"missing\": command doesn't exist"
    );
    assert_eq!(
        table.rename("a", Rc::from("b")).unwrap_err().message(),
        "can't rename to \"b\": command already exists"
    );
}

#[test]
fn epoch_moves_on_every_change() {
    let mut table = CommandTable::new();
    let start = table.epoch();
    table.insert(Rc::from("a"), noop());
    let created = table.epoch();
    assert!(created > start);
    table.rename("a", Rc::from("b")).unwrap();
    let renamed = table.epoch();
    assert!(renamed > created);
    table.remove("b");
    assert!(table.epoch() > renamed);
    let before = table.epoch();
    table.remove("b");
    assert_eq!(table.epoch(), before);
}

#[test]
fn proc_parameters() {
    let proc = Proc::new(
        Obj::new_string("a {b 2} args"),
        Obj::new_string("body"),
        Rc::from(""),
    )
    .unwrap();
    assert!(proc.variadic);
    assert_eq!(proc.fixed_params().len(), 2);
    assert_eq!(
        proc.fixed_params()[1].default.as_ref().map(Obj::as_str),
        Some("2")
    );
    assert_eq!(proc.usage("f"), "f a ?b? ?arg ...?");
}

#[test]
fn args_only_counts_when_last() {
    let proc = Proc::new(Obj::new_string("args x"), Obj::empty(), Rc::from("")).unwrap();
    assert!(!proc.variadic);
    assert_eq!(proc.usage("g"), "g args x");
}

#[test]
fn bad_parameter_specs() {
    let err = Proc::new(Obj::new_string("{a b c}"), Obj::empty(), Rc::from("")).unwrap_err();
    assert_eq!(
        err.message(),
        "too many fields in argument specifier \"a b c\""
    );
    let err = Proc::new(Obj::new_string("{}"), Obj::empty(), Rc::from("")).unwrap_err();
    assert_eq!(err.message(), "argument with no name");
}
