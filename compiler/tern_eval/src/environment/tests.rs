use super::*;
use pretty_assertions::assert_eq;

#[test]
fn split_element_names() {
    assert_eq!(split_element("a"), ("a", None));
    assert_eq!(split_element("a(x)"), ("a", Some("x")));
    assert_eq!(split_element("a(x(y))"), ("a", Some("x(y)")));
    assert_eq!(split_element("a()"), ("a", Some("")));
    assert_eq!(split_element("(x)"), ("(x)", None));
    assert_eq!(split_element("a(x"), ("a(x", None));
}

#[test]
fn link_fails_once_target_table_is_dropped() {
    let target: Vars = LocalScope::default();
    target.borrow_mut().set(Rc::from("x"), Obj::int(1));
    let link = Link {
        table: target.downgrade(),
        name: Rc::from("x"),
        index: None,
    };
    assert!(link.table.upgrade().is_some());
    drop(target);
    assert!(link.table.upgrade().is_none());
}

#[test]
fn local_names_skip_links() {
    let other: Vars = LocalScope::default();
    let mut table = VarTable::new();
    table.set(Rc::from("b"), Obj::int(1));
    table.set(Rc::from("a"), Obj::int(2));
    table.link(
        Rc::from("c"),
        Link {
            table: other.downgrade(),
            name: Rc::from("c"),
            index: None,
        },
    );
    let names: Vec<String> = table.names().iter().map(|n| n.to_string()).collect();
    assert_eq!(names, ["a", "b", "c"]);
    let locals: Vec<String> = table.local_names().iter().map(|n| n.to_string()).collect();
    assert_eq!(locals, ["a", "b"]);
    assert_eq!(table.value("a").map(Obj::as_str), Some("2"));
    assert!(table.value("c").is_none());
}

#[test]
fn scopes_compare_by_identity() {
    let a: Vars = LocalScope::default();
    let b = a.clone();
    let c: Vars = LocalScope::default();
    assert!(LocalScope::ptr_eq(&a, &b));
    assert!(!LocalScope::ptr_eq(&a, &c));
}
