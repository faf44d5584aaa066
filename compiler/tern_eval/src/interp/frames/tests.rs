use super::*;
use crate::environment::LocalScope;

fn proc_frame(name: &str) -> Frame {
    Frame::new(
        FrameKind::Proc,
        LocalScope::default(),
        Rc::from(""),
        Rc::from(name),
        Vec::new(),
    )
}

#[test]
fn push_links_to_caller() {
    let mut stack = CallStack::new(LocalScope::default());
    let restore = stack.push(proc_frame("f"));
    assert_eq!(restore, 0);
    assert_eq!(stack.current().level, 1);
    stack.push(proc_frame("g"));
    assert_eq!(stack.current().level, 2);
    assert_eq!(stack.current().caller, 1);
    stack.pop(1);
    assert_eq!(&*stack.current().proc_name, "f");
}

#[test]
fn levels_follow_callers_not_positions() {
    let mut stack = CallStack::new(LocalScope::default());
    stack.push(proc_frame("f"));
    stack.push(proc_frame("g"));
    // uplevel #0 from g, then call h from there.
    let before = stack.activate(0);
    stack.push(proc_frame("h"));
    assert_eq!(stack.current().level, 1);
    assert_eq!(stack.resolve_level("1").unwrap(), 0);
    // Level 1 on h's chain is h itself, not f.
    assert_eq!(stack.resolve_level("#1").unwrap(), 3);
    stack.pop(0);
    stack.activate(before);
    assert_eq!(&*stack.current().proc_name, "g");
}

#[test]
fn bad_levels() {
    let mut stack = CallStack::new(LocalScope::default());
    stack.push(proc_frame("f"));
    assert_eq!(stack.resolve_level("#0").unwrap(), 0);
    assert_eq!(stack.resolve_level("1").unwrap(), 0);
    assert_eq!(
        stack.resolve_level("2").unwrap_err().message(),
        "bad level \"2\""
    );
    assert!(stack.resolve_level("#5").is_err());
    assert!(stack.resolve_level("x").is_err());
}

#[test]
fn level_words() {
    assert!(looks_like_level("1"));
    assert!(looks_like_level("#0"));
    assert!(!looks_like_level("#"));
    assert!(!looks_like_level("x"));
    assert!(!looks_like_level("-1"));
}
