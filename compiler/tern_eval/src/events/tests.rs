use std::time::Duration;

use pretty_assertions::assert_eq;
use tern_value::Obj;

use super::{event_name, parse_event_name, EventFlags, EventKind, EventLoop};
use crate::print_handler::buffer_handler;
use crate::Interp;

fn captured() -> Interp {
    Interp::builder().print_handler(buffer_handler()).build()
}

#[test]
fn event_names_round_trip() {
    assert_eq!(event_name(7), "after#7");
    assert_eq!(parse_event_name("after#7"), Some(7));
    assert_eq!(parse_event_name("after#x"), None);
    assert_eq!(parse_event_name("timer#1"), None);
}

#[test]
fn timers_are_ordered_by_due_time_then_creation() {
    let mut events = EventLoop::default();
    let late = events.schedule(Duration::from_secs(60), Obj::from("late"));
    let a = events.schedule(Duration::ZERO, Obj::from("a"));
    let idle = events.schedule_idle(Obj::from("idle"));
    let ids = events.ids();
    assert_eq!(ids.last().copied(), Some(idle));
    assert_eq!(ids[0], a);
    assert_eq!(ids[1], late);
}

#[test]
fn cancel_by_id_and_script() {
    let mut events = EventLoop::default();
    let t = events.schedule(Duration::from_secs(60), Obj::from("t"));
    events.schedule_idle(Obj::from("i"));
    assert!(events.cancel_script("i"));
    assert!(!events.cancel_script("i"));
    assert_eq!(
        events.info(t).map(|(s, k)| (s.as_str().to_string(), k)),
        Some(("t".to_string(), EventKind::Timer))
    );
    assert!(events.cancel(t));
    assert!(events.is_empty());
}

#[test]
fn process_events_runs_due_timers_in_global_frame() {
    let mut interp = captured();
    interp
        .eval("set hits {}; after 0 {lappend hits one}; after 0 {lappend hits two}")
        .unwrap();
    let ran = interp.process_events(EventFlags::ALL).unwrap();
    assert_eq!(ran, 2);
    assert_eq!(interp.get_var("hits").unwrap().as_str(), "one two");
}

#[test]
fn idle_runs_only_when_no_timer_is_ready() {
    let mut interp = captured();
    interp
        .eval("set log {}; after idle {lappend log idle}; after 0 {lappend log timer}")
        .unwrap();
    interp.process_events(EventFlags::ALL).unwrap();
    assert_eq!(interp.get_var("log").unwrap().as_str(), "timer");
    interp.process_events(EventFlags::ALL).unwrap();
    assert_eq!(interp.get_var("log").unwrap().as_str(), "timer idle");
}

#[test]
fn dont_wait_returns_when_nothing_is_due() {
    let mut interp = captured();
    interp.eval("after 60000 {set never 1}").unwrap();
    let ran = interp
        .process_events(EventFlags::ALL | EventFlags::DONT_WAIT)
        .unwrap();
    assert_eq!(ran, 0);
    assert!(!interp.var_exists("never"));
}

#[test]
fn background_error_goes_to_bgerror() {
    let mut interp = captured();
    interp
        .eval("proc bgerror {msg} { set ::caught $msg }; after 0 {error oops}")
        .unwrap();
    interp.process_events(EventFlags::ALL).unwrap();
    assert_eq!(interp.get_var("caught").unwrap().as_str(), "oops");
}

#[test]
fn background_error_without_handler_is_printed() {
    let mut interp = captured();
    interp.eval("after 0 {error oops}; after 0 {set after 1}").unwrap();
    interp.process_events(EventFlags::ALL).unwrap();
    assert!(interp.print_handler().get_errors().contains("oops"));
    assert_eq!(interp.get_var("after").unwrap().as_str(), "1");
}

#[test]
fn exit_escapes_the_event_loop() {
    let mut interp = captured();
    interp.eval("after 0 {exit 3}").unwrap();
    assert!(matches!(
        interp.process_events(EventFlags::ALL),
        Err(crate::Flow::Exit(3))
    ));
}

#[test]
fn vwait_returns_once_the_variable_is_written() {
    let mut interp = captured();
    let result = interp.eval("after 5 {set done yes}; vwait done; set done");
    assert_eq!(result.unwrap().as_str(), "yes");
}

#[test]
fn vwait_with_nothing_pending_is_an_error() {
    let mut interp = captured();
    let err = interp.eval("vwait nothing").unwrap_err();
    assert!(err.to_string().contains("would wait forever"));
}
