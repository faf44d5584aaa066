use super::*;

#[test]
fn buffer_captures_each_channel() {
    let handler = BufferPrintHandler::new();
    handler.write(Channel::Stdout, "out");
    handler.write(Channel::Stderr, "err");
    assert_eq!(handler.get_output(), "out");
    assert_eq!(handler.get_errors(), "err");
}

#[test]
fn println_appends_newline() {
    let handler = buffer_handler();
    handler.println(Channel::Stdout, "hello");
    handler.write(Channel::Stdout, "a");
    handler.println(Channel::Stdout, "b");
    assert_eq!(handler.get_output(), "hello\nab\n");
}

#[test]
fn clear_empties_both_buffers() {
    let handler = buffer_handler();
    handler.println(Channel::Stdout, "x");
    handler.println(Channel::Stderr, "y");
    handler.clear();
    assert!(handler.get_output().is_empty());
    assert!(handler.get_errors().is_empty());
}

#[test]
fn silent_discards_output() {
    let handler = silent_handler();
    handler.println(Channel::Stdout, "hello");
    assert_eq!(handler.get_output(), "");
}

#[test]
fn channel_names() {
    assert_eq!(Channel::parse("stdout"), Some(Channel::Stdout));
    assert_eq!(Channel::parse("stderr"), Some(Channel::Stderr));
    assert_eq!(Channel::parse("file3"), None);
}

#[test]
fn buffer_handler_is_thread_safe() {
    use std::thread;

    let handler = buffer_handler();
    let handler2 = handler.clone();

    let t1 = thread::spawn(move || {
        for _ in 0..100 {
            handler2.println(Channel::Stdout, "a");
        }
    });

    for _ in 0..100 {
        handler.println(Channel::Stdout, "b");
    }

    t1.join().unwrap();
    assert_eq!(handler.get_output().lines().count(), 200);
}
