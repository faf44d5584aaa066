use pretty_assertions::assert_eq;

use super::*;

fn args(words: &[&str]) -> Vec<String> {
    words.iter().map(ToString::to_string).collect()
}

#[test]
fn no_arguments_is_interactive() {
    assert_eq!(parse_args(&[]).unwrap(), Invocation::Interactive);
}

#[test]
fn help_and_version() {
    assert_eq!(parse_args(&args(&["--help"])).unwrap(), Invocation::Help);
    assert_eq!(parse_args(&args(&["-h"])).unwrap(), Invocation::Help);
    assert_eq!(parse_args(&args(&["--version"])).unwrap(), Invocation::Version);
}

#[test]
fn file_with_arguments() {
    assert_eq!(
        parse_args(&args(&["run.tern", "a", "-e", "b"])).unwrap(),
        Invocation::File {
            path: "run.tern".into(),
            args: args(&["a", "-e", "b"]),
        }
    );
}

#[test]
fn inline_script() {
    assert_eq!(
        parse_args(&args(&["-e", "puts hi", "x"])).unwrap(),
        Invocation::Inline {
            script: "puts hi".into(),
            args: args(&["x"]),
        }
    );
    assert_eq!(parse_args(&args(&["-e"])), Err(UsageError::MissingScript));
}

#[test]
fn double_dash_allows_dash_file_names() {
    assert_eq!(
        parse_args(&args(&["--", "-odd.tern"])).unwrap(),
        Invocation::File {
            path: "-odd.tern".into(),
            args: Vec::new(),
        }
    );
}

#[test]
fn unknown_option() {
    let err = parse_args(&args(&["--frobnicate"])).unwrap_err();
    assert_eq!(err.to_string(), "unknown option \"--frobnicate\"");
}
