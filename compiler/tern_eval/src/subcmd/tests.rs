use super::*;
use pretty_assertions::assert_eq;

fn first(_: &mut Interp, _: &[Obj]) -> EvalResult {
    Ok(Obj::new_string("first"))
}

fn second(_: &mut Interp, argv: &[Obj]) -> EvalResult {
    Ok(Obj::int(argv.len() as i64))
}

static TABLE: &[SubCommand] = &[
    SubCommand {
        name: "length",
        args: "string",
        min_args: 1,
        max_args: Some(1),
        handler: first,
    },
    SubCommand {
        name: "last",
        args: "needle haystack",
        min_args: 2,
        max_args: Some(2),
        handler: second,
    },
    SubCommand {
        name: "lastx",
        args: "?arg ...?",
        min_args: 0,
        max_args: None,
        handler: second,
    },
];

fn word(text: &str) -> Obj {
    Obj::new_string(text)
}

#[test]
fn exact_match_beats_prefix() {
    // "last" is also a prefix of "lastx".
    let entry = resolve(TABLE, "subcommand", &word("last")).unwrap();
    assert_eq!(entry.name, "last");
}

#[test]
fn unique_prefix_resolves() {
    let entry = resolve(TABLE, "subcommand", &word("le")).unwrap();
    assert_eq!(entry.name, "length");
}

#[test]
fn ambiguous_prefix() {
    let err = resolve(TABLE, "subcommand", &word("la")).err().unwrap();
    assert_eq!(
        err.message(),
        "ambiguous subcommand \"la\": must be length, last, or lastx"
    );
}

#[test]
fn unknown_subcommand() {
    let err = resolve(TABLE, "subcommand", &word("x")).err().unwrap();
    assert_eq!(
        err.message(),
        "bad subcommand \"x\": must be length, last, or lastx"
    );
    assert!(resolve(TABLE, "subcommand", &word("")).is_err());
}

#[test]
fn resolution_is_cached_on_the_word() {
    let given = word("len");
    resolve(TABLE, "subcommand", &given).unwrap();
    let before = tern_value::shimmer_count();
    let entry = resolve(TABLE, "subcommand", &given).unwrap();
    assert_eq!(entry.name, "length");
    assert_eq!(tern_value::shimmer_count(), before);
}

#[test]
fn dispatch_checks_counts_after_matching() {
    let mut interp = Interp::new();
    let argv = [word("ens"), word("length"), word("a")];
    assert_eq!(
        dispatch(&mut interp, TABLE, &argv).unwrap().as_str(),
        "first"
    );
    let argv = [word("ens"), word("length")];
    let err = dispatch(&mut interp, TABLE, &argv).unwrap_err();
    match err {
        crate::Flow::Error(err) => {
            assert_eq!(
                err.message(),
                "wrong # args: should be \"ens length string\""
            );
        }
        other => panic!("expected an error: {other:?}"),
    }
    let argv = [word("ens"), word("lastx"), word("a"), word("b"), word("c")];
    assert_eq!(dispatch(&mut interp, TABLE, &argv).unwrap().as_str(), "5");
}

#[test]
fn options_match_by_prefix() {
    let options = ["-exact", "-glob", "--"];
    assert_eq!(option_index(&options, &word("-g")).unwrap(), 1);
    assert_eq!(option_index(&options, &word("--")).unwrap(), 2);
    assert!(option_index(&options, &word("-")).is_err());
    assert_eq!(
        option_index(&options, &word("-x")).unwrap_err().message(),
        "bad option \"-x\": must be -exact, -glob, or --"
    );
}
