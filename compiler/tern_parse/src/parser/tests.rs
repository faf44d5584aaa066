use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// Words of each command, substituted words replaced by their shape.
fn shape(text: &str) -> Vec<Vec<String>> {
    parse_script(text)
        .unwrap()
        .commands
        .iter()
        .map(|c| {
            c.words
                .iter()
                .map(|w| match &w.kind {
                    WordKind::Literal(text) => text.as_str().to_string(),
                    WordKind::Single(_) => "<single>".to_string(),
                    WordKind::Multi(parts) => format!("<multi:{}>", parts.len()),
                })
                .collect()
        })
        .collect()
}

#[test]
fn splits_commands_on_newline_and_semicolon() {
    assert_eq!(
        shape("set a 1; set b 2\nputs hi"),
        vec![
            vec!["set", "a", "1"],
            vec!["set", "b", "2"],
            vec!["puts", "hi"],
        ]
    );
}

#[test]
fn skips_blank_lines_and_comments() {
    let text = "\n\n  # a comment ; still comment\nputs a\n# tail \\\n continued\n";
    assert_eq!(shape(text), vec![vec!["puts", "a"]]);
}

#[test]
fn hash_mid_command_is_a_word() {
    assert_eq!(shape("puts # x"), vec![vec!["puts", "#", "x"]]);
}

#[test]
fn braces_nest_and_keep_text() {
    assert_eq!(
        shape("proc f {a {b c}} { return $a }"),
        vec![vec!["proc", "f", "a {b c}", " return $a "]]
    );
}

#[test]
fn escaped_brace_does_not_count() {
    assert_eq!(shape(r"puts {a \} b}"), vec![vec!["puts", r"a \} b"]]);
}

#[test]
fn backslash_newline_in_braces_becomes_space() {
    assert_eq!(shape("puts {a \\\n    b}"), vec![vec!["puts", "a  b"]]);
}

#[test]
fn line_continuation_joins_commands() {
    assert_eq!(shape("puts \\\n  a"), vec![vec!["puts", "a"]]);
}

#[test]
fn bare_word_decodes_backslashes() {
    assert_eq!(shape(r"puts a\tb\x41"), vec![vec!["puts", "a\tbA"]]);
}

#[test]
fn quoted_word_with_spaces() {
    assert_eq!(shape(r#"puts "a b; c""#), vec![vec!["puts", "a b; c"]]);
}

#[test]
fn classifies_substitution_words() {
    assert_eq!(
        shape(r#"puts $x [f] a$x "$x" "a $x" $a(1)"#),
        vec![vec![
            "puts",
            "<single>",
            "<single>",
            "<multi:2>",
            "<single>",
            "<multi:2>",
            "<single>",
        ]]
    );
}

#[test]
fn dollar_without_name_is_literal() {
    assert_eq!(shape("puts $ a$ $."), vec![vec!["puts", "$", "a$", "$."]]);
}

#[test]
fn var_forms() {
    let script = parse_script("puts ${a b} $ns::x $a($i,2)").unwrap();
    let words = &script.commands[0].words;
    let name = |w: &Word| match &w.kind {
        WordKind::Single(Part::Var(v)) => v.name.as_str().to_string(),
        other => panic!("not a var: {other:?}"),
    };
    assert_eq!(name(&words[1]), "a b");
    assert_eq!(name(&words[2]), "ns::x");
    assert_eq!(name(&words[3]), "a");
    match &words[3].kind {
        WordKind::Single(Part::Var(VarRef { index: Some(index), .. })) => {
            assert!(matches!(**index, WordKind::Multi(ref parts) if parts.len() == 2));
        }
        other => panic!("expected array ref: {other:?}"),
    }
}

#[test]
fn nested_brackets() {
    let script = parse_script("set x [a [b c] \"d]\" {e]}]; puts y").unwrap();
    assert_eq!(script.commands.len(), 2);
    let WordKind::Single(Part::Script(inner)) = &script.commands[0].words[2].kind else {
        panic!("expected a bracket");
    };
    assert_eq!(inner.commands.len(), 1);
    assert_eq!(inner.commands[0].words.len(), 4);
}

#[test]
fn bracket_holds_several_commands() {
    let script = parse_script("puts [a; b\nc]").unwrap();
    let WordKind::Single(Part::Script(inner)) = &script.commands[0].words[1].kind else {
        panic!("expected a bracket");
    };
    assert_eq!(inner.commands.len(), 3);
}

#[test]
fn close_bracket_is_literal_at_top_level() {
    assert_eq!(shape("puts a]"), vec![vec!["puts", "a]"]]);
}

#[test]
fn expansion_prefix() {
    let script = parse_script("cmd {*}$args {*} {*}{a b}").unwrap();
    let words = &script.commands[0].words;
    assert!(words[1].expand);
    assert!(!words[2].expand);
    assert_eq!(words[2].kind.as_literal().map(Obj::as_str), Some("*"));
    assert!(words[3].expand);
    assert!(script.commands[0].has_expansion());
}

#[test]
fn tracks_command_lines() {
    let script = parse_script("a\n\nb {\n\n}\nc").unwrap();
    let lines: Vec<u32> = script.commands.iter().map(|c| c.line).collect();
    assert_eq!(lines, vec![1, 3, 6]);
}

#[test]
fn reports_unclosed_constructs() {
    assert_eq!(
        parse_script("a\nputs {x").unwrap_err(),
        ParseError::MissingCloseBrace { line: 2 }
    );
    assert_eq!(
        parse_script("puts [x").unwrap_err(),
        ParseError::MissingCloseBracket { line: 1 }
    );
    assert_eq!(
        parse_script("puts \"x").unwrap_err(),
        ParseError::MissingCloseQuote { line: 1 }
    );
    assert_eq!(
        parse_script("puts ${x").unwrap_err(),
        ParseError::MissingCloseBraceVar { line: 1 }
    );
    assert_eq!(
        parse_script("puts $a(x").unwrap_err(),
        ParseError::MissingCloseParen { line: 1 }
    );
}

#[test]
fn reports_trailing_garbage() {
    assert_eq!(
        parse_script("puts {a}b").unwrap_err(),
        ParseError::ExtraCharsAfterBrace { line: 1 }
    );
    assert_eq!(
        parse_script("puts \"a\"b").unwrap_err(),
        ParseError::ExtraCharsAfterQuote { line: 1 }
    );
}

#[test]
fn iterator_yields_commands_until_error() {
    let mut parser = Parser::new("a; b {");
    assert!(matches!(parser.next(), Some(Ok(_))));
    assert!(matches!(parser.next(), Some(Err(_))));
    assert!(parser.next().is_none());
}

#[test]
fn subst_respects_flags() {
    let parts = parse_subst(r"a $x [b] \t", Subst::all()).unwrap();
    assert_eq!(parts.len(), 5);
    let parts = parse_subst(r"a $x [b] \t", Subst::BACKSLASHES).unwrap();
    assert_eq!(parts.len(), 1);
    match &parts[0] {
        Part::Text(text) => assert_eq!(text.as_str(), "a $x [b] \t"),
        other => panic!("expected text: {other:?}"),
    }
}

#[test]
fn completeness_for_prompt() {
    assert!(is_complete("puts hi"));
    assert!(!is_complete("proc f {} {"));
    assert!(!is_complete("puts [list a"));
    assert!(is_complete("puts {a}b"));
}

#[test]
fn multibyte_text_survives() {
    assert_eq!(
        shape("puts héllo {wörld} \"ü\\é\""),
        vec![vec!["puts", "héllo", "wörld", "üé"]]
    );
}

proptest! {
    #[test]
    fn never_panics(text in "[a-z{}\\[\\]\"$\\\\;#() \\n\\té]{0,40}") {
        let _ = parse_script(&text);
        let _ = is_complete(&text);
    }
}
