use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn strings(items: &[Obj]) -> Vec<String> {
    items.iter().map(|o| o.as_str().to_string()).collect()
}

#[test]
fn bare_words() {
    let items = parse_list("  a b\tc\n").unwrap_or_default();
    assert_eq!(strings(&items), ["a", "b", "c"]);
}

#[test]
fn braces_nest_and_keep_contents_literal() {
    let items = parse_list(r"a {b {c d}} {$x \n}").unwrap_or_default();
    assert_eq!(strings(&items), ["a", "b {c d}", r"$x \n"]);
}

#[test]
fn quotes_decode_backslashes() {
    let items = parse_list(r#""a b" "c\td""#).unwrap_or_default();
    assert_eq!(strings(&items), ["a b", "c\td"]);
}

#[test]
fn malformed_lists() {
    assert_eq!(parse_list("{a b").err(), Some(ValueError::UnmatchedBrace));
    assert_eq!(parse_list("\"a b").err(), Some(ValueError::UnmatchedQuote));
    assert!(matches!(
        parse_list("{a}b"),
        Err(ValueError::ListElementFollowedBy { kind: "braces", .. })
    ));
}

#[test]
fn quoting_cases() {
    assert_eq!(quote_element(""), "{}");
    assert_eq!(quote_element("plain"), "plain");
    assert_eq!(quote_element("a b"), "{a b}");
    assert_eq!(quote_element("a{b"), r"a\{b");
    assert_eq!(quote_element("a}b"), r"a\}b");
    assert_eq!(quote_element("#x"), "{#x}");
    assert_eq!(quote_element("x\\"), "x\\\\");
}

#[test]
fn formatting_round_trips_awkward_elements() {
    let originals = [
        "",
        "a b",
        "{",
        "}",
        "\"quoted\"",
        "{balanced {nested}}",
        "tail\\",
        "new\nline",
        "$var[cmd]",
        "#comment",
        "semi;colon",
    ];
    let objs: Vec<Obj> = originals.iter().map(|s| Obj::new_string(*s)).collect();
    let text = format_list(&objs);
    let back = parse_list(&text).unwrap_or_default();
    assert_eq!(strings(&back), originals);
}

#[test]
fn indices() {
    assert_eq!(parse_index("0", 3), Ok(ListIndex::At(0)));
    assert_eq!(parse_index("end", 3), Ok(ListIndex::At(2)));
    assert_eq!(parse_index("end-1", 3), Ok(ListIndex::At(1)));
    assert_eq!(parse_index("end+1", 3), Ok(ListIndex::After));
    assert_eq!(parse_index("1+1", 3), Ok(ListIndex::At(2)));
    assert_eq!(parse_index("-1", 3), Ok(ListIndex::Before));
    assert_eq!(parse_index("end", 0), Ok(ListIndex::Before));
    assert!(parse_index("middle", 3).is_err());
    assert!(parse_index("end--1", 3).is_err());
}

#[test]
fn index_suffix_must_be_a_signed_offset() {
    assert_eq!(
        parse_index("endé", 2),
        Err(ValueError::BadIndex("endé".to_string()))
    );
    assert_eq!(
        parse_index("endx1", 3),
        Err(ValueError::BadIndex("endx1".to_string()))
    );
    assert!(parse_index("end*1", 3).is_err());
    assert!(parse_index("1é", 3).is_err());
}

proptest! {
    #[test]
    fn any_strings_round_trip(elems in proptest::collection::vec(".{0,12}", 0..6)) {
        let objs: Vec<Obj> = elems.iter().map(|s| Obj::new_string(s.as_str())).collect();
        let back = parse_list(&format_list(&objs));
        prop_assert!(back.is_ok());
        let back = back.unwrap_or_default();
        prop_assert_eq!(strings(&back), elems);
    }
}
