//! The `string` ensemble.
//!
//! Indices count characters, not bytes, and accept the same `end-N` forms
//! as list indices.

use tern_value::{parse_bool, parse_index, parse_list, ListIndex, Obj};

use crate::errors::{wrong_num_args, EvalResult, ScriptError};
use crate::glob::glob_match;
use crate::subcmd::{dispatch, option_index, SubCommand};
use crate::Interp;

use super::Builtin;

pub(super) const COMMANDS: &[(&str, Builtin)] = &[("string", string)];

static SUBCOMMANDS: &[SubCommand] = &[
    SubCommand::new("cat", "?string ...?", 0, None, cat),
    SubCommand::new("compare", "?-nocase? string1 string2", 2, Some(3), compare),
    SubCommand::new("equal", "?-nocase? string1 string2", 2, Some(3), equal),
    SubCommand::new("first", "needleString haystackString ?startIndex?", 2, Some(3), first),
    SubCommand::new("index", "string charIndex", 2, Some(2), index),
    SubCommand::new("is", "class ?-strict? string", 2, Some(3), is),
    SubCommand::new("last", "needleString haystackString ?lastIndex?", 2, Some(3), last),
    SubCommand::new("length", "string", 1, Some(1), length),
    SubCommand::new("map", "?-nocase? charMap string", 2, Some(3), map),
    SubCommand::new("match", "?-nocase? pattern string", 2, Some(3), match_cmd),
    SubCommand::new("range", "string first last", 3, Some(3), range),
    SubCommand::new("repeat", "string count", 2, Some(2), repeat),
    SubCommand::new("reverse", "string", 1, Some(1), reverse),
    SubCommand::new("tolower", "string", 1, Some(1), tolower),
    SubCommand::new("toupper", "string", 1, Some(1), toupper),
    SubCommand::new("trim", "string ?chars?", 1, Some(2), trim),
    SubCommand::new("trimleft", "string ?chars?", 1, Some(2), trimleft),
    SubCommand::new("trimright", "string ?chars?", 1, Some(2), trimright),
];

fn string(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    dispatch(interp, SUBCOMMANDS, argv)
}

/// Split the arguments after the subcommand into a leading `-nocase` flag
/// and the rest.
fn nocase_flag(args: &[Obj], operands: usize) -> Result<(bool, &[Obj]), ScriptError> {
    if args.len() == operands {
        return Ok((false, args));
    }
    option_index(&["-nocase"], &args[0])?;
    Ok((true, &args[1..]))
}

fn chars(obj: &Obj) -> Vec<char> {
    obj.as_str().chars().collect()
}

/// Character position of `index` in a string of `len` characters.
fn char_index(index: &Obj, len: usize) -> Result<Option<usize>, ScriptError> {
    Ok(match parse_index(index.as_str(), len)? {
        ListIndex::At(i) => Some(i),
        ListIndex::Before | ListIndex::After => None,
    })
}

fn cat(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let mut out = String::new();
    for word in &argv[2..] {
        out.push_str(word.as_str());
    }
    Ok(Obj::new_string(out))
}

fn compare(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let (nocase, operands) = nocase_flag(&argv[2..], 2)?;
    let ordering = if nocase {
        operands[0]
            .as_str()
            .to_lowercase()
            .cmp(&operands[1].as_str().to_lowercase())
    } else {
        operands[0].as_str().cmp(operands[1].as_str())
    };
    Ok(Obj::int(ordering as i64))
}

fn equal(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let (nocase, operands) = nocase_flag(&argv[2..], 2)?;
    let (a, b) = (operands[0].as_str(), operands[1].as_str());
    let equal = if nocase {
        a.to_lowercase() == b.to_lowercase()
    } else {
        a == b
    };
    Ok(Obj::bool(equal))
}

fn find_from(haystack: &[char], needle: &[char], start: usize) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    (start..=haystack.len() - needle.len()).find(|&i| haystack[i..].starts_with(needle))
}

fn first(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let needle = chars(&argv[2]);
    let haystack = chars(&argv[3]);
    let start = match argv.get(4) {
        Some(start) => match parse_index(start.as_str(), haystack.len())? {
            ListIndex::Before => 0,
            ListIndex::At(i) => i,
            ListIndex::After => return Ok(Obj::int(-1)),
        },
        None => 0,
    };
    Ok(Obj::int(
        find_from(&haystack, &needle, start).map_or(-1, |i| i as i64),
    ))
}

fn last(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let needle = chars(&argv[2]);
    let haystack = chars(&argv[3]);
    let limit = match argv.get(4) {
        Some(limit) => match parse_index(limit.as_str(), haystack.len())? {
            ListIndex::Before => return Ok(Obj::int(-1)),
            ListIndex::At(i) => i,
            ListIndex::After => haystack.len(),
        },
        None => haystack.len(),
    };
    if needle.is_empty() || needle.len() > haystack.len() {
        return Ok(Obj::int(-1));
    }
    let latest = limit.min(haystack.len() - needle.len());
    let found = (0..=latest)
        .rev()
        .find(|&i| haystack[i..].starts_with(&needle));
    Ok(Obj::int(found.map_or(-1, |i| i as i64)))
}

fn index(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let text = chars(&argv[2]);
    Ok(match char_index(&argv[3], text.len())? {
        Some(i) => Obj::new_string(text[i].to_string()),
        None => Obj::empty(),
    })
}

fn is(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    const CLASSES: &[&str] = &[
        "alnum", "alpha", "boolean", "digit", "double", "integer", "list", "lower", "space",
        "upper",
    ];
    let class = option_index(CLASSES, &argv[2])?;
    let (strict, value) = match &argv[3..] {
        [value] => (false, value),
        [flag, value] => {
            option_index(&["-strict"], flag)?;
            (true, value)
        }
        _ => return Err(wrong_num_args("string is class ?-strict? string").into()),
    };
    if value.is_empty_string() {
        return Ok(Obj::bool(!strict));
    }
    let text = value.as_str();
    let all = |pred: fn(char) -> bool| text.chars().all(pred);
    let result = match CLASSES[class] {
        "alnum" => all(char::is_alphanumeric),
        "alpha" => all(char::is_alphabetic),
        "boolean" => parse_bool(text).is_ok(),
        "digit" => all(|c| c.is_ascii_digit()),
        "double" => value.get_double().is_ok(),
        "integer" => value.get_int().is_ok(),
        "list" => parse_list(text).is_ok(),
        "lower" => all(char::is_lowercase),
        "space" => all(char::is_whitespace),
        _ => all(char::is_uppercase),
    };
    Ok(Obj::bool(result))
}

fn length(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    Ok(Obj::int(argv[2].as_str().chars().count() as i64))
}

fn map(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let (nocase, operands) = nocase_flag(&argv[2..], 2)?;
    let mapping = operands[0].get_list()?;
    if mapping.len() % 2 != 0 {
        return Err(ScriptError::new("char map list unbalanced").into());
    }
    let fold = |text: &str| {
        if nocase {
            text.to_lowercase()
        } else {
            text.to_string()
        }
    };
    let pairs: Vec<(Vec<char>, &str)> = mapping
        .chunks_exact(2)
        .filter(|pair| !pair[0].is_empty_string())
        .map(|pair| (fold(pair[0].as_str()).chars().collect(), pair[1].as_str()))
        .collect();
    let text = chars(&operands[1]);
    let folded: Vec<char> = if nocase {
        fold(operands[1].as_str()).chars().collect()
    } else {
        text.clone()
    };
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    'scan: while i < text.len() {
        for (key, replacement) in &pairs {
            // Case folding may change the length of a few characters; only
            // map when the folded text stays aligned.
            if folded.len() == text.len() && folded[i..].starts_with(key) {
                out.push_str(replacement);
                i += key.len();
                continue 'scan;
            }
        }
        out.push(text[i]);
        i += 1;
    }
    Ok(Obj::new_string(out))
}

fn match_cmd(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let (nocase, operands) = nocase_flag(&argv[2..], 2)?;
    Ok(Obj::bool(glob_match(
        operands[0].as_str(),
        operands[1].as_str(),
        nocase,
    )))
}

fn range(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let text = chars(&argv[2]);
    let len = text.len();
    if len == 0 {
        return Ok(Obj::empty());
    }
    let first = match parse_index(argv[3].as_str(), len)? {
        ListIndex::Before => 0,
        ListIndex::At(i) => i,
        ListIndex::After => return Ok(Obj::empty()),
    };
    let last = match parse_index(argv[4].as_str(), len)? {
        ListIndex::Before => return Ok(Obj::empty()),
        ListIndex::At(i) => i,
        ListIndex::After => len - 1,
    };
    if first > last {
        return Ok(Obj::empty());
    }
    Ok(Obj::new_string(text[first..=last].iter().collect::<String>()))
}

/// Longest string `string repeat` will build.
const MAX_REPEAT_LEN: usize = i32::MAX as usize;

fn repeat(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let count = usize::try_from(argv[3].get_int()?).unwrap_or(0);
    let text = argv[2].as_str();
    match text.len().checked_mul(count) {
        Some(len) if len <= MAX_REPEAT_LEN => Ok(Obj::new_string(text.repeat(count))),
        _ => Err(ScriptError::new("string size overflow").into()),
    }
}

fn reverse(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    Ok(Obj::new_string(argv[2].as_str().chars().rev().collect::<String>()))
}

fn tolower(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    Ok(Obj::new_string(argv[2].as_str().to_lowercase()))
}

fn toupper(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    Ok(Obj::new_string(argv[2].as_str().to_uppercase()))
}

const WHITESPACE: &str = " \t\n\r";

fn trim_set(argv: &[Obj]) -> &str {
    argv.get(3).map_or(WHITESPACE, Obj::as_str)
}

fn trim(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let set = trim_set(argv);
    Ok(Obj::from(argv[2].as_str().trim_matches(|c| set.contains(c))))
}

fn trimleft(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let set = trim_set(argv);
    Ok(Obj::from(argv[2].as_str().trim_start_matches(|c| set.contains(c))))
}

fn trimright(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let set = trim_set(argv);
    Ok(Obj::from(argv[2].as_str().trim_end_matches(|c| set.contains(c))))
}
