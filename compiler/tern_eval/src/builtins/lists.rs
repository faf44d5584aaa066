//! List commands.
//!
//! Every command works on the list rep, so a value that is already a list
//! is never reparsed. `lappend` and `lset` modify the variable's value in
//! place when nothing else shares it.

use std::cmp::Ordering;

use tern_value::{parse_index, ListIndex, Obj};

use crate::errors::{EvalResult, ScriptError};
use crate::glob::glob_match;
use crate::subcmd::option_index;
use crate::Interp;

use super::{arity, concat, Builtin};

pub(super) const COMMANDS: &[(&str, Builtin)] = &[
    ("list", list),
    ("llength", llength),
    ("lindex", lindex),
    ("lappend", lappend),
    ("lrange", lrange),
    ("linsert", linsert),
    ("lreplace", lreplace),
    ("lset", lset),
    ("lsearch", lsearch),
    ("lsort", lsort),
    ("lreverse", lreverse),
    ("concat", concat_cmd),
    ("join", join),
    ("split", split),
];

fn out_of_range() -> ScriptError {
    ScriptError::new("list index out of range")
}

/// First position of a range: clamped to the start, `None` past the end.
fn range_start(index: ListIndex) -> Option<usize> {
    match index {
        ListIndex::Before => Some(0),
        ListIndex::At(i) => Some(i),
        ListIndex::After => None,
    }
}

/// Last position of a range: clamped to the end, `None` before the start.
fn range_end(index: ListIndex, len: usize) -> Option<usize> {
    match index {
        ListIndex::Before => None,
        ListIndex::At(i) => Some(i),
        ListIndex::After => len.checked_sub(1),
    }
}

/// Position for an insertion, where `end` means after the last element.
fn insert_position(text: &str, len: usize) -> Result<usize, ScriptError> {
    Ok(match parse_index(text, len + 1)? {
        ListIndex::Before => 0,
        ListIndex::At(i) => i,
        ListIndex::After => len,
    })
}

fn list(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    Ok(Obj::list(argv[1..].to_vec()))
}

fn llength(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, Some(2), "list")?;
    Ok(Obj::int(argv[1].list_len()? as i64))
}

/// Indices given either as separate words or as one list.
fn index_words(argv_indices: &[Obj]) -> Result<Vec<Obj>, ScriptError> {
    match argv_indices {
        [single] => Ok(single.get_list()?.to_vec()),
        many => Ok(many.to_vec()),
    }
}

fn lindex(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, None, "list ?index ...?")?;
    let mut value = argv[1].clone();
    for index in index_words(&argv[2..])? {
        let items = value.get_list()?;
        value = match parse_index(index.as_str(), items.len())? {
            ListIndex::At(i) => items[i].clone(),
            ListIndex::Before | ListIndex::After => return Ok(Obj::empty()),
        };
    }
    Ok(value)
}

fn lappend(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, None, "varName ?value ...?")?;
    let values = &argv[2..];
    Ok(interp.update_var(argv[1].as_str(), true, |list| {
        let items = list.list_mut()?;
        items.extend(values.iter().cloned());
        Ok(())
    })?)
}

fn lrange(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 4, Some(4), "list first last")?;
    let items = argv[1].get_list()?;
    let first = range_start(parse_index(argv[2].as_str(), items.len())?);
    let last = range_end(parse_index(argv[3].as_str(), items.len())?, items.len());
    match (first, last) {
        (Some(first), Some(last)) if first <= last => {
            Ok(Obj::list(items[first..=last].to_vec()))
        }
        _ => Ok(Obj::empty()),
    }
}

fn linsert(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 3, None, "list index ?element ...?")?;
    let mut list = argv[1].clone();
    let items = list.list_mut()?;
    let at = insert_position(argv[2].as_str(), items.len())?;
    items.splice(at..at, argv[3..].iter().cloned());
    Ok(list)
}

fn lreplace(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 4, None, "list first last ?element ...?")?;
    let mut list = argv[1].clone();
    let items = list.list_mut()?;
    let len = items.len();
    let first = range_start(parse_index(argv[2].as_str(), len)?).unwrap_or(len);
    let end = match range_end(parse_index(argv[3].as_str(), len)?, len) {
        Some(last) if last >= first => last + 1,
        _ => first,
    };
    items.splice(first..end, argv[4..].iter().cloned());
    Ok(list)
}

/// Position addressed by `index` in a list of `len` elements, where one
/// past the end means append.
fn lset_position(index: &Obj, len: usize) -> Result<Option<usize>, ScriptError> {
    match parse_index(index.as_str(), len)? {
        ListIndex::At(i) => Ok(Some(i)),
        ListIndex::After if parse_index(index.as_str(), len + 1)? == ListIndex::At(len) => {
            Ok(None)
        }
        _ => Err(out_of_range()),
    }
}

/// Walk `indices` without mutating anything, so a bad index deep in the
/// path leaves the variable untouched.
fn check_nested(list: &Obj, indices: &[Obj]) -> Result<(), ScriptError> {
    let mut current = list.clone();
    for index in indices {
        let items = current.get_list()?;
        current = match lset_position(index, items.len())? {
            Some(i) => items[i].clone(),
            None => Obj::empty(),
        };
    }
    Ok(())
}

/// Replace the element of `list` addressed by `indices` (one index per
/// nesting level). An index one past the end appends.
fn set_nested(list: &mut Obj, indices: &[Obj], value: Obj) -> Result<(), ScriptError> {
    let Some((index, rest)) = indices.split_first() else {
        *list = value;
        return Ok(());
    };
    let items = list.list_mut()?;
    let len = items.len();
    let position = match lset_position(index, len)? {
        Some(i) => i,
        None => {
            items.push(Obj::empty());
            len
        }
    };
    set_nested(&mut items[position], rest, value)
}

fn lset(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 3, None, "listVar ?index? ?index ...? value")?;
    let value = argv[argv.len() - 1].clone();
    let indices = match &argv[2..argv.len() - 1] {
        [] => Vec::new(),
        words => index_words(words)?,
    };
    Ok(interp.update_var(argv[1].as_str(), false, |list| {
        check_nested(list, &indices)?;
        set_nested(list, &indices, value)
    })?)
}

fn lsearch(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    const OPTIONS: &[&str] = &["-all", "-exact", "-glob", "-inline", "-nocase", "-not"];
    arity(argv, 3, None, "?-option value ...? list pattern")?;
    let mut glob = true;
    let (mut all, mut inline, mut nocase, mut negate) = (false, false, false, false);
    for option in &argv[1..argv.len() - 2] {
        match option_index(OPTIONS, option)? {
            0 => all = true,
            1 => glob = false,
            2 => glob = true,
            3 => inline = true,
            4 => nocase = true,
            _ => negate = true,
        }
    }
    let items = argv[argv.len() - 2].get_list()?;
    let pattern = argv[argv.len() - 1].as_str();
    let matches = |item: &Obj| {
        let hit = match (glob, nocase) {
            (true, _) => glob_match(pattern, item.as_str(), nocase),
            (false, true) => item.as_str().to_lowercase() == pattern.to_lowercase(),
            (false, false) => item.as_str() == pattern,
        };
        hit != negate
    };
    let found = items.iter().enumerate().filter(|(_, item)| matches(item));
    let result = |(i, item): (usize, &Obj)| {
        if inline {
            item.clone()
        } else {
            Obj::int(i as i64)
        }
    };
    if all {
        return Ok(Obj::list(found.map(result).collect()));
    }
    Ok(match found.map(result).next() {
        Some(hit) => hit,
        None if inline => Obj::empty(),
        None => Obj::int(-1),
    })
}

/// Comparison keys for `lsort`.
enum SortKeys {
    Ascii,
    Integer(Vec<i64>),
    Real(Vec<f64>),
}

fn lsort(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    const OPTIONS: &[&str] = &[
        "-ascii",
        "-decreasing",
        "-increasing",
        "-integer",
        "-real",
        "-unique",
    ];
    arity(argv, 2, None, "?-option value ...? list")?;
    let (mut mode, mut decreasing, mut unique) = (0, false, false);
    for option in &argv[1..argv.len() - 1] {
        match option_index(OPTIONS, option)? {
            1 => decreasing = true,
            2 => decreasing = false,
            5 => unique = true,
            other => mode = other,
        }
    }
    let items = argv[argv.len() - 1].get_list()?;
    let keys = match mode {
        3 => SortKeys::Integer(items.iter().map(Obj::get_int).collect::<Result<_, _>>()?),
        4 => SortKeys::Real(items.iter().map(Obj::get_double).collect::<Result<_, _>>()?),
        _ => SortKeys::Ascii,
    };
    let compare = |a: usize, b: usize| -> Ordering {
        let ordering = match &keys {
            SortKeys::Ascii => items[a].as_str().cmp(items[b].as_str()),
            SortKeys::Integer(ints) => ints[a].cmp(&ints[b]),
            SortKeys::Real(reals) => reals[a].total_cmp(&reals[b]),
        };
        if decreasing {
            ordering.reverse()
        } else {
            ordering
        }
    };
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| compare(a, b));
    if unique {
        // The last of a run of equal elements is kept.
        let mut kept: Vec<usize> = Vec::with_capacity(order.len());
        for i in order {
            match kept.last_mut() {
                Some(last) if compare(*last, i) == Ordering::Equal => *last = i,
                _ => kept.push(i),
            }
        }
        order = kept;
    }
    Ok(Obj::list(order.into_iter().map(|i| items[i].clone()).collect()))
}

fn lreverse(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, Some(2), "list")?;
    let mut items = argv[1].get_list()?.to_vec();
    items.reverse();
    Ok(Obj::list(items))
}

fn concat_cmd(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    Ok(match &argv[1..] {
        [single] => Obj::from(single.as_str().trim()),
        words => concat(words),
    })
}

fn join(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, Some(3), "list ?joinString?")?;
    let separator = argv.get(2).map_or(" ", Obj::as_str);
    let items = argv[1].get_list()?;
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        out.push_str(item.as_str());
    }
    Ok(Obj::new_string(out))
}

fn split(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, Some(3), "string ?splitChars?")?;
    let text = argv[1].as_str();
    let separators = argv.get(2).map_or(" \t\n\r", Obj::as_str);
    if text.is_empty() {
        return Ok(Obj::empty());
    }
    let fields: Vec<Obj> = if separators.is_empty() {
        text.chars().map(|c| Obj::new_string(c.to_string())).collect()
    } else {
        text.split(|c| separators.contains(c)).map(Obj::from).collect()
    };
    Ok(Obj::list(fields))
}

