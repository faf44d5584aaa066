//! The `dict` ensemble.
//!
//! Reading subcommands take a dict value; the updating ones (`set`,
//! `unset`, `incr`, `append`, `lappend`) take a variable name and modify
//! its value in place when it is not shared. Nested keys address dicts
//! held inside dicts.

use tern_value::{Dict, Obj};

use crate::errors::{integer_overflow, wrong_num_args, EvalResult, ScriptError};
use crate::glob::glob_match;
use crate::subcmd::{dispatch, SubCommand};
use crate::Interp;

use super::control::{loop_step, Step};
use super::{empty, Builtin};

pub(super) const COMMANDS: &[(&str, Builtin)] = &[("dict", dict)];

static SUBCOMMANDS: &[SubCommand] = &[
    SubCommand::new("append", "dictVarName key ?value ...?", 2, None, append),
    SubCommand::new("create", "?key value ...?", 0, None, create),
    SubCommand::new("exists", "dictionary key ?key ...?", 2, None, exists),
    SubCommand::new("for", "{keyVarName valueVarName} dictionary script", 3, Some(3), for_cmd),
    SubCommand::new("get", "dictionary ?key ...?", 1, None, get),
    SubCommand::new("incr", "dictVarName key ?increment?", 2, Some(3), incr),
    SubCommand::new("keys", "dictionary ?pattern?", 1, Some(2), keys),
    SubCommand::new("lappend", "dictVarName key ?value ...?", 2, None, lappend),
    SubCommand::new("merge", "?dictionary ...?", 0, None, merge),
    SubCommand::new("set", "dictVarName key ?key ...? value", 3, None, set),
    SubCommand::new("size", "dictionary", 1, Some(1), size),
    SubCommand::new("unset", "dictVarName key ?key ...?", 2, None, unset),
    SubCommand::new("values", "dictionary ?pattern?", 1, Some(2), values),
];

fn dict(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    dispatch(interp, SUBCOMMANDS, argv)
}

fn unknown_key(key: &Obj) -> ScriptError {
    ScriptError::new(format!("key \"{key}\" not known in dictionary"))
        .with_error_code(Obj::list(vec![
            Obj::from("TERN"),
            Obj::from("LOOKUP"),
            Obj::from("DICT"),
            key.clone(),
        ]))
}

/// Follow `keys` down through nested dicts.
fn lookup(dict: &Obj, keys: &[Obj]) -> Result<Option<Obj>, ScriptError> {
    let mut value = dict.clone();
    for key in keys {
        let next = value.get_dict()?.get(key.as_str()).cloned();
        match next {
            Some(next) => value = next,
            None => return Ok(None),
        }
    }
    Ok(Some(value))
}

/// Store `value` under the nested `keys` path, creating inner dicts.
fn set_path(dict: &mut Obj, keys: &[Obj], value: Obj) -> Result<(), ScriptError> {
    let Some((key, rest)) = keys.split_first() else {
        *dict = value;
        return Ok(());
    };
    let entries = dict.dict_mut()?;
    if rest.is_empty() {
        entries.insert(key.clone(), value);
        return Ok(());
    }
    if !entries.contains(key.as_str()) {
        entries.insert(key.clone(), Obj::dict(Dict::new()));
    }
    match entries.get_mut(key.as_str()) {
        Some(inner) => set_path(inner, rest, value),
        None => Err(unknown_key(key)),
    }
}

/// Update the entry `key` of the dict in `var` in place. A missing entry
/// starts out empty and is dropped again if `f` fails.
fn update_entry(
    interp: &mut Interp,
    var: &Obj,
    key: &Obj,
    f: impl FnOnce(&mut Obj) -> Result<(), ScriptError>,
) -> EvalResult {
    Ok(interp.update_var(var.as_str(), true, |dict| {
        let entries = dict.dict_mut()?;
        let created = !entries.contains(key.as_str());
        if created {
            entries.insert(key.clone(), Obj::empty());
        }
        let outcome = match entries.get_mut(key.as_str()) {
            Some(value) => f(value),
            None => Err(unknown_key(key)),
        };
        if outcome.is_err() && created {
            entries.remove(key.as_str());
        }
        outcome
    })?)
}

fn append(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let values = &argv[4..];
    update_entry(interp, &argv[2], &argv[3], |value| {
        for suffix in values {
            value.append_str(suffix.as_str());
        }
        Ok(())
    })
}

fn create(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let pairs = &argv[2..];
    if pairs.len() % 2 != 0 {
        return Err(wrong_num_args("dict create ?key value ...?").into());
    }
    Ok(Obj::dict(Dict::from_flat(pairs)?))
}

fn exists(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let (path, last) = argv[3..].split_at(argv.len() - 4);
    let found = match lookup(&argv[2], path) {
        Ok(Some(inner)) => inner
            .get_dict()
            .is_ok_and(|dict| dict.contains(last[0].as_str())),
        _ => false,
    };
    Ok(Obj::bool(found))
}

fn for_cmd(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let vars = argv[2].get_list()?;
    let [key_var, value_var] = vars.as_slice() else {
        return Err(ScriptError::new("must have exactly two variable names").into());
    };
    let dict = argv[3].get_dict()?;
    for (key, value) in dict.iter() {
        interp.set_var(key_var.as_str(), key.clone())?;
        interp.set_var(value_var.as_str(), value.clone())?;
        if let Step::Stop = loop_step(interp.eval_obj(&argv[4]))? {
            break;
        }
    }
    empty()
}

fn get(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let mut value = argv[2].clone();
    for key in &argv[3..] {
        let next = value.get_dict()?.get(key.as_str()).cloned();
        value = next.ok_or_else(|| unknown_key(key))?;
    }
    Ok(value)
}

fn incr(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let amount = match argv.get(4) {
        Some(amount) => amount.get_int()?,
        None => 1,
    };
    update_entry(interp, &argv[2], &argv[3], |value| {
        let base = if value.is_empty_string() {
            0
        } else {
            value.get_int()?
        };
        let sum = base.checked_add(amount).ok_or_else(integer_overflow)?;
        value.set_int(sum);
        Ok(())
    })
}

fn matching(entries: impl Iterator<Item = Obj>, pattern: Option<&Obj>) -> Obj {
    Obj::list(
        entries
            .filter(|item| pattern.is_none_or(|p| glob_match(p.as_str(), item.as_str(), false)))
            .collect(),
    )
}

fn keys(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let dict = argv[2].get_dict()?;
    Ok(matching(dict.keys().cloned(), argv.get(3)))
}

fn values(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let dict = argv[2].get_dict()?;
    Ok(matching(dict.values().cloned(), argv.get(3)))
}

fn lappend(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let values = &argv[4..];
    update_entry(interp, &argv[2], &argv[3], |list| {
        list.list_mut()?.extend(values.iter().cloned());
        Ok(())
    })
}

fn merge(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let mut merged = Dict::new();
    for dict in &argv[2..] {
        for (key, value) in dict.get_dict()?.iter() {
            merged.insert(key.clone(), value.clone());
        }
    }
    Ok(Obj::dict(merged))
}

fn set(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let value = argv[argv.len() - 1].clone();
    let keys = &argv[3..argv.len() - 1];
    Ok(interp.update_var(argv[2].as_str(), true, |dict| {
        set_path(dict, keys, value)
    })?)
}

fn size(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    Ok(Obj::int(argv[2].get_dict()?.len() as i64))
}

/// Remove the last of `keys` from the dict the others lead to. A missing
/// final key is not an error; a missing intermediate one is.
fn unset_path(dict: &mut Obj, keys: &[Obj]) -> Result<(), ScriptError> {
    let Some((key, rest)) = keys.split_first() else {
        return Ok(());
    };
    let entries = dict.dict_mut()?;
    if rest.is_empty() {
        entries.remove(key.as_str());
        return Ok(());
    }
    match entries.get_mut(key.as_str()) {
        Some(inner) => unset_path(inner, rest),
        None => Err(unknown_key(key)),
    }
}

fn unset(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let keys = &argv[3..];
    Ok(interp.update_var(argv[2].as_str(), true, |dict| unset_path(dict, keys))?)
}
