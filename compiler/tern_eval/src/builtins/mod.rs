//! The core command set.
//!
//! Each submodule exposes a `COMMANDS` table of `(name, handler)` pairs;
//! [`register_all`] installs every table into a fresh interpreter. Handlers
//! receive the whole argument vector, command name included.

mod control;
mod dicts;
mod events;
mod format;
mod info;
mod io;
mod lists;
mod namespace;
mod packages;
mod procs;
mod strings;
mod vars;

use tern_value::Obj;

use crate::errors::{wrong_num_args_for, EvalResult, ScriptError};
use crate::Interp;

pub(crate) type Builtin = fn(&mut Interp, &[Obj]) -> EvalResult;

const TABLES: &[&[(&str, Builtin)]] = &[
    vars::COMMANDS,
    control::COMMANDS,
    procs::COMMANDS,
    lists::COMMANDS,
    strings::COMMANDS,
    format::COMMANDS,
    dicts::COMMANDS,
    info::COMMANDS,
    namespace::COMMANDS,
    packages::COMMANDS,
    events::COMMANDS,
    io::COMMANDS,
];

pub(crate) fn register_all(interp: &mut Interp) {
    for table in TABLES {
        for &(name, handler) in *table {
            interp.create_command(name, handler);
        }
    }
    tracing::debug!(commands = interp.commands.len(), "registered core commands");
}

/// Fail with a usage message unless `argv` (command name included) has
/// between `min` and `max` words.
pub(crate) fn arity(
    argv: &[Obj],
    min: usize,
    max: Option<usize>,
    synopsis: &str,
) -> Result<(), ScriptError> {
    if argv.len() < min || max.is_some_and(|max| argv.len() > max) {
        Err(wrong_num_args_for(argv, synopsis))
    } else {
        Ok(())
    }
}

/// Join words the way `concat` does: trimmed, empty ones dropped, separated
/// by single spaces. A single word is returned unchanged.
pub(crate) fn concat(words: &[Obj]) -> Obj {
    if let [only] = words {
        return only.clone();
    }
    let mut out = String::new();
    for word in words {
        let text = word.as_str().trim();
        if text.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(text);
    }
    Obj::new_string(out)
}

/// The part of a qualified name after the last `::`.
pub(crate) fn tail(name: &str) -> &str {
    name.rfind("::").map_or(name, |i| &name[i + 2..])
}

/// The part of a qualified name before the last `::`, or empty.
pub(crate) fn qualifiers(name: &str) -> &str {
    match name.rfind("::") {
        Some(i) => name[..i].trim_end_matches(':'),
        None => "",
    }
}

pub(crate) fn empty() -> EvalResult {
    Ok(Obj::empty())
}
