//! `set`, `unset`, `incr`, `append`, `global`, `upvar`, `variable`.

use tern_value::Obj;

use crate::errors::{integer_overflow, wrong_num_args, EvalResult};
use crate::interp::frames::looks_like_level;
use crate::interp::FrameKind;
use crate::Interp;

use super::{arity, empty, tail, Builtin};

pub(super) const COMMANDS: &[(&str, Builtin)] = &[
    ("set", set),
    ("unset", unset),
    ("incr", incr),
    ("append", append),
    ("global", global),
    ("upvar", upvar),
    ("variable", variable),
];

fn set(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, Some(3), "varName ?newValue?")?;
    let name = argv[1].as_str();
    match argv.get(2) {
        Some(value) => Ok(interp.set_var(name, value.clone())?),
        None => Ok(interp.get_var(name)?),
    }
}

fn unset(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let mut complain = true;
    let mut names = &argv[1..];
    while let Some(first) = names.first() {
        match first.as_str() {
            "-nocomplain" => complain = false,
            "--" => {
                names = &names[1..];
                break;
            }
            _ => break,
        }
        names = &names[1..];
    }
    for name in names {
        interp.unset_var(name.as_str(), complain)?;
    }
    empty()
}

fn incr(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, Some(3), "varName ?increment?")?;
    let amount = match argv.get(2) {
        Some(amount) => amount.get_int()?,
        None => 1,
    };
    let value = interp.update_var(argv[1].as_str(), true, |value| {
        let current = if value.is_empty_string() {
            0
        } else {
            value.get_int()?
        };
        let next = current.checked_add(amount).ok_or_else(integer_overflow)?;
        value.set_int(next);
        Ok(())
    })?;
    Ok(value)
}

fn append(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, None, "varName ?value ...?")?;
    let name = argv[1].as_str();
    if argv.len() == 2 {
        return Ok(interp.get_var(name)?);
    }
    let value = interp.update_var(name, true, |value| {
        for piece in &argv[2..] {
            value.append_str(piece.as_str());
        }
        Ok(())
    })?;
    Ok(value)
}

fn global(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, None, "varName ?varName ...?")?;
    if interp.frame().kind == FrameKind::Global {
        return empty();
    }
    for name in &argv[1..] {
        let key = name.as_str().trim_start_matches(':');
        interp.link_global(tail(key), key)?;
    }
    empty()
}

fn upvar(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    const USAGE: &str = "?level? otherVar localVar ?otherVar localVar ...?";
    arity(argv, 3, None, USAGE)?;
    let mut rest = &argv[1..];
    let level = if rest.len() % 2 == 1 {
        let level = rest[0].as_str();
        if !looks_like_level(level) {
            return Err(crate::errors::bad_level(level).into());
        }
        rest = &rest[1..];
        level
    } else {
        "1"
    };
    if rest.is_empty() {
        return Err(wrong_num_args(format!("upvar {USAGE}")).into());
    }
    let frame = interp.frames.resolve_level(level)?;
    for pair in rest.chunks_exact(2) {
        interp.link_var(pair[1].as_str(), frame, pair[0].as_str())?;
    }
    empty()
}

/// Declare namespace variables, linking them into the active proc.
fn variable(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, None, "?name value...? name ?value?")?;
    let namespace = interp.frame().namespace.clone();
    let in_proc = interp.frame().kind == FrameKind::Proc;
    for pair in argv[1..].chunks(2) {
        let name = pair[0].as_str();
        let key = match name.strip_prefix("::") {
            Some(absolute) => absolute.to_string(),
            None if namespace.is_empty() => name.to_string(),
            None => format!("{namespace}::{name}"),
        };
        if in_proc {
            interp.link_global(tail(name), &key)?;
        }
        if let Some(value) = pair.get(1) {
            interp.set_var(&format!("::{key}"), value.clone())?;
        }
    }
    empty()
}
