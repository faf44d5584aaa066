//! The `info` ensemble: introspection of commands, variables and frames.

use std::rc::Rc;

use tern_parse::is_complete;
use tern_value::{Dict, Obj};

use crate::commands::{CommandKind, Proc};
use crate::errors::{bad_level, EvalResult, ScriptError};
use crate::glob::{glob_match, is_literal};
use crate::interp::FrameKind;
use crate::subcmd::{dispatch, SubCommand};
use crate::Interp;

use super::Builtin;

pub(super) const COMMANDS: &[(&str, Builtin)] = &[("info", info)];

static SUBCOMMANDS: &[SubCommand] = &[
    SubCommand::new("args", "procname", 1, Some(1), args),
    SubCommand::new("body", "procname", 1, Some(1), body),
    SubCommand::new("commands", "?pattern?", 0, Some(1), commands),
    SubCommand::new("complete", "command", 1, Some(1), complete),
    SubCommand::new("default", "procname arg varname", 3, Some(3), default),
    SubCommand::new("exists", "varName", 1, Some(1), exists),
    SubCommand::new("frame", "?number?", 0, Some(1), frame),
    SubCommand::new("globals", "?pattern?", 0, Some(1), globals),
    SubCommand::new("level", "?number?", 0, Some(1), level),
    SubCommand::new("locals", "?pattern?", 0, Some(1), locals),
    SubCommand::new("procs", "?pattern?", 0, Some(1), procs),
    SubCommand::new("script", "", 0, Some(0), script),
    SubCommand::new("stacktrace", "", 0, Some(0), stacktrace),
    SubCommand::new("vars", "?pattern?", 0, Some(1), vars),
    SubCommand::new("version", "", 0, Some(0), version),
];

fn info(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    dispatch(interp, SUBCOMMANDS, argv)
}

/// Names matching the optional pattern in `argv[2]`, as a list.
fn filtered<'a>(names: impl Iterator<Item = &'a str>, pattern: Option<&Obj>) -> Obj {
    let keep = |name: &str| match pattern {
        None => true,
        Some(p) if is_literal(p.as_str()) => p.as_str() == name,
        Some(p) => glob_match(p.as_str(), name, false),
    };
    Obj::list(names.filter(|&name| keep(name)).map(Obj::from).collect())
}

fn proc_named(interp: &Interp, name: &Obj) -> Result<Rc<Proc>, ScriptError> {
    interp
        .find_command(name.as_str())
        .and_then(|(_, command)| command.as_proc().cloned())
        .ok_or_else(|| ScriptError::new(format!("\"{name}\" isn't a procedure")))
}

fn args(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let proc = proc_named(interp, &argv[2])?;
    Ok(Obj::list(
        proc.params.iter().map(|param| Obj::from(&*param.name)).collect(),
    ))
}

fn body(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    Ok(proc_named(interp, &argv[2])?.body.clone())
}

fn commands(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let pattern = argv.get(2).map(|p| Obj::from(p.as_str().trim_start_matches("::")));
    let names: Vec<Rc<str>> = interp.commands.names().cloned().collect();
    Ok(filtered(names.iter().map(|name| &**name), pattern.as_ref()))
}

fn complete(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    Ok(Obj::bool(is_complete(argv[2].as_str())))
}

fn default(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let proc = proc_named(interp, &argv[2])?;
    let Some(param) = proc.params.iter().find(|p| *p.name == *argv[3].as_str()) else {
        return Err(ScriptError::new(format!(
            "procedure \"{}\" doesn't have an argument \"{}\"",
            argv[2], argv[3]
        ))
        .into());
    };
    match &param.default {
        Some(value) => {
            interp.set_var(argv[4].as_str(), value.clone())?;
            Ok(Obj::bool(true))
        }
        None => {
            interp.set_var(argv[4].as_str(), Obj::empty())?;
            Ok(Obj::bool(false))
        }
    }
}

fn exists(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    Ok(Obj::bool(interp.var_exists(argv[2].as_str())))
}

/// The frame a level argument names: positive is absolute, zero or
/// negative is relative to the active frame.
fn frame_for_level(interp: &Interp, word: &Obj) -> Result<usize, ScriptError> {
    let requested = word.get_int()?;
    let current = interp.frames.current().level as i64;
    let level = if requested > 0 {
        requested
    } else {
        current + requested
    };
    usize::try_from(level)
        .ok()
        .and_then(|level| interp.frames.at_level(level))
        .ok_or_else(|| bad_level(word.as_str()))
}

fn frame(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let Some(word) = argv.get(2) else {
        return Ok(Obj::int(interp.frames.current().level as i64 + 1));
    };
    let requested = word.get_int()?;
    let index = if requested > 0 {
        usize::try_from(requested - 1)
            .ok()
            .and_then(|level| interp.frames.at_level(level))
            .ok_or_else(|| bad_level(word.as_str()))?
    } else {
        frame_for_level(interp, word)?
    };
    let Some(frame) = interp.frames.get(index) else {
        return Err(bad_level(word.as_str()).into());
    };
    let kind = match frame.kind {
        FrameKind::Global => "global",
        FrameKind::Proc => "proc",
        FrameKind::Namespace => "namespace",
    };
    let mut description = Dict::new();
    description.insert(Obj::from("type"), Obj::from(kind));
    description.insert(Obj::from("level"), Obj::int(frame.level as i64));
    description.insert(Obj::from("line"), Obj::int(i64::from(frame.line)));
    if let Some(file) = &frame.file {
        description.insert(Obj::from("file"), Obj::from(&**file));
    }
    if !frame.proc_name.is_empty() {
        description.insert(Obj::from("proc"), Obj::from(&*frame.proc_name));
    }
    description.insert(Obj::from("cmd"), Obj::list(frame.call.clone()));
    Ok(Obj::dict(description))
}

fn globals(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let names = interp.globals.borrow().names();
    Ok(filtered(
        names.iter().map(|name| &**name).filter(|name| !name.contains("::")),
        argv.get(2),
    ))
}

fn level(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let Some(word) = argv.get(2) else {
        return Ok(Obj::int(interp.frames.current().level as i64));
    };
    let index = frame_for_level(interp, word)?;
    let call = interp
        .frames
        .get(index)
        .map(|frame| frame.call.clone())
        .unwrap_or_default();
    Ok(Obj::list(call))
}

fn locals(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let frame = interp.frames.current();
    if frame.kind != FrameKind::Proc {
        return Ok(Obj::empty());
    }
    let names = frame.vars.borrow().local_names();
    Ok(filtered(names.iter().map(|name| &**name), argv.get(2)))
}

fn procs(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let names: Vec<Rc<str>> = interp
        .commands
        .iter()
        .filter(|(_, command)| matches!(command.kind, CommandKind::Proc(_)))
        .map(|(name, _)| Rc::clone(name))
        .collect();
    Ok(filtered(names.iter().map(|name| &**name), argv.get(2)))
}

fn script(interp: &mut Interp, _argv: &[Obj]) -> EvalResult {
    Ok(interp
        .script_file
        .as_deref()
        .map_or_else(Obj::empty, Obj::from))
}

fn stacktrace(interp: &mut Interp, _argv: &[Obj]) -> EvalResult {
    Ok(interp.last_trace.to_list())
}

fn vars(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let frame = interp.frames.current();
    let names = interp.visible_vars();
    let names: Vec<&str> = match frame.kind {
        FrameKind::Proc => names.iter().map(|name| &**name).collect(),
        FrameKind::Global => names
            .iter()
            .map(|name| &**name)
            .filter(|name| !name.contains("::"))
            .collect(),
        FrameKind::Namespace => {
            let prefix = format!("{}::", frame.namespace);
            names
                .iter()
                .filter_map(|name| name.strip_prefix(prefix.as_str()))
                .filter(|name| !name.contains("::"))
                .collect()
        }
    };
    Ok(filtered(names.into_iter(), argv.get(2)))
}

fn version(_interp: &mut Interp, _argv: &[Obj]) -> EvalResult {
    Ok(Obj::from(env!("CARGO_PKG_VERSION")))
}
