//! The `namespace` ensemble.
//!
//! Namespaces are name prefixes only: a namespace exists while something
//! is defined under it, and its variables live in the global table under
//! `ns::name` keys.

use std::rc::Rc;

use tern_value::Obj;

use crate::errors::EvalResult;
use crate::interp::{Frame, FrameKind};
use crate::subcmd::{dispatch, SubCommand};
use crate::Interp;

use super::{concat, qualifiers, tail, Builtin};

pub(super) const COMMANDS: &[(&str, Builtin)] = &[("namespace", namespace)];

static SUBCOMMANDS: &[SubCommand] = &[
    SubCommand::new("current", "", 0, Some(0), current),
    SubCommand::new("eval", "name arg ?arg ...?", 2, None, eval),
    SubCommand::new("qualifiers", "string", 1, Some(1), qualifiers_cmd),
    SubCommand::new("tail", "string", 1, Some(1), tail_cmd),
];

fn namespace(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    dispatch(interp, SUBCOMMANDS, argv)
}

fn current(interp: &mut Interp, _argv: &[Obj]) -> EvalResult {
    Ok(Obj::new_string(format!(
        "::{}",
        interp.frames.current().namespace
    )))
}

/// Namespace `name` resolved against the active one, without the leading
/// `::`.
fn resolve_namespace(interp: &Interp, name: &str) -> Rc<str> {
    if let Some(absolute) = name.strip_prefix("::") {
        return Rc::from(absolute.trim_matches(':'));
    }
    let active = &interp.frames.current().namespace;
    let name = name.trim_end_matches(':');
    if active.is_empty() {
        Rc::from(name)
    } else {
        Rc::from(format!("{active}::{name}"))
    }
}

fn eval(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let namespace = resolve_namespace(interp, argv[2].as_str());
    let script = concat(&argv[3..]);
    let frame = Frame::new(
        FrameKind::Namespace,
        interp.globals.clone(),
        namespace,
        Rc::clone(&interp.frames.current().proc_name),
        argv.to_vec(),
    );
    interp.with_frame(frame, |interp| interp.eval_obj(&script))
}

fn qualifiers_cmd(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    Ok(Obj::from(qualifiers(argv[2].as_str())))
}

fn tail_cmd(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    Ok(Obj::from(tail(argv[2].as_str())))
}
