//! `proc` and `rename`.

use std::rc::Rc;

use tern_value::Obj;

use crate::commands::{Command, Proc};
use crate::errors::EvalResult;
use crate::Interp;

use super::{arity, empty, qualifiers, Builtin};

pub(super) const COMMANDS: &[(&str, Builtin)] = &[("proc", proc), ("rename", rename)];

fn proc(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 4, Some(4), "name args body")?;
    let key = interp.qualify_command(argv[1].as_str());
    let namespace = Rc::from(qualifiers(&key));
    let proc = Proc::new(argv[2].clone(), argv[3].clone(), namespace)?;
    tracing::trace!(name = %key, "define proc");
    interp.commands.insert(key, Command::proc(proc));
    empty()
}

fn rename(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 3, Some(3), "oldName newName")?;
    interp.rename_command(argv[1].as_str(), argv[2].as_str())?;
    empty()
}
