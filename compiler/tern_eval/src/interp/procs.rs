//! Procedure calls and `return` handling.
//!
//! A call binds the arguments into a fresh variable table, pushes a frame
//! for it and evaluates the body. On the way out:
//!
//! - `return` is absorbed here once its `-level` has counted down to one,
//!   and the proc completes with the `-code` it carried;
//! - an error leaves with its "site recorded" mark cleared, so the caller's
//!   call site is added to the trace next;
//! - `break` and `continue` pass through untouched: only loops absorb them.

use std::rc::Rc;

use tern_value::Obj;

use crate::commands::Proc;
use crate::environment::{LocalScope, VarTable};
use crate::errors::{wrong_num_args, Code, EvalResult, Flow, ScriptError};

use super::frames::{Frame, FrameKind};
use super::Interp;

impl Interp {
    #[tracing::instrument(level = "trace", skip_all, fields(proc = %argv[0]))]
    pub(crate) fn call_proc(&mut self, proc: &Proc, argv: &[Obj]) -> EvalResult {
        let vars = bind_args(proc, argv)?;
        let frame = Frame::new(
            FrameKind::Proc,
            LocalScope::new(vars),
            Rc::clone(&proc.namespace),
            Rc::from(argv[0].as_str()),
            argv.to_vec(),
        );
        let result = self.with_frame(frame, |interp| interp.eval_obj(&proc.body));
        absorb_return(result)
    }
}

/// Bind `argv[1..]` to the parameters of `proc`.
fn bind_args(proc: &Proc, argv: &[Obj]) -> Result<VarTable, ScriptError> {
    let args = &argv[1..];
    let fixed = proc.fixed_params();
    if args.len() > fixed.len() && !proc.variadic {
        return Err(wrong_num_args(proc.usage(argv[0].as_str())));
    }
    let mut vars = VarTable::new();
    for (i, param) in fixed.iter().enumerate() {
        let value = match (args.get(i), &param.default) {
            (Some(value), _) => value.clone(),
            (None, Some(default)) => default.clone(),
            (None, None) => return Err(wrong_num_args(proc.usage(argv[0].as_str()))),
        };
        vars.set(Rc::clone(&param.name), value);
    }
    if proc.variadic {
        let rest = args.get(fixed.len()..).unwrap_or_default();
        vars.set(Rc::from("args"), Obj::list(rest.to_vec()));
    }
    Ok(vars)
}

/// Completion of a proc body (or sourced file, or `apply`): a `return`
/// aimed at this boundary takes effect, one aimed further out loses a level.
pub(crate) fn absorb_return(result: EvalResult) -> EvalResult {
    match result {
        Err(Flow::Return {
            value,
            code,
            level,
            error_code,
        }) => {
            if level > 1 {
                Err(Flow::Return {
                    value,
                    code,
                    level: level - 1,
                    error_code,
                })
            } else {
                apply_return_code(value, code, error_code)
            }
        }
        Err(Flow::Error(mut err)) => {
            err.site_recorded = false;
            Err(Flow::Error(err))
        }
        other => other,
    }
}

/// Complete with `code` where a `return` has reached its target level.
pub(crate) fn apply_return_code(value: Obj, code: Code, error_code: Option<Obj>) -> EvalResult {
    match code {
        Code::Ok => Ok(value),
        Code::Error => {
            let mut err = ScriptError::new(value);
            err.error_code = error_code;
            Err(err.into())
        }
        Code::Return => Err(Flow::Return {
            value,
            code: Code::Ok,
            level: 1,
            error_code,
        }),
        Code::Break => Err(Flow::Break),
        Code::Continue => Err(Flow::Continue),
        Code::Signal => Err(Flow::Signal(value.get_int().unwrap_or(0) as u32)),
        Code::Exit => Err(Flow::Exit(value.get_int().unwrap_or(0) as i32)),
    }
}
