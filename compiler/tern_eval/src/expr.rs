//! The expression language used by `expr`, `if`, `while` and `for`.
//!
//! An expression object is parsed once; the tree is cached on the object
//! as a native rep, so a loop condition is not re-parsed per iteration.

mod ast;
mod eval;
mod functions;
mod parser;

use std::rc::Rc;

use tern_value::{Obj, ObjType};

use crate::errors::{EvalResult, Flow, ScriptError};
use crate::Interp;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use eval::{floor_div, floor_mod};
pub use functions::MathFn;
pub use parser::parse_expr;

/// Native rep kind of a parsed expression.
pub static EXPR_TYPE: ObjType = ObjType::cache("expr");

/// The parsed form of `obj`, from its cache or freshly parsed.
pub fn expr_of(obj: &Obj) -> Result<Rc<Expr>, ScriptError> {
    if let Some(expr) = obj.ext_as::<Expr>(&EXPR_TYPE) {
        return Ok(expr);
    }
    let expr = Rc::new(parse_expr(obj.as_str())?);
    obj.set_ext_rep(&EXPR_TYPE, expr.clone());
    Ok(expr)
}

impl Interp {
    /// Evaluate an expression in the active frame.
    pub fn eval_expr(&mut self, expr: &Obj) -> EvalResult {
        let tree = expr_of(expr)?;
        self.eval_expr_tree(&tree)
    }

    /// Evaluate an expression as a condition.
    pub fn eval_condition(&mut self, expr: &Obj) -> Result<bool, Flow> {
        let value = self.eval_expr(expr)?;
        Ok(value.get_bool()?)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
