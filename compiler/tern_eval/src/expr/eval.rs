//! Expression evaluation.
//!
//! Integer arithmetic is checked: overflow is an error, never a wrap.
//! Division and modulo round toward negative infinity, so `a % b` has the
//! sign of `b`. Mixing an integer with a double gives a double.

use std::cmp::Ordering;

use tern_value::{Number, Obj, ValueError};

use crate::errors::{divide_by_zero, integer_overflow, EvalResult, Flow, ScriptError};
use crate::Interp;

use super::ast::{BinaryOp, Expr, UnaryOp};

/// The numeric value of an operand of `op`.
pub(crate) fn number_operand(value: &Obj, op: &str) -> Result<Number, ScriptError> {
    value.get_number().map_err(|err| match err {
        ValueError::IntegerTooLarge(_) => ScriptError::from(err),
        _ if value.is_empty_string() => {
            ScriptError::new(format!("can't use empty string as operand of \"{op}\""))
        }
        _ => ScriptError::new(format!(
            "can't use non-numeric string \"{value}\" as operand of \"{op}\""
        )),
    })
}

fn int_operand(value: &Obj, op: &str) -> Result<i64, ScriptError> {
    match number_operand(value, op)? {
        Number::Int(i) => Ok(i),
        Number::Double(_) => Err(ScriptError::new(format!(
            "can't use floating-point value as operand of \"{op}\""
        ))),
    }
}

/// A double result, refusing NaN.
pub(crate) fn domain_checked(value: f64) -> Result<Obj, ScriptError> {
    if value.is_nan() {
        Err(ScriptError::new("domain error: argument not in valid range")
            .with_error_code(Obj::list(vec![
                Obj::new_string("ARITH"),
                Obj::new_string("DOMAIN"),
            ])))
    } else {
        Ok(Obj::double(value))
    }
}

fn checked(result: Option<i64>) -> Result<Obj, ScriptError> {
    result.map(Obj::int).ok_or_else(integer_overflow)
}

/// `a / b` rounded toward negative infinity.
pub fn floor_div(a: i64, b: i64) -> Result<i64, ScriptError> {
    if b == 0 {
        return Err(divide_by_zero());
    }
    let q = a.checked_div(b).ok_or_else(integer_overflow)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

/// `a % b` with the sign of `b`.
pub fn floor_mod(a: i64, b: i64) -> Result<i64, ScriptError> {
    if b == 0 {
        return Err(divide_by_zero());
    }
    // i64::MIN % -1 overflows in the hardware sense but is 0.
    let r = a.checked_rem(b).unwrap_or(0);
    if r != 0 && ((r < 0) != (b < 0)) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

fn int_pow(base: i64, exp: i64) -> Result<Obj, ScriptError> {
    if exp < 0 {
        return match base {
            0 => Err(ScriptError::new(
                "exponentiation of zero by negative power",
            )),
            1 => Ok(Obj::int(1)),
            -1 => Ok(Obj::int(if exp % 2 == 0 { 1 } else { -1 })),
            _ => Ok(Obj::int(0)),
        };
    }
    match base {
        0 | 1 => Ok(Obj::int(if exp == 0 { 1 } else { base })),
        -1 => Ok(Obj::int(if exp % 2 == 0 { 1 } else { -1 })),
        _ => {
            let exp = u32::try_from(exp).map_err(|_| integer_overflow())?;
            checked(base.checked_pow(exp))
        }
    }
}

fn shift(a: i64, b: i64, left: bool) -> Result<Obj, ScriptError> {
    if b < 0 {
        return Err(ScriptError::new("negative shift argument"));
    }
    if left {
        if a == 0 {
            return Ok(Obj::int(0));
        }
        let shifted = u32::try_from(b)
            .ok()
            .filter(|&b| b < 64)
            .map(|b| a << b)
            .filter(|&r| r >> b == a);
        checked(shifted)
    } else if b >= 64 {
        Ok(Obj::int(if a < 0 { -1 } else { 0 }))
    } else {
        Ok(Obj::int(a >> b))
    }
}

fn arith(op: BinaryOp, a: Number, b: Number) -> Result<Obj, ScriptError> {
    if let (Number::Int(a), Number::Int(b)) = (a, b) {
        return match op {
            BinaryOp::Add => checked(a.checked_add(b)),
            BinaryOp::Sub => checked(a.checked_sub(b)),
            BinaryOp::Mul => checked(a.checked_mul(b)),
            BinaryOp::Div => floor_div(a, b).map(Obj::int),
            BinaryOp::Pow => int_pow(a, b),
            _ => Err(ScriptError::new(format!("bad operator {}", op.symbol()))),
        };
    }
    let (a, b) = (a.as_f64(), b.as_f64());
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div if b == 0.0 => return Err(divide_by_zero()),
        BinaryOp::Div => a / b,
        BinaryOp::Pow => a.powf(b),
        _ => return Err(ScriptError::new(format!("bad operator {}", op.symbol()))),
    };
    domain_checked(value)
}

/// Numeric comparison when both sides are numbers, string comparison
/// otherwise.
fn compare(a: &Obj, b: &Obj) -> Ordering {
    match (a.get_number(), b.get_number()) {
        (Ok(Number::Int(x)), Ok(Number::Int(y))) => x.cmp(&y),
        (Ok(x), Ok(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => a.as_str().cmp(b.as_str()),
    }
}

fn binary(op: BinaryOp, a: &Obj, b: &Obj) -> Result<Obj, ScriptError> {
    let sym = op.symbol();
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Pow => {
            arith(op, number_operand(a, sym)?, number_operand(b, sym)?)
        }
        BinaryOp::Mod => floor_mod(int_operand(a, sym)?, int_operand(b, sym)?).map(Obj::int),
        BinaryOp::Shl | BinaryOp::Shr => {
            shift(int_operand(a, sym)?, int_operand(b, sym)?, op == BinaryOp::Shl)
        }
        BinaryOp::BitAnd => Ok(Obj::int(int_operand(a, sym)? & int_operand(b, sym)?)),
        BinaryOp::BitXor => Ok(Obj::int(int_operand(a, sym)? ^ int_operand(b, sym)?)),
        BinaryOp::BitOr => Ok(Obj::int(int_operand(a, sym)? | int_operand(b, sym)?)),
        BinaryOp::Lt => Ok(Obj::bool(compare(a, b) == Ordering::Less)),
        BinaryOp::Gt => Ok(Obj::bool(compare(a, b) == Ordering::Greater)),
        BinaryOp::LtEq => Ok(Obj::bool(compare(a, b) != Ordering::Greater)),
        BinaryOp::GtEq => Ok(Obj::bool(compare(a, b) != Ordering::Less)),
        BinaryOp::Eq => Ok(Obj::bool(compare(a, b) == Ordering::Equal)),
        BinaryOp::NotEq => Ok(Obj::bool(compare(a, b) != Ordering::Equal)),
        BinaryOp::StrEq => Ok(Obj::bool(a.as_str() == b.as_str())),
        BinaryOp::StrNe => Ok(Obj::bool(a.as_str() != b.as_str())),
        BinaryOp::In | BinaryOp::Ni => {
            let found = b.get_list()?.iter().any(|item| item.as_str() == a.as_str());
            Ok(Obj::bool(found == (op == BinaryOp::In)))
        }
        BinaryOp::And | BinaryOp::Or => Ok(Obj::bool(if op == BinaryOp::And {
            a.get_bool()? && b.get_bool()?
        } else {
            a.get_bool()? || b.get_bool()?
        })),
    }
}

fn unary(op: UnaryOp, value: &Obj) -> Result<Obj, ScriptError> {
    let sym = op.symbol();
    match op {
        UnaryOp::Neg => match number_operand(value, sym)? {
            Number::Int(i) => checked(i.checked_neg()),
            Number::Double(d) => Ok(Obj::double(-d)),
        },
        UnaryOp::Plus => match number_operand(value, sym)? {
            Number::Int(i) => Ok(Obj::int(i)),
            Number::Double(d) => Ok(Obj::double(d)),
        },
        UnaryOp::Not => Ok(Obj::bool(!value.get_bool()?)),
        UnaryOp::BitNot => Ok(Obj::int(!int_operand(value, sym)?)),
    }
}

impl Interp {
    pub(crate) fn eval_expr_tree(&mut self, expr: &Expr) -> EvalResult {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Word(word) => self.substitute_word(word),
            Expr::Unary(op, operand) => {
                let value = self.eval_expr_tree(operand)?;
                Ok(unary(*op, &value)?)
            }
            Expr::Binary(BinaryOp::And, lhs, rhs) => {
                if !self.expr_truth(lhs)? {
                    return Ok(Obj::bool(false));
                }
                Ok(Obj::bool(self.expr_truth(rhs)?))
            }
            Expr::Binary(BinaryOp::Or, lhs, rhs) => {
                if self.expr_truth(lhs)? {
                    return Ok(Obj::bool(true));
                }
                Ok(Obj::bool(self.expr_truth(rhs)?))
            }
            Expr::Binary(op, lhs, rhs) => tern_stack::ensure_sufficient_stack(|| {
                let a = self.eval_expr_tree(lhs)?;
                let b = self.eval_expr_tree(rhs)?;
                Ok(binary(*op, &a, &b)?)
            }),
            Expr::Ternary(cond, then, otherwise) => {
                if self.expr_truth(cond)? {
                    self.eval_expr_tree(then)
                } else {
                    self.eval_expr_tree(otherwise)
                }
            }
            Expr::Call(func, args) => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr_tree(arg)?);
                }
                Ok(self.call_math(*func, &values)?)
            }
        }
    }

    fn expr_truth(&mut self, expr: &Expr) -> Result<bool, Flow> {
        let value = self.eval_expr_tree(expr)?;
        Ok(value.get_bool()?)
    }
}
