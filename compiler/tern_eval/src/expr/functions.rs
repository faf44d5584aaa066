//! Math functions callable as `name(arg, ...)` inside expressions.

use tern_value::{Number, Obj};

use crate::errors::{integer_overflow, ScriptError};
use crate::Interp;

use super::eval::{domain_checked, number_operand};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MathFn {
    Abs,
    Int,
    Wide,
    Double,
    Round,
    Bool,
    Min,
    Max,
    Pow,
    Sqrt,
    Exp,
    Log,
    Log10,
    Sin,
    Cos,
    Tan,
    Floor,
    Ceil,
    Fmod,
    Rand,
    Srand,
}

const ALL: [MathFn; 21] = [
    MathFn::Abs,
    MathFn::Int,
    MathFn::Wide,
    MathFn::Double,
    MathFn::Round,
    MathFn::Bool,
    MathFn::Min,
    MathFn::Max,
    MathFn::Pow,
    MathFn::Sqrt,
    MathFn::Exp,
    MathFn::Log,
    MathFn::Log10,
    MathFn::Sin,
    MathFn::Cos,
    MathFn::Tan,
    MathFn::Floor,
    MathFn::Ceil,
    MathFn::Fmod,
    MathFn::Rand,
    MathFn::Srand,
];

impl MathFn {
    pub fn lookup(name: &str) -> Option<MathFn> {
        ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            MathFn::Abs => "abs",
            MathFn::Int => "int",
            MathFn::Wide => "wide",
            MathFn::Double => "double",
            MathFn::Round => "round",
            MathFn::Bool => "bool",
            MathFn::Min => "min",
            MathFn::Max => "max",
            MathFn::Pow => "pow",
            MathFn::Sqrt => "sqrt",
            MathFn::Exp => "exp",
            MathFn::Log => "log",
            MathFn::Log10 => "log10",
            MathFn::Sin => "sin",
            MathFn::Cos => "cos",
            MathFn::Tan => "tan",
            MathFn::Floor => "floor",
            MathFn::Ceil => "ceil",
            MathFn::Fmod => "fmod",
            MathFn::Rand => "rand",
            MathFn::Srand => "srand",
        }
    }

    /// Accepted argument counts; `None` for no upper bound.
    fn arity(self) -> (usize, Option<usize>) {
        match self {
            MathFn::Rand => (0, Some(0)),
            MathFn::Pow | MathFn::Fmod => (2, Some(2)),
            MathFn::Min | MathFn::Max => (1, None),
            _ => (1, Some(1)),
        }
    }

    pub fn check_arity(self, given: usize) -> Result<(), ScriptError> {
        let (min, max) = self.arity();
        if given < min {
            return Err(ScriptError::new(format!(
                "too few arguments for math function \"{}\"",
                self.name()
            )));
        }
        if max.is_some_and(|max| given > max) {
            return Err(ScriptError::new(format!(
                "too many arguments for math function \"{}\"",
                self.name()
            )));
        }
        Ok(())
    }
}

/// Truncate a double toward zero into the integer range.
fn to_int(value: f64) -> Result<i64, ScriptError> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    if value.is_finite() && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Ok(value.trunc() as i64)
    } else {
        Err(integer_overflow())
    }
}

fn unary_double(args: &[Obj], func: MathFn, f: fn(f64) -> f64) -> Result<Obj, ScriptError> {
    let x = number_operand(&args[0], func.name())?.as_f64();
    domain_checked(f(x))
}

impl Interp {
    /// xorshift64* step over the interpreter's generator state.
    fn next_random(&mut self) -> f64 {
        let mut x = self.rand_state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.rand_state = x;
        let bits = x.wrapping_mul(0x2545_f491_4f6c_dd1d) >> 11;
        bits as f64 / (1_u64 << 53) as f64
    }

    pub(crate) fn call_math(&mut self, func: MathFn, args: &[Obj]) -> Result<Obj, ScriptError> {
        let name = func.name();
        match func {
            MathFn::Abs => match number_operand(&args[0], name)? {
                Number::Int(i) => i.checked_abs().map(Obj::int).ok_or_else(integer_overflow),
                Number::Double(d) => Ok(Obj::double(d.abs())),
            },
            MathFn::Int | MathFn::Wide => match number_operand(&args[0], name)? {
                Number::Int(i) => Ok(Obj::int(i)),
                Number::Double(d) => to_int(d).map(Obj::int),
            },
            MathFn::Double => Ok(Obj::double(number_operand(&args[0], name)?.as_f64())),
            MathFn::Round => match number_operand(&args[0], name)? {
                Number::Int(i) => Ok(Obj::int(i)),
                Number::Double(d) => to_int(d.round()).map(Obj::int),
            },
            MathFn::Bool => Ok(Obj::bool(args[0].get_bool()?)),
            MathFn::Min | MathFn::Max => {
                let mut best = &args[0];
                let mut best_value = number_operand(best, name)?;
                for arg in &args[1..] {
                    let value = number_operand(arg, name)?;
                    let better = match (value, best_value) {
                        (Number::Int(a), Number::Int(b)) if func == MathFn::Min => a < b,
                        (Number::Int(a), Number::Int(b)) => a > b,
                        (a, b) if func == MathFn::Min => a.as_f64() < b.as_f64(),
                        (a, b) => a.as_f64() > b.as_f64(),
                    };
                    if better {
                        best = arg;
                        best_value = value;
                    }
                }
                Ok(best.clone())
            }
            MathFn::Pow => {
                let x = number_operand(&args[0], name)?.as_f64();
                let y = number_operand(&args[1], name)?.as_f64();
                domain_checked(x.powf(y))
            }
            MathFn::Fmod => {
                let x = number_operand(&args[0], name)?.as_f64();
                let y = number_operand(&args[1], name)?.as_f64();
                domain_checked(x % y)
            }
            MathFn::Sqrt => unary_double(args, func, f64::sqrt),
            MathFn::Exp => unary_double(args, func, f64::exp),
            MathFn::Log => unary_double(args, func, f64::ln),
            MathFn::Log10 => unary_double(args, func, f64::log10),
            MathFn::Sin => unary_double(args, func, f64::sin),
            MathFn::Cos => unary_double(args, func, f64::cos),
            MathFn::Tan => unary_double(args, func, f64::tan),
            MathFn::Floor => unary_double(args, func, f64::floor),
            MathFn::Ceil => unary_double(args, func, f64::ceil),
            MathFn::Rand => Ok(Obj::double(self.next_random())),
            MathFn::Srand => {
                let seed = args[0].get_int()?;
                // Zero is a fixed point of xorshift.
                self.rand_state = (seed as u64) ^ 0x9e37_79b9_7f4a_7c15;
                if self.rand_state == 0 {
                    self.rand_state = 1;
                }
                Ok(Obj::double(self.next_random()))
            }
        }
    }
}
