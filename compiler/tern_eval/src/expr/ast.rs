//! Expression trees.

use tern_parse::WordKind;
use tern_value::Obj;

use super::functions::MathFn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Pow,
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Eq,
    NotEq,
    StrEq,
    StrNe,
    In,
    Ni,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,
}

impl BinaryOp {
    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::BitOr => 3,
            BinaryOp::BitXor => 4,
            BinaryOp::BitAnd => 5,
            BinaryOp::In | BinaryOp::Ni => 6,
            BinaryOp::StrEq | BinaryOp::StrNe => 7,
            BinaryOp::Eq | BinaryOp::NotEq => 8,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq => 9,
            BinaryOp::Shl | BinaryOp::Shr => 10,
            BinaryOp::Add | BinaryOp::Sub => 11,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 12,
            BinaryOp::Pow => 13,
        }
    }

    #[inline]
    pub fn is_right_assoc(self) -> bool {
        self == BinaryOp::Pow
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Pow => "**",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrEq => "eq",
            BinaryOp::StrNe => "ne",
            BinaryOp::In => "in",
            BinaryOp::Ni => "ni",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// A parsed expression.
#[derive(Debug)]
pub enum Expr {
    /// A number, a braced string or a boolean word.
    Literal(Obj),
    /// `$var`, `[script]` or a quoted string with substitutions.
    Word(WordKind),
    Unary(UnaryOp, Box<Expr>),
    /// `&&` and `||` are binary nodes too; evaluation short-circuits them.
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// `cond ? then : else`, evaluating only the chosen branch.
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
    Call(MathFn, Vec<Expr>),
}
