//! Conversion and representation errors raised by the object layer.
//!
//! The evaluator turns these into script errors at its boundary; they are
//! kept separate so the object layer has no dependency on the evaluator.

use thiserror::Error;

/// A failed conversion between the string form and a native form.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("expected integer but got \"{0}\"")]
    NotAnInteger(String),

    /// Digits were well formed but the magnitude does not fit a wide integer.
    #[error("integer value too large to represent: \"{0}\"")]
    IntegerTooLarge(String),

    #[error("expected floating-point number but got \"{0}\"")]
    NotANumber(String),

    /// `NaN` is never accepted as input, in any spelling.
    #[error("floating-point value is not a number: \"{0}\"")]
    NanRejected(String),

    #[error("expected boolean value but got \"{0}\"")]
    NotABoolean(String),

    #[error("unmatched open brace in list")]
    UnmatchedBrace,

    #[error("unmatched open quote in list")]
    UnmatchedQuote,

    #[error("list element in {kind} followed by \"{rest}\" instead of space")]
    ListElementFollowedBy { kind: &'static str, rest: String },

    #[error("missing value to go with key")]
    MissingDictValue,

    #[error("bad index \"{0}\": must be integer?[+-]integer? or end?[+-]integer?")]
    BadIndex(String),
}

impl ValueError {
    /// True for both integer failures: malformed digits and overflow.
    ///
    /// Callers that fall back to a floating-point reading (`expr`) use this
    /// to decide whether a fallback is worth trying.
    pub fn is_integer_failure(&self) -> bool {
        matches!(self, Self::NotAnInteger(_) | Self::IntegerTooLarge(_))
    }
}
