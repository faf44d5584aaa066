//! Syntax errors.

use thiserror::Error;

/// A syntax error, tagged with the line where the offending construct
/// started.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing close-brace")]
    MissingCloseBrace { line: u32 },

    #[error("missing close-brace for variable name")]
    MissingCloseBraceVar { line: u32 },

    #[error("missing close-bracket")]
    MissingCloseBracket { line: u32 },

    #[error("missing quote")]
    MissingCloseQuote { line: u32 },

    #[error("missing )")]
    MissingCloseParen { line: u32 },

    #[error("extra characters after close-brace")]
    ExtraCharsAfterBrace { line: u32 },

    #[error("extra characters after close-quote")]
    ExtraCharsAfterQuote { line: u32 },
}

impl ParseError {
    pub fn line(&self) -> u32 {
        match *self {
            ParseError::MissingCloseBrace { line }
            | ParseError::MissingCloseBraceVar { line }
            | ParseError::MissingCloseBracket { line }
            | ParseError::MissingCloseQuote { line }
            | ParseError::MissingCloseParen { line }
            | ParseError::ExtraCharsAfterBrace { line }
            | ParseError::ExtraCharsAfterQuote { line } => line,
        }
    }

    /// The text ended inside an open construct; more input could fix it.
    pub fn is_incomplete(&self) -> bool {
        !matches!(
            self,
            ParseError::ExtraCharsAfterBrace { .. } | ParseError::ExtraCharsAfterQuote { .. }
        )
    }
}
