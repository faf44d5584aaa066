//! Script errors and non-local control flow.
//!
//! Every evaluation step returns [`EvalResult`]: `Ok` with the result
//! object, or `Err` with a [`Flow`] describing why evaluation stopped early.
//! Only [`Flow::Error`] is a failure; the others are signals that some
//! enclosing construct (a loop, a proc boundary, `catch`, the host) absorbs.
//!
//! # Structured error kinds
//!
//! [`ErrorKind`] says what went wrong in a matchable form. The factory
//! functions below build a [`ScriptError`] from a kind with the message set
//! to the kind's `Display`, so callers never assemble message strings by
//! hand. Script-raised errors (`error msg`) use [`ErrorKind::Custom`].

use std::fmt;
use std::rc::Rc;

use tern_parse::ParseError;
use tern_value::{Obj, ValueError};
use thiserror::Error;

/// Result of evaluating anything.
pub type EvalResult = Result<Obj, Flow>;

/// Completion codes, as named by `return -code` and reported by `catch`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Code {
    Ok = 0,
    Error = 1,
    Return = 2,
    Break = 3,
    Continue = 4,
    Signal = 5,
    Exit = 6,
}

impl Code {
    /// Parse a code name or its number.
    pub fn parse(text: &str) -> Option<Code> {
        Some(match text {
            "ok" | "0" => Code::Ok,
            "error" | "1" => Code::Error,
            "return" | "2" => Code::Return,
            "break" | "3" => Code::Break,
            "continue" | "4" => Code::Continue,
            "signal" | "5" => Code::Signal,
            "exit" | "6" => Code::Exit,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Code::Ok => "ok",
            Code::Error => "error",
            Code::Return => "return",
            Code::Break => "break",
            Code::Continue => "continue",
            Code::Signal => "signal",
            Code::Exit => "exit",
        }
    }

    #[inline]
    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

/// Why evaluation stopped before the end of a script.
#[derive(Clone, Debug)]
pub enum Flow {
    /// A failure, caught only by `catch` or the host.
    Error(Box<ScriptError>),
    /// `return`: absorbed by the proc boundary `level` frames up, where it
    /// completes with `code`.
    Return {
        value: Obj,
        code: Code,
        level: u32,
        error_code: Option<Obj>,
    },
    /// Absorbed by the nearest enclosing loop.
    Break,
    /// Absorbed by the nearest enclosing loop.
    Continue,
    /// An OS signal delivered through the interpreter's signal handle.
    Signal(u32),
    /// Terminate with a status. Not caught by plain `catch`.
    Exit(i32),
}

impl Flow {
    pub fn code(&self) -> Code {
        match self {
            Flow::Error(_) => Code::Error,
            Flow::Return { .. } => Code::Return,
            Flow::Break => Code::Break,
            Flow::Continue => Code::Continue,
            Flow::Signal(_) => Code::Signal,
            Flow::Exit(_) => Code::Exit,
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Flow::Error(_))
    }
}

impl From<ScriptError> for Flow {
    fn from(err: ScriptError) -> Self {
        Flow::Error(Box::new(err))
    }
}

impl From<ValueError> for Flow {
    fn from(err: ValueError) -> Self {
        ScriptError::from(err).into()
    }
}

impl From<ParseError> for Flow {
    fn from(err: ParseError) -> Self {
        ScriptError::from(err).into()
    }
}

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    // Resolution
    UnknownCommand {
        name: String,
    },
    WrongArgs {
        usage: String,
    },
    UnknownSubcommand {
        what: &'static str,
        given: String,
        options: String,
    },
    AmbiguousSubcommand {
        what: &'static str,
        given: String,
        options: String,
    },

    // Variables
    NoSuchVariable {
        op: &'static str,
        name: String,
    },
    NoSuchElement {
        op: &'static str,
        name: String,
    },
    DanglingLink {
        op: &'static str,
        name: String,
    },
    NotAnArray {
        op: &'static str,
        name: String,
    },
    BadLevel {
        level: String,
    },

    // Values and arithmetic
    NotAnInteger {
        text: String,
    },
    NotANumber {
        text: String,
    },
    IntegerOverflow,
    DivideByZero,
    Value(ValueError),
    Syntax(ParseError),

    // Control flow out of place
    BreakOutsideLoop,
    ContinueOutsideLoop,
    Signal {
        number: u32,
    },

    /// Raised by a script (`error`, `return -code error`) or an extension.
    Custom,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCommand { name } => write!(f, "invalid command name \"{name}\""),
            Self::WrongArgs { usage } => write!(f, "wrong # args: should be \"{usage}\""),
            Self::UnknownSubcommand {
                what,
                given,
                options,
            } => write!(f, "bad {what} \"{given}\": must be {options}"),
            Self::AmbiguousSubcommand {
                what,
                given,
                options,
            } => write!(f, "ambiguous {what} \"{given}\": must be {options}"),

            Self::NoSuchVariable { op, name } => {
                write!(f, "can't {op} \"{name}\": no such variable")
            }
            Self::NoSuchElement { op, name } => {
                write!(f, "can't {op} \"{name}\": no such element in array")
            }
            Self::DanglingLink { op, name } => {
                write!(f, "can't {op} \"{name}\": upvar target no longer exists")
            }
            Self::NotAnArray { op, name } => {
                write!(f, "can't {op} \"{name}\": variable isn't array")
            }
            Self::BadLevel { level } => write!(f, "bad level \"{level}\""),

            Self::NotAnInteger { text } => write!(f, "expected integer but got \"{text}\""),
            Self::NotANumber { text } => {
                write!(f, "expected floating-point number but got \"{text}\"")
            }
            Self::IntegerOverflow => write!(f, "integer overflow"),
            Self::DivideByZero => write!(f, "divide by zero"),
            Self::Value(err) => write!(f, "{err}"),
            Self::Syntax(err) => write!(f, "{err}"),

            Self::BreakOutsideLoop => write!(f, "invoked \"break\" outside of a loop"),
            Self::ContinueOutsideLoop => write!(f, "invoked \"continue\" outside of a loop"),
            Self::Signal { number } => write!(f, "caught signal {number}"),

            Self::Custom => Ok(()),
        }
    }
}

/// One level of an error's unwinding path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceFrame {
    /// Proc that was running, empty at the top level.
    pub proc: Rc<str>,
    pub file: Option<Rc<str>>,
    pub line: u32,
}

/// Frames an error passed through, innermost first.
#[derive(Clone, Debug, Default)]
pub struct StackTrace {
    frames: Vec<TraceFrame>,
    truncated: bool,
}

impl StackTrace {
    pub fn frames(&self) -> &[TraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Append a frame unless `max` frames are already held.
    pub fn push(&mut self, frame: TraceFrame, max: usize) {
        if self.frames.len() < max {
            self.frames.push(frame);
        } else {
            self.truncated = true;
        }
    }

    /// Flat `proc file line ...` list, as `info stacktrace` reports it.
    pub fn to_list(&self) -> Obj {
        let mut items = Vec::with_capacity(self.frames.len() * 3);
        for frame in &self.frames {
            items.push(Obj::new_string(&*frame.proc));
            items.push(frame.file.as_deref().map_or_else(Obj::empty, Obj::from));
            items.push(Obj::int(i64::from(frame.line)));
        }
        Obj::list(items)
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "stack backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            let name = if frame.proc.is_empty() {
                "<top>"
            } else {
                &frame.proc
            };
            write!(f, "  {i}: {name} at ")?;
            match &frame.file {
                Some(file) => write!(f, "{file}:{}", frame.line)?,
                None => write!(f, "line {}", frame.line)?,
            }
            writeln!(f)?;
        }
        if self.truncated {
            writeln!(f, "  ...")?;
        }
        Ok(())
    }
}

/// A script-level error: message, kind, and where it has been.
#[derive(Clone, Debug)]
pub struct ScriptError {
    pub kind: ErrorKind,
    pub message: Obj,
    pub trace: StackTrace,
    /// Machine-readable code from `error msg info code` or
    /// `return -errorcode`.
    pub error_code: Option<Obj>,
    /// Starts `::errorInfo` in place of the message (`error msg info`).
    pub info: Option<Obj>,
    /// The frame for the current proc level has been recorded. Cleared when
    /// the error leaves a proc so the caller's call site is recorded next.
    pub(crate) site_recorded: bool,
}

impl ScriptError {
    /// A script-raised error with the given message.
    pub fn new(message: impl Into<Obj>) -> Self {
        Self {
            kind: ErrorKind::Custom,
            message: message.into(),
            trace: StackTrace::default(),
            error_code: None,
            info: None,
            site_recorded: false,
        }
    }

    fn from_kind(kind: ErrorKind) -> Self {
        let message = Obj::new_string(kind.to_string());
        Self {
            kind,
            message,
            trace: StackTrace::default(),
            error_code: None,
            info: None,
            site_recorded: false,
        }
    }

    #[must_use]
    pub fn with_error_code(mut self, code: Obj) -> Self {
        self.error_code = Some(code);
        self
    }

    #[inline]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// `::errorCode`: the error code, or `NONE`.
    pub fn error_code_obj(&self) -> Obj {
        self.error_code
            .clone()
            .unwrap_or_else(|| Obj::new_string("NONE"))
    }

    /// `::errorInfo`: the message (or the info text given to `error`)
    /// followed by the trace.
    pub fn error_info(&self) -> String {
        let head = self.info.as_ref().unwrap_or(&self.message).as_str();
        if self.trace.is_empty() {
            head.to_string()
        } else {
            format!("{head}\n{}", self.trace)
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ScriptError {}

impl From<ValueError> for ScriptError {
    fn from(err: ValueError) -> Self {
        let kind = match err {
            ValueError::NotAnInteger(text) => ErrorKind::NotAnInteger { text },
            ValueError::NotANumber(text) | ValueError::NanRejected(text) => {
                ErrorKind::NotANumber { text }
            }
            other => ErrorKind::Value(other),
        };
        Self::from_kind(kind)
    }
}

impl From<ParseError> for ScriptError {
    fn from(err: ParseError) -> Self {
        Self::from_kind(ErrorKind::Syntax(err))
    }
}

/// What the host sees when a top-level evaluation does not complete.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("{0}")]
    Script(Box<ScriptError>),
    #[error("exit {0}")]
    Exit(i32),
}

impl EvalError {
    pub fn as_script(&self) -> Option<&ScriptError> {
        match self {
            EvalError::Script(err) => Some(err),
            EvalError::Exit(_) => None,
        }
    }
}

/// "a", "a or b", "a, b, or c".
pub fn one_of<S: AsRef<str>>(names: &[S]) -> String {
    match names {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [a, b] => format!("{} or {}", a.as_ref(), b.as_ref()),
        [init @ .., last] => {
            let mut out = String::new();
            for name in init {
                out.push_str(name.as_ref());
                out.push_str(", ");
            }
            out.push_str("or ");
            out.push_str(last.as_ref());
            out
        }
    }
}

// Resolution Errors

#[cold]
pub fn unknown_command(name: &str) -> ScriptError {
    ScriptError::from_kind(ErrorKind::UnknownCommand {
        name: name.to_string(),
    })
}

/// `usage` is the command name followed by its argument synopsis.
#[cold]
pub fn wrong_num_args(usage: impl Into<String>) -> ScriptError {
    ScriptError::from_kind(ErrorKind::WrongArgs {
        usage: usage.into(),
    })
}

/// Wrong argument count reported against the words actually given, in the
/// `"cmd arg ?opt?"` form.
#[cold]
pub fn wrong_num_args_for(argv: &[Obj], synopsis: &str) -> ScriptError {
    let mut usage = argv.first().map_or_else(String::new, |o| o.as_str().to_string());
    if !synopsis.is_empty() {
        usage.push(' ');
        usage.push_str(synopsis);
    }
    wrong_num_args(usage)
}

#[cold]
pub fn bad_subcommand(what: &'static str, given: &str, options: &[&str]) -> ScriptError {
    ScriptError::from_kind(ErrorKind::UnknownSubcommand {
        what,
        given: given.to_string(),
        options: one_of(options),
    })
}

#[cold]
pub fn ambiguous_subcommand(what: &'static str, given: &str, options: &[&str]) -> ScriptError {
    ScriptError::from_kind(ErrorKind::AmbiguousSubcommand {
        what,
        given: given.to_string(),
        options: one_of(options),
    })
}

// Variable Errors

#[cold]
pub fn no_such_variable(op: &'static str, name: &str) -> ScriptError {
    ScriptError::from_kind(ErrorKind::NoSuchVariable {
        op,
        name: name.to_string(),
    })
}

#[cold]
pub fn no_such_element(op: &'static str, name: &str) -> ScriptError {
    ScriptError::from_kind(ErrorKind::NoSuchElement {
        op,
        name: name.to_string(),
    })
}

#[cold]
pub fn dangling_link(op: &'static str, name: &str) -> ScriptError {
    ScriptError::from_kind(ErrorKind::DanglingLink {
        op,
        name: name.to_string(),
    })
}

#[cold]
pub fn not_an_array(op: &'static str, name: &str) -> ScriptError {
    ScriptError::from_kind(ErrorKind::NotAnArray {
        op,
        name: name.to_string(),
    })
}

#[cold]
pub fn bad_level(level: &str) -> ScriptError {
    ScriptError::from_kind(ErrorKind::BadLevel {
        level: level.to_string(),
    })
}

// Arithmetic Errors

#[cold]
pub fn divide_by_zero() -> ScriptError {
    ScriptError::from_kind(ErrorKind::DivideByZero).with_error_code(Obj::list(vec![
        Obj::new_string("ARITH"),
        Obj::new_string("DIVZERO"),
        Obj::new_string("divide by zero"),
    ]))
}

#[cold]
pub fn integer_overflow() -> ScriptError {
    ScriptError::from_kind(ErrorKind::IntegerOverflow)
}

#[cold]
pub fn not_an_integer(text: &str) -> ScriptError {
    ScriptError::from_kind(ErrorKind::NotAnInteger {
        text: text.to_string(),
    })
}

// Control Flow Errors

/// A loop signal that reached a boundary it may not cross.
#[cold]
pub fn outside_loop(flow: &Flow) -> ScriptError {
    match flow {
        Flow::Continue => ScriptError::from_kind(ErrorKind::ContinueOutsideLoop),
        _ => ScriptError::from_kind(ErrorKind::BreakOutsideLoop),
    }
}

#[cold]
pub fn uncaught_signal(number: u32) -> ScriptError {
    ScriptError::from_kind(ErrorKind::Signal { number }).with_error_code(Obj::list(vec![
        Obj::new_string("SIGNAL"),
        Obj::int(i64::from(number)),
    ]))
}

#[cfg(test)]
mod tests;
