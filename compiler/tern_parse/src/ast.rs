//! Parsed script structure.
//!
//! A [`Script`] is a list of commands; a command is a list of words; a word
//! is classified once at parse time into one of three shapes so the
//! evaluator never has to rediscover it:
//!
//! - [`WordKind::Literal`]: no substitutions. The text is final.
//! - [`WordKind::Single`]: exactly one `$var` or `[script]` and nothing
//!   else. The substituted object is forwarded as is, keeping its native
//!   rep (a list stays a list).
//! - [`WordKind::Multi`]: several parts whose string forms are concatenated.
//!
//! Empty literal segments are never recorded, so `[cmd]` with nothing
//! around it is always `Single`.

use std::rc::Rc;

use tern_value::Obj;

/// A sequence of commands, as parsed from one piece of text.
#[derive(Debug, Default)]
pub struct Script {
    pub commands: Vec<Command>,
    pub file: Option<Rc<str>>,
}

impl Script {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[derive(Debug)]
pub struct Command {
    pub words: Vec<Word>,
    /// Line of the first word.
    pub line: u32,
}

impl Command {
    /// Whether any word uses `{*}` and the argument count is only known
    /// after substitution.
    pub fn has_expansion(&self) -> bool {
        self.words.iter().any(|w| w.expand)
    }
}

#[derive(Debug)]
pub struct Word {
    pub kind: WordKind,
    /// Prefixed by `{*}`: the value is split as a list into several
    /// arguments.
    pub expand: bool,
    pub line: u32,
}

#[derive(Debug)]
pub enum WordKind {
    Literal(Obj),
    Single(Part),
    Multi(Vec<Part>),
}

impl WordKind {
    /// Classify a part sequence.
    pub fn from_parts(mut parts: Vec<Part>) -> Self {
        match parts.len() {
            0 => WordKind::Literal(Obj::empty()),
            1 => match parts.pop() {
                Some(Part::Text(text)) => WordKind::Literal(text),
                Some(part) => WordKind::Single(part),
                None => WordKind::Literal(Obj::empty()),
            },
            _ => WordKind::Multi(parts),
        }
    }

    /// The text of a literal word.
    pub fn as_literal(&self) -> Option<&Obj> {
        match self {
            WordKind::Literal(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum Part {
    /// Literal text, backslash sequences already decoded.
    Text(Obj),
    Var(VarRef),
    /// A bracketed script, parsed along with the enclosing one.
    Script(Rc<Script>),
}

/// `$name`, `${name}` or `$name(index)`.
#[derive(Debug)]
pub struct VarRef {
    pub name: Obj,
    /// Array element index, itself subject to substitution.
    pub index: Option<Box<WordKind>>,
}
