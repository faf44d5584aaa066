//! Tern parser: turns script text into commands, words and parts.
//!
//! The first run of a script pulls commands one at a time from a
//! [`script_parser`], so commands before a syntax error still run. Once the
//! whole text has been read, the parsed form is cached on the object itself
//! as a native rep ([`cache_script`]), and later runs of the same proc or
//! loop body skip the parser for as long as its text does not change.

mod ast;
mod error;
mod parser;

use std::rc::Rc;

use tern_value::{Obj, ObjType};

pub use ast::{Command, Part, Script, VarRef, Word, WordKind};
pub use error::ParseError;
pub use parser::{is_complete, parse_script, parse_subst, Parser, Subst};

/// Native rep kind of a parsed script.
pub static SCRIPT_TYPE: ObjType = ObjType::cache("script");

/// The cached parse of `obj`, if it has one.
pub fn cached_script(obj: &Obj) -> Option<Rc<Script>> {
    obj.ext_as::<Script>(&SCRIPT_TYPE)
}

/// A parser over `obj`'s text.
///
/// Line numbers and the file name come from the object's source annotation
/// when it has one.
pub fn script_parser(obj: &Obj) -> Parser<'_> {
    let (file, line) = obj
        .source()
        .map_or((None, 1), |loc| (Some(loc.file), loc.line));
    Parser::at(obj.as_str(), 0, line).with_file(file)
}

/// Attach a fully parsed `script` to `obj`.
pub fn cache_script(obj: &Obj, script: Script) -> Rc<Script> {
    tracing::trace!(commands = script.commands.len(), "parsed script");
    let script = Rc::new(script);
    obj.set_ext_rep(&SCRIPT_TYPE, script.clone());
    script
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
