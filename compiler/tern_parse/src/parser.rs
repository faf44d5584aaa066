//! Script tokenizer.
//!
//! A hand-written scanner over the script text. Commands are produced one
//! at a time, either through [`Parser::next_command`] or the `Iterator`
//! impl; [`Parser::script`] collects them all.
//!
//! Scanning works on bytes. Every byte with syntactic meaning is ASCII, so
//! text is only ever sliced next to one of them and never inside a
//! multi-byte character.

use std::rc::Rc;

use bitflags::bitflags;
use memchr::{memchr, memchr2, memchr3};
use tern_value::escape::decode_backslash;
use tern_value::{Obj, SourceLoc};

use crate::ast::{Command, Part, Script, VarRef, Word, WordKind};
use crate::ParseError;

bitflags! {
    /// Which substitutions to perform on a part sequence.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Subst: u8 {
        const BACKSLASHES = 1 << 0;
        const VARIABLES = 1 << 1;
        const COMMANDS = 1 << 2;
    }
}

/// What ends a part sequence.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Whitespace or a command separator.
    Bare,
    /// A `"`.
    Quoted,
    /// A `)` closing an array index.
    Index,
    /// Only the end of the text.
    Subst,
}

#[inline]
fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | 0x0b | 0x0c)
}

#[inline]
fn is_var_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Accumulates literal text between substitutions.
#[derive(Default)]
struct PartBuilder {
    parts: Vec<Part>,
    text: String,
}

impl PartBuilder {
    fn text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn push(&mut self, ch: char) {
        self.text.push(ch);
    }

    fn part(&mut self, part: Part) {
        self.flush();
        self.parts.push(part);
    }

    fn flush(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.parts.push(Part::Text(Obj::new_string(text)));
        }
    }

    fn finish(mut self) -> Vec<Part> {
        self.flush();
        self.parts
    }
}

pub struct Parser<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
    /// Inside `[...]`: a `]` ends the current command and script.
    nested: bool,
    file: Option<Rc<str>>,
    failed: bool,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str) -> Self {
        Self::at(src, 0, 1)
    }

    /// A parser starting at byte `pos` of `src`, which is on line `line`.
    pub fn at(src: &'a str, pos: usize, line: u32) -> Self {
        Parser {
            src,
            pos,
            line,
            nested: false,
            file: None,
            failed: false,
        }
    }

    /// Annotate literal words with this file name.
    #[must_use]
    pub fn with_file(mut self, file: Option<Rc<str>>) -> Self {
        self.file = file;
        self
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// File name literal words are annotated with.
    #[inline]
    pub fn file(&self) -> Option<&Rc<str>> {
        self.file.as_ref()
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + offset).copied()
    }

    fn bump(&mut self) {
        if let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'\n' {
                self.line += 1;
            }
        }
    }

    /// Move to byte `end`, counting the newlines passed over.
    fn advance_to(&mut self, end: usize) {
        let end = end.min(self.src.len());
        let passed = &self.src.as_bytes()[self.pos..end];
        self.line += passed.iter().filter(|&&b| b == b'\n').count() as u32;
        self.pos = end;
    }

    fn at_line_continuation(&self) -> bool {
        self.peek() == Some(b'\\') && self.peek_at(1) == Some(b'\n')
    }

    /// Whether the current byte ends a word.
    fn at_word_end(&self) -> bool {
        match self.peek() {
            None => true,
            Some(b) => {
                is_blank(b)
                    || b == b'\n'
                    || b == b';'
                    || (self.nested && b == b']')
                    || self.at_line_continuation()
            }
        }
    }

    fn skip_blanks(&mut self) {
        while let Some(b) = self.peek() {
            if is_blank(b) {
                self.pos += 1;
            } else if self.at_line_continuation() {
                self.pos += 2;
                self.line += 1;
            } else {
                break;
            }
        }
    }

    /// Skip blanks, empty commands and comments up to the next command.
    fn skip_separators(&mut self) {
        loop {
            self.skip_blanks();
            match self.peek() {
                Some(b'\n' | b';') => self.bump(),
                Some(b'#') => self.skip_comment(),
                _ => return,
            }
        }
    }

    /// A comment runs to the first newline not preceded by a backslash.
    fn skip_comment(&mut self) {
        let bytes = self.src.as_bytes();
        loop {
            let Some(off) = memchr2(b'\n', b'\\', &bytes[self.pos..]) else {
                self.advance_to(bytes.len());
                return;
            };
            let at = self.pos + off;
            if bytes[at] == b'\n' {
                self.advance_to(at + 1);
                return;
            }
            self.advance_to(at + 2);
        }
    }

    /// The next command, or `None` at the end of the script.
    ///
    /// After an error the parser is exhausted.
    pub fn next_command(&mut self) -> Option<Result<Command, ParseError>> {
        if self.failed {
            return None;
        }
        self.skip_separators();
        match self.peek() {
            None => return None,
            Some(b']') if self.nested => return None,
            Some(_) => {}
        }
        let command = self.command();
        self.failed = command.is_err();
        Some(command)
    }

    /// Parse every remaining command.
    pub fn script(&mut self) -> Result<Script, ParseError> {
        let commands = self.commands()?;
        Ok(Script {
            commands,
            file: self.file.clone(),
        })
    }

    fn commands(&mut self) -> Result<Vec<Command>, ParseError> {
        let mut commands = Vec::new();
        while let Some(command) = self.next_command() {
            commands.push(command?);
        }
        Ok(commands)
    }

    fn command(&mut self) -> Result<Command, ParseError> {
        let line = self.line;
        let mut words = Vec::new();
        loop {
            self.skip_blanks();
            match self.peek() {
                None => break,
                Some(b'\n' | b';') => {
                    self.bump();
                    break;
                }
                Some(b']') if self.nested => break,
                Some(_) => words.push(self.word()?),
            }
        }
        Ok(Command { words, line })
    }

    fn word(&mut self) -> Result<Word, ParseError> {
        let line = self.line;
        let mut expand = false;
        if self.src.as_bytes()[self.pos..].starts_with(b"{*}") {
            self.pos += 3;
            // `{*}` on its own is just the braced word `*`.
            if self.at_word_end() {
                self.pos -= 3;
            } else {
                expand = true;
            }
        }
        let kind = match self.peek() {
            Some(b'{') => {
                let text = self.braced()?;
                if !self.at_word_end() {
                    return Err(ParseError::ExtraCharsAfterBrace { line });
                }
                if let Some(file) = &self.file {
                    text.set_source(SourceLoc {
                        file: Rc::clone(file),
                        line,
                    });
                }
                WordKind::Literal(text)
            }
            Some(b'"') => {
                let kind = self.quoted()?;
                if !self.at_word_end() {
                    return Err(ParseError::ExtraCharsAfterQuote { line });
                }
                kind
            }
            _ => WordKind::from_parts(self.parts(Mode::Bare, Subst::all())?),
        };
        Ok(Word { kind, expand, line })
    }

    /// At `{`: the text up to the matching `}`, without substitutions.
    ///
    /// Backslash-newline (and the blanks after it) becomes a single space;
    /// other backslashes are kept and stop the next brace from counting.
    pub fn braced(&mut self) -> Result<Obj, ParseError> {
        let line = self.line;
        let bytes = self.src.as_bytes();
        self.pos += 1;
        let mut depth = 1_usize;
        let mut text = String::new();
        let mut seg = self.pos;
        loop {
            let Some(off) = memchr3(b'{', b'}', b'\\', &bytes[self.pos..]) else {
                self.advance_to(bytes.len());
                return Err(ParseError::MissingCloseBrace { line });
            };
            let at = self.pos + off;
            match bytes[at] {
                b'{' => {
                    depth += 1;
                    self.advance_to(at + 1);
                }
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        text.push_str(&self.src[seg..at]);
                        self.advance_to(at + 1);
                        return Ok(Obj::new_string(text));
                    }
                    self.advance_to(at + 1);
                }
                _ if bytes.get(at + 1) == Some(&b'\n') => {
                    text.push_str(&self.src[seg..at]);
                    text.push(' ');
                    let mut end = at + 2;
                    while matches!(bytes.get(end), Some(b' ' | b'\t')) {
                        end += 1;
                    }
                    self.advance_to(end);
                    seg = self.pos;
                }
                _ => self.advance_to(at + 2),
            }
        }
    }

    /// At `"`: the parts up to the closing quote, which is consumed.
    pub fn quoted(&mut self) -> Result<WordKind, ParseError> {
        let line = self.line;
        self.pos += 1;
        let parts = self.parts(Mode::Quoted, Subst::all())?;
        if self.peek() != Some(b'"') {
            return Err(ParseError::MissingCloseQuote { line });
        }
        self.pos += 1;
        Ok(WordKind::from_parts(parts))
    }

    fn parts(&mut self, mode: Mode, subst: Subst) -> Result<Vec<Part>, ParseError> {
        let mut acc = PartBuilder::default();
        let mut seg = self.pos;
        while let Some(b) = self.peek() {
            let stop = match mode {
                Mode::Bare => {
                    is_blank(b)
                        || b == b'\n'
                        || b == b';'
                        || (self.nested && b == b']')
                        || self.at_line_continuation()
                }
                Mode::Quoted => b == b'"',
                Mode::Index => b == b')',
                Mode::Subst => false,
            };
            if stop {
                break;
            }
            match b {
                b'$' if subst.contains(Subst::VARIABLES) => {
                    acc.text(&self.src[seg..self.pos]);
                    match self.var()? {
                        Some(part) => acc.part(part),
                        None => acc.push('$'),
                    }
                    seg = self.pos;
                }
                b'[' if subst.contains(Subst::COMMANDS) => {
                    acc.text(&self.src[seg..self.pos]);
                    let part = self.bracket()?;
                    acc.part(part);
                    seg = self.pos;
                }
                b'\\' if subst.contains(Subst::BACKSLASHES) => {
                    acc.text(&self.src[seg..self.pos]);
                    let (ch, used) = decode_backslash(&self.src[self.pos + 1..]);
                    acc.push(ch);
                    self.advance_to(self.pos + 1 + used);
                    seg = self.pos;
                }
                _ => self.bump(),
            }
        }
        acc.text(&self.src[seg..self.pos]);
        Ok(acc.finish())
    }

    /// At `$`: a variable reference.
    ///
    /// Returns `None`, with only the `$` consumed, when no name follows; the
    /// `$` is then literal text.
    pub fn var(&mut self) -> Result<Option<Part>, ParseError> {
        let line = self.line;
        let bytes = self.src.as_bytes();
        self.pos += 1;

        if self.peek() == Some(b'{') {
            let start = self.pos + 1;
            let Some(off) = memchr(b'}', &bytes[start..]) else {
                self.advance_to(bytes.len());
                return Err(ParseError::MissingCloseBraceVar { line });
            };
            let name = Obj::new_string(&self.src[start..start + off]);
            self.advance_to(start + off + 1);
            return Ok(Some(Part::Var(VarRef { name, index: None })));
        }

        let start = self.pos;
        let mut end = start;
        loop {
            match bytes.get(end) {
                Some(&b) if is_var_char(b) => end += 1,
                Some(b':') if bytes.get(end + 1) == Some(&b':') => {
                    end += 2;
                    while bytes.get(end) == Some(&b':') {
                        end += 1;
                    }
                }
                _ => break,
            }
        }
        if end == start {
            return Ok(None);
        }
        self.pos = end;
        let name = Obj::new_string(&self.src[start..end]);

        let index = if self.peek() == Some(b'(') {
            self.pos += 1;
            let parts = self.parts(Mode::Index, Subst::all())?;
            if self.peek() != Some(b')') {
                return Err(ParseError::MissingCloseParen { line });
            }
            self.pos += 1;
            Some(Box::new(WordKind::from_parts(parts)))
        } else {
            None
        };
        Ok(Some(Part::Var(VarRef { name, index })))
    }

    /// At `[`: the nested script up to the matching `]`, which is consumed.
    pub fn bracket(&mut self) -> Result<Part, ParseError> {
        let line = self.line;
        let mut inner = Parser {
            src: self.src,
            pos: self.pos + 1,
            line: self.line,
            nested: true,
            file: self.file.clone(),
            failed: false,
        };
        let commands = tern_stack::ensure_sufficient_stack(|| inner.commands())?;
        if inner.peek() != Some(b']') {
            self.advance_to(self.src.len());
            return Err(ParseError::MissingCloseBracket { line });
        }
        self.pos = inner.pos + 1;
        self.line = inner.line;
        Ok(Part::Script(Rc::new(Script {
            commands,
            file: self.file.clone(),
        })))
    }
}

impl Iterator for Parser<'_> {
    type Item = Result<Command, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_command()
    }
}

/// Parse a whole script.
pub fn parse_script(text: &str) -> Result<Script, ParseError> {
    Parser::new(text).script()
}

/// Split `text` into parts for `subst`: substitutions happen everywhere,
/// nothing separates words or commands.
pub fn parse_subst(text: &str, subst: Subst) -> Result<Vec<Part>, ParseError> {
    Parser::new(text).parts(Mode::Subst, subst)
}

/// Whether `text` parses, or fails for a reason more input cannot fix.
///
/// The interactive prompt keeps reading lines while this is false.
pub fn is_complete(text: &str) -> bool {
    match parse_script(text) {
        Ok(_) => true,
        Err(err) => !err.is_incomplete(),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
