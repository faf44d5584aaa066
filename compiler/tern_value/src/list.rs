//! List string grammar: reading a string as a list and quoting elements so
//! that a formatted list reads back into the same elements.

use std::borrow::Cow;

use crate::escape::{decode_backslash, unescape};
use crate::{Obj, ValueError};

#[inline]
pub(crate) fn is_list_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Split `text` into list elements.
pub fn parse_list(text: &str) -> Result<Vec<Obj>, ValueError> {
    let mut items = Vec::new();
    let bytes = text.as_bytes();
    let mut pos = 0;
    loop {
        while pos < bytes.len() && is_list_space(bytes[pos]) {
            pos += 1;
        }
        if pos >= bytes.len() {
            return Ok(items);
        }
        let (element, next) = match bytes[pos] {
            b'{' => read_braced(text, pos)?,
            b'"' => read_quoted(text, pos)?,
            _ => read_bare(text, pos),
        };
        items.push(Obj::new_string(element));
        pos = next;
    }
}

/// `pos` is at the opening brace. Returns the element and the position after
/// the closing brace.
fn read_braced(text: &str, pos: usize) -> Result<(String, usize), ValueError> {
    let bytes = text.as_bytes();
    let mut depth = 1;
    let mut i = pos + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    check_separator(text, i + 1, "braces")?;
                    return Ok((text[pos + 1..i].to_string(), i + 1));
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(ValueError::UnmatchedBrace)
}

fn read_quoted(text: &str, pos: usize) -> Result<(String, usize), ValueError> {
    let bytes = text.as_bytes();
    let mut i = pos + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'"' => {
                check_separator(text, i + 1, "quotes")?;
                return Ok((unescape(&text[pos + 1..i]), i + 1));
            }
            _ => {}
        }
        i += 1;
    }
    Err(ValueError::UnmatchedQuote)
}

fn read_bare(text: &str, pos: usize) -> (String, usize) {
    let bytes = text.as_bytes();
    let mut out = String::new();
    let mut start = pos;
    let mut i = pos;
    while i < bytes.len() && !is_list_space(bytes[i]) {
        if bytes[i] == b'\\' {
            out.push_str(&text[start..i]);
            let (ch, used) = decode_backslash(&text[i + 1..]);
            out.push(ch);
            i += 1 + used;
            start = i;
        } else {
            i += 1;
        }
    }
    out.push_str(&text[start..i.min(bytes.len())]);
    (out, i)
}

fn check_separator(text: &str, at: usize, kind: &'static str) -> Result<(), ValueError> {
    match text.as_bytes().get(at) {
        None => Ok(()),
        Some(b) if is_list_space(*b) => Ok(()),
        Some(_) => {
            let rest: String = text[at..].chars().take(20).collect();
            Err(ValueError::ListElementFollowedBy { kind, rest })
        }
    }
}

fn needs_quoting(b: u8) -> bool {
    is_list_space(b) || matches!(b, b'{' | b'}' | b'[' | b']' | b'$' | b'"' | b'\\' | b';')
}

/// True if `s` can be wrapped in braces and read back unchanged.
fn brace_safe(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut depth: i32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                // A trailing backslash would escape the closing brace, and a
                // backslash-newline would be rewritten by the script parser.
                if i + 1 >= bytes.len() || bytes[i + 1] == b'\n' {
                    return false;
                }
                i += 1;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
        i += 1;
    }
    depth == 0
}

/// Quote one element for inclusion in a list string.
pub fn quote_element(s: &str) -> Cow<'_, str> {
    if s.is_empty() {
        return Cow::Borrowed("{}");
    }
    if !s.starts_with('#') && !s.bytes().any(needs_quoting) {
        return Cow::Borrowed(s);
    }
    if brace_safe(s) {
        return Cow::Owned(format!("{{{s}}}"));
    }
    let mut out = String::with_capacity(s.len() + 8);
    for (idx, ch) in s.char_indices() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{b}' => out.push_str("\\v"),
            '\u{c}' => out.push_str("\\f"),
            '#' if idx == 0 => out.push_str("\\#"),
            c if c.is_ascii() && needs_quoting(c as u8) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Format elements into the canonical list string.
pub fn format_list(items: &[Obj]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&quote_element(item.as_str()));
    }
    out
}

/// A resolved list index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListIndex {
    /// Within `0..len`.
    At(usize),
    /// Before the first element.
    Before,
    /// At or past `len`.
    After,
}

/// Parse an index of the form `N`, `end`, `end-N`, `end+N`, `N+M`, `N-M`
/// against a list of `len` elements.
pub fn parse_index(text: &str, len: usize) -> Result<ListIndex, ValueError> {
    let bad = || ValueError::BadIndex(text.to_string());
    let s = text.trim();
    let (base, rest) = if let Some(rest) = s.strip_prefix("end") {
        (len as i64 - 1, rest)
    } else {
        let split = s
            .char_indices()
            .skip(1)
            .find(|(_, c)| *c == '+' || *c == '-')
            .map_or(s.len(), |(i, _)| i);
        let base = crate::number::parse_int(&s[..split]).map_err(|_| bad())?;
        (base, &s[split..])
    };
    let offset = if rest.is_empty() {
        0
    } else {
        let (negative, digits) = if let Some(digits) = rest.strip_prefix('+') {
            (false, digits)
        } else if let Some(digits) = rest.strip_prefix('-') {
            (true, digits)
        } else {
            return Err(bad());
        };
        if digits.starts_with(['+', '-']) {
            return Err(bad());
        }
        let magnitude = crate::number::parse_int(digits).map_err(|_| bad())?;
        if negative {
            magnitude.checked_neg().ok_or_else(bad)?
        } else {
            magnitude
        }
    };
    let index = base.checked_add(offset).ok_or_else(bad)?;
    Ok(if index < 0 {
        ListIndex::Before
    } else if index as u64 >= len as u64 {
        ListIndex::After
    } else {
        ListIndex::At(index as usize)
    })
}

#[cfg(test)]
mod tests;
