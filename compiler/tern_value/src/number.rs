//! Numeric literal grammar.
//!
//! Integers are 64-bit signed. Accepted integer forms, each with optional
//! surrounding whitespace and an optional sign:
//!
//! - decimal: `42`
//! - hex: `0x2a`
//! - octal: `0o52`, or a leading zero followed by octal digits: `052`
//! - binary: `0b101010`
//!
//! Doubles are IEEE-754. Anything that reads as an integer also reads as a
//! double; otherwise the usual decimal/exponent forms and `Inf`/`Infinity`
//! are accepted. `NaN` is rejected in every spelling.

use crate::ValueError;

/// A numeric value as seen by arithmetic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Double(f64),
}

impl Number {
    /// Widen to a double.
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Double(d) => d,
        }
    }
}

const TCL_SPACE: &[char] = &[' ', '\t', '\n', '\r', '\u{b}', '\u{c}'];

/// Parse the integer grammar described in the module docs.
pub fn parse_int(text: &str) -> Result<i64, ValueError> {
    let not_int = || ValueError::NotAnInteger(text.to_string());
    let s = text.trim_matches(TCL_SPACE);
    let (negative, body) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = split_radix(body);
    if digits.is_empty() {
        return Err(not_int());
    }

    let mut magnitude: u64 = 0;
    for ch in digits.chars() {
        let digit = ch.to_digit(radix).ok_or_else(not_int)?;
        magnitude = magnitude
            .checked_mul(u64::from(radix))
            .and_then(|m| m.checked_add(u64::from(digit)))
            .ok_or_else(|| ValueError::IntegerTooLarge(text.to_string()))?;
    }

    // i64::MIN has one more unit of magnitude than i64::MAX.
    let limit = if negative {
        i64::MIN.unsigned_abs()
    } else {
        i64::MAX as u64
    };
    if magnitude > limit {
        return Err(ValueError::IntegerTooLarge(text.to_string()));
    }
    if negative {
        Ok(0_i64.wrapping_sub_unsigned(magnitude))
    } else {
        Ok(magnitude as i64)
    }
}

fn split_radix(body: &str) -> (u32, &str) {
    let bytes = body.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'0' {
        match bytes[1] {
            b'x' | b'X' => return (16, &body[2..]),
            b'o' | b'O' => return (8, &body[2..]),
            b'b' | b'B' => return (2, &body[2..]),
            b'0'..=b'9' => return (8, &body[1..]),
            _ => {}
        }
    }
    (10, body)
}

/// Parse a double, accepting any integer form as well.
pub fn parse_double(text: &str) -> Result<f64, ValueError> {
    if let Ok(i) = parse_int(text) {
        return Ok(i as f64);
    }
    let s = text.trim_matches(TCL_SPACE);
    let unsigned = s.trim_start_matches(['+', '-']);
    if unsigned.eq_ignore_ascii_case("nan") {
        return Err(ValueError::NanRejected(text.to_string()));
    }
    // Rust's float grammar is close to ours; reject the forms it allows
    // that we do not (empty, a bare dot, underscores are already refused).
    if unsigned.is_empty() || unsigned == "." || is_bad_octal(unsigned) {
        return Err(ValueError::NotANumber(text.to_string()));
    }
    let value: f64 = s
        .parse()
        .map_err(|_| ValueError::NotANumber(text.to_string()))?;
    if value.is_nan() {
        return Err(ValueError::NanRejected(text.to_string()));
    }
    Ok(value)
}

/// A leading zero makes an integer octal, so `08` and `0129` are malformed
/// integers rather than decimal doubles. `08.5` and `09e1` are still doubles.
fn is_bad_octal(unsigned: &str) -> bool {
    let bytes = unsigned.as_bytes();
    bytes.len() >= 2
        && bytes[0] == b'0'
        && bytes[1].is_ascii_digit()
        && !bytes.iter().any(|b| matches!(b, b'.' | b'e' | b'E'))
}

/// Parse as an integer if possible, otherwise as a double.
pub fn parse_number(text: &str) -> Result<Number, ValueError> {
    match parse_int(text) {
        Ok(i) => Ok(Number::Int(i)),
        Err(int_err) => match parse_double(text) {
            Ok(d) => Ok(Number::Double(d)),
            // Overflowing integers are reported as such, not as "not a number".
            Err(_) if matches!(int_err, ValueError::IntegerTooLarge(_)) => Err(int_err),
            Err(e) => Err(e),
        },
    }
}

/// Canonical string form of a double.
///
/// Always contains a `.` or an exponent so the string reads back as a
/// double rather than an integer.
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Inf" } else { "-Inf" }.to_string();
    }
    // `Debug` is the shortest round-tripping form and keeps a trailing `.0`.
    format!("{value:?}")
}

/// Parse a boolean: numbers (non-zero is true) or the words
/// `true/false`, `yes/no`, `on/off`, case-insensitive.
pub fn parse_bool(text: &str) -> Result<bool, ValueError> {
    let s = text.trim_matches(TCL_SPACE);
    for (word, value) in [
        ("true", true),
        ("false", false),
        ("yes", true),
        ("no", false),
        ("on", true),
        ("off", false),
    ] {
        if s.eq_ignore_ascii_case(word) {
            return Ok(value);
        }
    }
    match parse_number(s) {
        Ok(Number::Int(i)) => Ok(i != 0),
        Ok(Number::Double(d)) => Ok(d != 0.0),
        Err(_) => Err(ValueError::NotABoolean(text.to_string())),
    }
}
