//! `format`: C-style conversion specifiers.
//!
//! Supports:
//! - Integers: `%d %i %u %x %X %o %c`, with sign, alternate and zero-pad flags
//! - Floats: `%f %e %E %g %G`, with precision
//! - Strings: `%s`, precision truncates
//! - Width and precision given inline or as `*` (taken from the arguments)
//!
//! Length modifiers (`h`, `l`, `ll`) are accepted and ignored; all integers
//! are 64-bit.

use tern_value::Obj;

use crate::errors::{EvalResult, ScriptError};
use crate::Interp;

use super::{arity, Builtin};

pub(super) const COMMANDS: &[(&str, Builtin)] = &[("format", format)];

/// One parsed `%...` specifier.
#[derive(Debug, Default)]
struct Spec {
    left: bool,
    zero: bool,
    plus: bool,
    space: bool,
    alternate: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

fn format(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, None, "formatString ?arg ...?")?;
    let mut args = argv[2..].iter();
    let mut next_arg = || {
        args.next()
            .ok_or_else(|| ScriptError::new("not enough arguments for all format specifiers"))
    };
    let mut out = String::new();
    let mut chars = argv[1].as_str().chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }
        let mut spec = Spec::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.left = true,
                '0' => spec.zero = true,
                '+' => spec.plus = true,
                ' ' => spec.space = true,
                '#' => spec.alternate = true,
                _ => break,
            }
            chars.next();
        }
        if chars.peek() == Some(&'*') {
            chars.next();
            let width = next_arg()?.get_int()?;
            if width < 0 {
                spec.left = true;
            }
            spec.width = Some(width.unsigned_abs() as usize);
        } else {
            spec.width = digits(&mut chars);
        }
        if chars.peek() == Some(&'.') {
            chars.next();
            if chars.peek() == Some(&'*') {
                chars.next();
                spec.precision = Some(usize::try_from(next_arg()?.get_int()?).unwrap_or(0));
            } else {
                spec.precision = Some(digits(&mut chars).unwrap_or(0));
            }
        }
        while chars.next_if(|c| matches!(c, 'h' | 'l' | 'L')).is_some() {}
        let Some(conversion) = chars.next() else {
            return Err(
                ScriptError::new("format string ended in middle of field specifier").into(),
            );
        };
        let formatted = match conversion {
            'd' | 'i' => format_int(next_arg()?.get_int()?, &spec, Radix::Decimal),
            'u' => format_unsigned(next_arg()?.get_int()? as u64, &spec, Radix::Decimal),
            'x' => format_unsigned(next_arg()?.get_int()? as u64, &spec, Radix::Hex),
            'X' => format_unsigned(next_arg()?.get_int()? as u64, &spec, Radix::HexUpper),
            'o' => format_unsigned(next_arg()?.get_int()? as u64, &spec, Radix::Octal),
            'c' => {
                let code = next_arg()?.get_int()?;
                let c = u32::try_from(code)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                pad(&c.to_string(), &spec)
            }
            's' => {
                let text = next_arg()?.as_str();
                match spec.precision {
                    Some(max) => pad(&text.chars().take(max).collect::<String>(), &spec),
                    None => pad(text, &spec),
                }
            }
            'f' | 'e' | 'E' | 'g' | 'G' => {
                format_float(next_arg()?.get_double()?, &spec, conversion)
            }
            other => {
                return Err(ScriptError::new(format!("bad field specifier \"{other}\"")).into())
            }
        };
        out.push_str(&formatted);
    }
    Ok(Obj::new_string(out))
}

fn digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut value: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(digit as usize));
    }
    value
}

#[derive(Clone, Copy)]
enum Radix {
    Decimal,
    Hex,
    HexUpper,
    Octal,
}

fn format_int(n: i64, spec: &Spec, radix: Radix) -> String {
    let sign = sign(n < 0, spec);
    let body = format_digits(n.unsigned_abs(), spec, radix);
    assemble(sign, &body, spec)
}

fn format_unsigned(n: u64, spec: &Spec, radix: Radix) -> String {
    let body = format_digits(n, spec, radix);
    assemble("", &body, spec)
}

/// Digits with the alternate-form prefix and any minimum digit count
/// (precision) applied.
fn format_digits(n: u64, spec: &Spec, radix: Radix) -> String {
    let (digits, prefix) = match radix {
        Radix::Decimal => (n.to_string(), ""),
        Radix::Hex => (format!("{n:x}"), if spec.alternate { "0x" } else { "" }),
        Radix::HexUpper => (format!("{n:X}"), if spec.alternate { "0X" } else { "" }),
        Radix::Octal => (format!("{n:o}"), if spec.alternate { "0" } else { "" }),
    };
    match spec.precision {
        Some(min) if digits.len() < min => format!("{prefix}{digits:0>min$}"),
        _ => format!("{prefix}{digits}"),
    }
}

fn sign(negative: bool, spec: &Spec) -> &'static str {
    if negative {
        "-"
    } else if spec.plus {
        "+"
    } else if spec.space {
        " "
    } else {
        ""
    }
}

/// Sign and body padded to the field width. Zero padding goes between the
/// sign and the digits.
fn assemble(sign: &str, body: &str, spec: &Spec) -> String {
    let len = sign.len() + body.len();
    match spec.width {
        Some(width) if spec.zero && !spec.left && len < width => {
            let pad = width - sign.len();
            format!("{sign}{body:0>pad$}")
        }
        _ => pad(&format!("{sign}{body}"), spec),
    }
}

/// Pad `text` with spaces to the field width.
fn pad(text: &str, spec: &Spec) -> String {
    let Some(width) = spec.width else {
        return text.to_string();
    };
    if spec.left {
        format!("{text:<width$}")
    } else {
        format!("{text:>width$}")
    }
}

fn format_float(f: f64, spec: &Spec, conversion: char) -> String {
    if !f.is_finite() {
        let text = if f.is_nan() {
            "NaN"
        } else if f > 0.0 {
            "Inf"
        } else {
            "-Inf"
        };
        return pad(text, spec);
    }
    let negative = f.is_sign_negative() && f != 0.0;
    let magnitude = f.abs();
    let precision = spec.precision.unwrap_or(6);
    let body = match conversion {
        'f' => format!("{magnitude:.precision$}"),
        'e' => format_exp(magnitude, precision, false),
        'E' => format_exp(magnitude, precision, true),
        'G' => format_general(magnitude, precision, spec.alternate, true),
        _ => format_general(magnitude, precision, spec.alternate, false),
    };
    assemble(sign(negative, spec), &body, spec)
}

/// `%e`: one leading digit, `precision` decimals and an exponent of at
/// least two digits with an explicit sign.
fn format_exp(f: f64, precision: usize, uppercase: bool) -> String {
    let text = format!("{f:.precision$e}");
    let (mantissa, exponent) = text.split_once('e').unwrap_or((&text, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let e = if uppercase { 'E' } else { 'e' };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}{e}{sign}{:02}", exponent.unsigned_abs())
}

/// `%g`: `%e` or `%f` depending on the exponent, trailing zeros removed
/// unless `alternate`.
fn format_general(f: f64, precision: usize, alternate: bool, uppercase: bool) -> String {
    let precision = precision.max(1);
    let exponent = if f == 0.0 {
        0
    } else {
        let text = format!("{f:.prec$e}", prec = precision - 1);
        text.split_once('e')
            .and_then(|(_, exp)| exp.parse::<i64>().ok())
            .unwrap_or(0)
    };
    let mut text = if exponent < -4 || exponent >= precision as i64 {
        format_exp(f, precision - 1, uppercase)
    } else {
        let decimals = (precision as i64 - 1 - exponent).max(0) as usize;
        format!("{f:.decimals$}")
    };
    if !alternate {
        text = strip_fraction_zeros(&text);
    }
    text
}

fn strip_fraction_zeros(text: &str) -> String {
    let (number, exponent) = match text.find(['e', 'E']) {
        Some(i) => text.split_at(i),
        None => (text, ""),
    };
    if !number.contains('.') {
        return text.to_string();
    }
    let number = number.trim_end_matches('0').trim_end_matches('.');
    format!("{number}{exponent}")
}
