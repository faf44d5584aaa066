//! Backslash sequences shared by the list reader and the script parser.

/// Decode one backslash sequence.
///
/// `rest` starts just *after* the backslash. Returns the decoded text and
/// the number of bytes of `rest` consumed. A trailing lone backslash decodes
/// to itself.
pub fn decode_backslash(rest: &str) -> (char, usize) {
    let mut chars = rest.chars();
    let Some(first) = chars.next() else {
        return ('\\', 0);
    };
    match first {
        'a' => ('\u{7}', 1),
        'b' => ('\u{8}', 1),
        'f' => ('\u{c}', 1),
        'n' => ('\n', 1),
        'r' => ('\r', 1),
        't' => ('\t', 1),
        'v' => ('\u{b}', 1),
        'x' => hex_escape(rest, 1, 2, 'x'),
        'u' => hex_escape(rest, 1, 4, 'u'),
        'U' => hex_escape(rest, 1, 8, 'U'),
        '0'..='7' => {
            let digits: String = rest.chars().take(3).take_while(|c| c.is_digit(8)).collect();
            let value = u32::from_str_radix(&digits, 8).unwrap_or(0) & 0xff;
            (char::from_u32(value).unwrap_or('\0'), digits.len())
        }
        '\n' => {
            // Backslash-newline plus following blanks collapse to one space.
            let skipped = rest[1..]
                .bytes()
                .take_while(|b| *b == b' ' || *b == b'\t')
                .count();
            (' ', 1 + skipped)
        }
        other => (other, other.len_utf8()),
    }
}

fn hex_escape(rest: &str, skip: usize, max: usize, letter: char) -> (char, usize) {
    let digits: String = rest[skip..]
        .chars()
        .take(max)
        .take_while(char::is_ascii_hexdigit)
        .collect();
    if digits.is_empty() {
        return (letter, 1);
    }
    let value = u32::from_str_radix(&digits, 16).unwrap_or(0);
    (
        char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER),
        skip + digits.len(),
    )
}

/// Decode every backslash sequence in `text`.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let (ch, used) = decode_backslash(&rest[pos + 1..]);
        out.push(ch);
        rest = &rest[pos + 1 + used..];
    }
    out.push_str(rest);
    out
}
