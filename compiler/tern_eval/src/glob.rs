//! Glob-style pattern matching.
//!
//! Shared by `string match`, `switch -glob`, `lsearch -glob`, `info
//! commands` and friends. Syntax:
//!
//! - `*` matches any run of characters, including none
//! - `?` matches one character
//! - `[abc]`, `[a-z]` match one character from a set or range
//! - `\x` matches `x` literally

/// Whether `text` matches `pattern` in full.
pub fn glob_match(pattern: &str, text: &str, nocase: bool) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    matches(&pattern, &text, nocase)
}

/// True when `pattern` contains no glob metacharacters, so matching it is a
/// plain equality test.
pub fn is_literal(pattern: &str) -> bool {
    !pattern.contains(['*', '?', '[', '\\'])
}

fn same(a: char, b: char, nocase: bool) -> bool {
    a == b || (nocase && a.to_lowercase().eq(b.to_lowercase()))
}

fn matches(pattern: &[char], text: &[char], nocase: bool) -> bool {
    let (mut p, mut t) = (0, 0);
    // Where to resume after the most recent `*`: pattern index after the
    // star and the text index it is currently assumed to cover up to.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        let step = match pattern.get(p) {
            Some('*') => {
                while pattern.get(p) == Some(&'*') {
                    p += 1;
                }
                if p == pattern.len() {
                    return true;
                }
                backtrack = Some((p, t));
                continue;
            }
            Some('?') => Some(p + 1),
            Some('[') => match_class(pattern, p + 1, text[t], nocase),
            Some('\\') if p + 1 < pattern.len() => {
                same(pattern[p + 1], text[t], nocase).then_some(p + 2)
            }
            Some(&c) => same(c, text[t], nocase).then_some(p + 1),
            None => None,
        };
        match step {
            Some(next) => {
                p = next;
                t += 1;
            }
            None => match backtrack {
                Some((star_p, star_t)) => {
                    backtrack = Some((star_p, star_t + 1));
                    p = star_p;
                    t = star_t + 1;
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

/// Match `c` against the class starting at `start` (just past `[`).
/// Returns the pattern index after the closing `]` on a match.
fn match_class(pattern: &[char], start: usize, c: char, nocase: bool) -> Option<usize> {
    let fold = |ch: char| {
        if nocase {
            ch.to_lowercase().next().unwrap_or(ch)
        } else {
            ch
        }
    };
    let c = fold(c);
    let mut i = start;
    let mut matched = false;
    while i < pattern.len() && pattern[i] != ']' {
        let mut lo = pattern[i];
        if lo == '\\' && i + 1 < pattern.len() {
            i += 1;
            lo = pattern[i];
        }
        if pattern.get(i + 1) == Some(&'-') && pattern.get(i + 2).is_some_and(|&h| h != ']') {
            let hi = pattern[i + 2];
            let (lo, hi) = (fold(lo), fold(hi));
            let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            if (lo..=hi).contains(&c) {
                matched = true;
            }
            i += 3;
        } else {
            if fold(lo) == c {
                matched = true;
            }
            i += 1;
        }
    }
    // An unterminated class never matches.
    (matched && i < pattern.len()).then_some(i + 1)
}
