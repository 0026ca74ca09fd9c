//! Backslash escape decoding for message keys.
//!
//! Message keys arrive as quoted text where control characters are spelled as
//! backslash escapes (`\t`, `\n`, `\101`). Decoding turns each recognized
//! escape token into its literal character before the key is used for catalog
//! lookup or output. Unknown escapes are inert: the backslash and whatever
//! follows it pass through unchanged, so decoding is total and never fails.
//!
//! # Token forms
//!
//! | Form | Example | Decodes to |
//! |---|---|---|
//! | Literal backslash | `\\` | `\` |
//! | Octal, 1-3 digits | `\7`, `\47`, `\101` | the byte with that octal value |
//! | Named | `\n` `\t` `\r` `\a` `\b` `\f` `\v` | the named control character |
//!
//! Octal matching is longest-first: `\101` decodes as one escape (`A`), never
//! as `\1` followed by `01`. A three-digit match is only taken when the value
//! fits in a byte (leading digit 0-3); `\477` decodes as `\47` followed by a
//! literal `7`.

/// Named single-letter escapes and the control characters they decode to.
///
/// Consulted only after octal matching has been ruled out at the current
/// position, so `\0` is NUL rather than a failed name lookup.
pub const NAMED_ESCAPES: &[(char, char)] = &[
    ('n', '\n'),
    ('t', '\t'),
    ('r', '\r'),
    ('a', '\u{7}'),
    ('b', '\u{8}'),
    ('f', '\u{c}'),
    ('v', '\u{b}'),
];

/// Decodes every recognized backslash escape in `raw`.
///
/// Text outside escape tokens is copied byte-identically. A backslash that
/// does not begin a recognized token is emitted verbatim together with the
/// character after it, including a lone backslash at end of input.
#[must_use]
pub fn decode_escapes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        match match_escape(tail) {
            Some((decoded, used)) => {
                out.push(decoded);
                rest = &tail[used..];
            }
            None => {
                out.push('\\');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Matches one escape token at the start of `tail` (the text just after a
/// backslash); returns the decoded character and how many bytes of `tail`
/// the token consumed.
///
/// Priority: literal backslash, then octal longest-first, then named.
fn match_escape(tail: &str) -> Option<(char, usize)> {
    let bytes = tail.as_bytes();
    let first = *bytes.first()?;
    if first == b'\\' {
        return Some(('\\', 1));
    }
    let digits = bytes
        .iter()
        .take(3)
        .take_while(|&&b| (b'0'..=b'7').contains(&b))
        .count();
    match digits {
        3 if first <= b'3' => Some((octal_char(&bytes[..3]), 3)),
        2.. => Some((octal_char(&bytes[..2]), 2)),
        1 => Some((octal_char(&bytes[..1]), 1)),
        _ => {
            let c = tail.chars().next()?;
            NAMED_ESCAPES
                .iter()
                .find(|&&(name, _)| name == c)
                .map(|&(_, decoded)| (decoded, 1))
        }
    }
}

/// Decodes 1-3 octal digit bytes. Callers guarantee the value fits in one
/// byte, so the result is the Latin-1 character for that byte.
fn octal_char(digits: &[u8]) -> char {
    let mut value = 0u8;
    for d in digits {
        value = value * 8 + (d - b'0');
    }
    char::from(value)
}
