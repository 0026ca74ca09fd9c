//! Format-directive scanning and classification.
//!
//! A format string is literal text interrupted by `%`-initiated directives.
//! The tokenizer walks it once with an explicit state machine and produces
//! typed [`Token`] values; later stages never re-scan raw text. The grammar
//! is deliberately permissive: any character that is not a flag, digit, `.`,
//! or length modifier terminates the directive as its conversion character,
//! and a directive cut off by end of input is carried as
//! [`Token::Unterminated`] literal text rather than an error.
//!
//! # Scan states
//!
//! | State | Meaning |
//! |---|---|
//! | `AtPercent` | just after `%`; digits may still turn out to be a `N$` index |
//! | `InFlags` | consuming `-+ 0'#` in any order and count |
//! | `InWidth` | consuming the width digit run |
//! | `InPrecision` | after `.`, consuming the precision digit run |
//! | `InLength` | consuming `h`/`l`/`L`-family length modifiers |
//!
//! `%%` short-circuits out of `AtPercent` as a literal percent and never
//! consumes an argument.

use std::iter::Peekable;
use std::str::Chars;

use bitflags::bitflags;

bitflags! {
    /// Directive flag characters (`-`, `+`, space, `0`, `'`, `#`).
    ///
    /// The surface syntax accepts flags in any order and any count;
    /// duplicates collapse into one set bit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ConvFlags: u8 {
        /// `-`: left-align within the field width.
        const LEFT_ALIGN = 1 << 0;
        /// `+`: always emit a sign on numeric output.
        const FORCE_SIGN = 1 << 1;
        /// space: emit a leading space for non-negative numeric output.
        const SPACE_SIGN = 1 << 2;
        /// `0`: pad the field with zeros.
        const ZERO_PAD = 1 << 3;
        /// `'`: locale digit grouping; native support is probed at runtime.
        const GROUPING = 1 << 4;
        /// `#`: alternate form.
        const ALT_FORM = 1 << 5;
    }
}

/// Canonical emission order for flag characters.
const FLAG_ORDER: &[(ConvFlags, char)] = &[
    (ConvFlags::LEFT_ALIGN, '-'),
    (ConvFlags::FORCE_SIGN, '+'),
    (ConvFlags::SPACE_SIGN, ' '),
    (ConvFlags::ZERO_PAD, '0'),
    (ConvFlags::GROUPING, '\''),
    (ConvFlags::ALT_FORM, '#'),
];

impl ConvFlags {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '-' => Some(Self::LEFT_ALIGN),
            '+' => Some(Self::FORCE_SIGN),
            ' ' => Some(Self::SPACE_SIGN),
            '0' => Some(Self::ZERO_PAD),
            '\'' => Some(Self::GROUPING),
            '#' => Some(Self::ALT_FORM),
            _ => None,
        }
    }
}

/// How a directive names its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgRef {
    /// Consumes the next unconsumed slot in scan order.
    Sequential,
    /// `N$`: names the N-th call argument (1-indexed surface syntax).
    Positional(usize),
}

/// One scanned `%` directive with its fields broken out.
///
/// `raw` preserves the exact source text (any `N$` prefix included) so a
/// directive that cannot be bound can go back into the output
/// byte-identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub arg_ref: ArgRef,
    pub flags: ConvFlags,
    pub width: Option<String>,
    /// `Some("")` is a bare `.` (explicit zero precision).
    pub precision: Option<String>,
    pub length: Option<String>,
    pub conversion: char,
    raw: String,
}

impl Directive {
    /// The exact source text of the directive, `%` included.
    #[must_use]
    pub fn raw_text(&self) -> &str {
        &self.raw
    }

    /// Whether the conversion renders a decimal (floating-point) value,
    /// making its argument subject to decimal-separator remapping. The
    /// scanner is permissive about length modifiers; this class is not:
    /// only an absent or `h`/`l`/`L`-family modifier qualifies.
    #[must_use]
    pub fn is_numeric_decimal(&self) -> bool {
        if !matches!(self.conversion, 'f' | 'F' | 'e' | 'E' | 'g' | 'G') {
            return false;
        }
        match self.length.as_deref() {
            None => true,
            Some(length) => length.chars().all(|c| matches!(c, 'h' | 'l' | 'L')),
        }
    }

    /// Re-emits the directive in sequential form (no `N$` prefix), the only
    /// form the native formatter understands.
    ///
    /// The `'` grouping flag survives only when `grouping_supported`; an
    /// unsupported flag is dropped and the directive is otherwise unchanged.
    #[must_use]
    pub fn emit_sequential(&self, grouping_supported: bool) -> String {
        let mut out = String::with_capacity(self.raw.len());
        out.push('%');
        for &(flag, c) in FLAG_ORDER {
            if flag == ConvFlags::GROUPING && !grouping_supported {
                continue;
            }
            if self.flags.contains(flag) {
                out.push(c);
            }
        }
        if let Some(width) = &self.width {
            out.push_str(width);
        }
        if let Some(precision) = &self.precision {
            out.push('.');
            out.push_str(precision);
        }
        if let Some(length) = &self.length {
            out.push_str(length);
        }
        out.push(self.conversion);
        out
    }
}

/// One scanned piece of a format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A run of literal text between directives.
    Literal(String),
    /// `%%`: a literal percent sign; consumes no argument.
    PercentLiteral,
    /// A complete directive ending in a conversion character.
    Directive(Directive),
    /// A `%`-initiated run that hit end of input before its conversion
    /// character. Carried verbatim; `arg_ref` records whether a `N$` prefix
    /// was consumed, which decides sequential-cursor accounting.
    Unterminated { raw: String, arg_ref: ArgRef },
}

impl Token {
    /// The exact source text this token was scanned from.
    #[must_use]
    pub fn raw_text(&self) -> &str {
        match self {
            Token::Literal(text) => text,
            Token::PercentLiteral => "%%",
            Token::Directive(directive) => directive.raw_text(),
            Token::Unterminated { raw, .. } => raw,
        }
    }
}

/// Length-modifier characters (`%ld`, `%Lf`, `%hhd` and friends).
fn is_length_modifier(c: char) -> bool {
    matches!(c, 'h' | 'l' | 'L' | 'j' | 'q' | 't' | 'z')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AtPercent,
    InFlags,
    InWidth,
    InPrecision,
    InLength,
}

/// Splits `format` into literal runs and typed directives.
///
/// Total over any input, and lossless: concatenating every token's
/// [`Token::raw_text`] reproduces `format` byte-identically.
#[must_use]
pub fn tokenize(format: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(&mut literal)));
        }
        tokens.push(scan_directive(&mut chars));
    }
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    tokens
}

/// Scans one directive; `chars` stands just after the introducing `%`.
fn scan_directive(chars: &mut Peekable<Chars<'_>>) -> Token {
    let mut raw = String::from("%");
    let mut arg_ref = ArgRef::Sequential;
    let mut flags = ConvFlags::empty();
    let mut width: Option<String> = None;
    let mut precision: Option<String> = None;
    let mut length: Option<String> = None;
    let mut conversion: Option<char> = None;
    // Digits right after `%` are held back until `$` (positional index) or
    // anything else (re-read as zero-pad flags plus width) decides them.
    let mut leading_digits = String::new();
    let mut state = State::AtPercent;

    while let Some(&c) = chars.peek() {
        match state {
            State::AtPercent => {
                if c == '%' && raw.len() == 1 {
                    chars.next();
                    return Token::PercentLiteral;
                }
                if c.is_ascii_digit() {
                    chars.next();
                    raw.push(c);
                    leading_digits.push(c);
                    continue;
                }
                if c == '$' && !leading_digits.is_empty() {
                    chars.next();
                    raw.push(c);
                    // An index too large for usize can never be in range, so
                    // it degrades the same way any out-of-range index does.
                    let index = leading_digits.parse::<usize>().unwrap_or(usize::MAX);
                    arg_ref = ArgRef::Positional(index);
                    leading_digits.clear();
                    state = State::InFlags;
                    continue;
                }
                spill_leading_digits(&mut leading_digits, &mut flags, &mut width);
                state = if width.is_some() {
                    State::InWidth
                } else {
                    State::InFlags
                };
                // `c` is not consumed; the next iteration re-reads it in the
                // new state.
            }
            State::InFlags => {
                chars.next();
                raw.push(c);
                if let Some(flag) = ConvFlags::from_char(c) {
                    flags |= flag;
                } else if c.is_ascii_digit() {
                    width.get_or_insert_with(String::new).push(c);
                    state = State::InWidth;
                } else if c == '.' {
                    precision = Some(String::new());
                    state = State::InPrecision;
                } else if is_length_modifier(c) {
                    length.get_or_insert_with(String::new).push(c);
                    state = State::InLength;
                } else {
                    conversion = Some(c);
                    break;
                }
            }
            State::InWidth => {
                chars.next();
                raw.push(c);
                if c.is_ascii_digit() {
                    width.get_or_insert_with(String::new).push(c);
                } else if c == '.' {
                    precision = Some(String::new());
                    state = State::InPrecision;
                } else if is_length_modifier(c) {
                    length.get_or_insert_with(String::new).push(c);
                    state = State::InLength;
                } else {
                    conversion = Some(c);
                    break;
                }
            }
            State::InPrecision => {
                chars.next();
                raw.push(c);
                if c.is_ascii_digit() {
                    precision.get_or_insert_with(String::new).push(c);
                } else if is_length_modifier(c) {
                    length.get_or_insert_with(String::new).push(c);
                    state = State::InLength;
                } else {
                    conversion = Some(c);
                    break;
                }
            }
            State::InLength => {
                chars.next();
                raw.push(c);
                if is_length_modifier(c) {
                    length.get_or_insert_with(String::new).push(c);
                } else {
                    conversion = Some(c);
                    break;
                }
            }
        }
    }

    match conversion {
        Some(conversion) => Token::Directive(Directive {
            arg_ref,
            flags,
            width,
            precision,
            length,
            conversion,
            raw,
        }),
        // End of input mid-directive: hand the raw text back as-is.
        None => Token::Unterminated { raw, arg_ref },
    }
}

/// Re-reads digits held after `%` once `$` is ruled out: leading zeros are
/// zero-pad flags, the rest is the width.
fn spill_leading_digits(digits: &mut String, flags: &mut ConvFlags, width: &mut Option<String>) {
    if digits.is_empty() {
        return;
    }
    let rest = digits.trim_start_matches('0');
    if rest.len() < digits.len() {
        *flags |= ConvFlags::ZERO_PAD;
    }
    if !rest.is_empty() {
        *width = Some(rest.to_string());
    }
    digits.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn only_directive(format: &str) -> Directive {
        let tokens = tokenize(format);
        assert_eq!(tokens.len(), 1, "expected one token for {format:?}");
        match tokens.into_iter().next() {
            Some(Token::Directive(directive)) => directive,
            other => panic!("expected directive for {format:?}, got {other:?}"),
        }
    }

    // =========================================================================
    // Literal runs and percent literals
    // =========================================================================

    #[test]
    fn plain_text_is_one_literal() {
        assert_eq!(
            tokenize("no directives here"),
            vec![Token::Literal("no directives here".into())]
        );
    }

    #[test]
    fn double_percent_is_literal() {
        assert_eq!(
            tokenize("100%% done"),
            vec![
                Token::Literal("100".into()),
                Token::PercentLiteral,
                Token::Literal(" done".into()),
            ]
        );
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
    }

    // =========================================================================
    // Argument references
    // =========================================================================

    #[test]
    fn bare_conversion_is_sequential() {
        let directive = only_directive("%s");
        assert_eq!(directive.arg_ref, ArgRef::Sequential);
        assert_eq!(directive.conversion, 's');
    }

    #[test]
    fn digits_dollar_is_positional() {
        let directive = only_directive("%2$s");
        assert_eq!(directive.arg_ref, ArgRef::Positional(2));
        assert_eq!(directive.raw_text(), "%2$s");
    }

    #[test]
    fn positional_index_keeps_leading_zeros_in_raw() {
        let directive = only_directive("%01$s");
        assert_eq!(directive.arg_ref, ArgRef::Positional(1));
        assert_eq!(directive.raw_text(), "%01$s");
    }

    #[test]
    fn mixed_stream_keeps_order() {
        let tokens = tokenize("%2$s has %1$d apples");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].raw_text(), "%2$s");
        assert_eq!(tokens[1].raw_text(), " has ");
        assert_eq!(tokens[2].raw_text(), "%1$d");
        assert_eq!(tokens[3].raw_text(), " apples");
    }

    // =========================================================================
    // Flags, width, precision, length
    // =========================================================================

    #[test]
    fn full_field_breakdown() {
        let directive = only_directive("%-+5.2f");
        assert_eq!(
            directive.flags,
            ConvFlags::LEFT_ALIGN | ConvFlags::FORCE_SIGN
        );
        assert_eq!(directive.width.as_deref(), Some("5"));
        assert_eq!(directive.precision.as_deref(), Some("2"));
        assert_eq!(directive.conversion, 'f');
    }

    #[test]
    fn leading_zero_before_width_is_a_flag() {
        let directive = only_directive("%05d");
        assert_eq!(directive.flags, ConvFlags::ZERO_PAD);
        assert_eq!(directive.width.as_deref(), Some("5"));

        let directive = only_directive("%010d");
        assert_eq!(directive.flags, ConvFlags::ZERO_PAD);
        assert_eq!(directive.width.as_deref(), Some("10"));
    }

    #[test]
    fn zeros_only_leave_no_width() {
        let directive = only_directive("%00d");
        assert_eq!(directive.flags, ConvFlags::ZERO_PAD);
        assert_eq!(directive.width, None);
    }

    #[test]
    fn bare_dot_is_zero_precision() {
        let directive = only_directive("%.f");
        assert_eq!(directive.precision.as_deref(), Some(""));
    }

    #[test]
    fn grouping_and_space_flags() {
        assert_eq!(only_directive("%'d").flags, ConvFlags::GROUPING);
        assert_eq!(only_directive("% d").flags, ConvFlags::SPACE_SIGN);
    }

    #[test]
    fn length_modifiers_accumulate() {
        assert_eq!(only_directive("%ld").length.as_deref(), Some("l"));
        assert_eq!(only_directive("%hhd").length.as_deref(), Some("hh"));
        assert_eq!(only_directive("%Lf").length.as_deref(), Some("L"));
    }

    #[test]
    fn flags_after_positional_prefix() {
        let directive = only_directive("%1$-7s");
        assert_eq!(directive.arg_ref, ArgRef::Positional(1));
        assert_eq!(directive.flags, ConvFlags::LEFT_ALIGN);
        assert_eq!(directive.width.as_deref(), Some("7"));
    }

    // =========================================================================
    // Permissive termination
    // =========================================================================

    #[test]
    fn unknown_conversion_still_terminates() {
        assert_eq!(only_directive("%k").conversion, 'k');
        // `q` alone is a length-modifier start, not a conversion.
        assert_eq!(
            tokenize("%q"),
            vec![Token::Unterminated {
                raw: "%q".into(),
                arg_ref: ArgRef::Sequential,
            }]
        );
    }

    #[test]
    fn width_then_percent_is_a_conversion() {
        // `%5%` is a width-5 directive whose conversion is `%`, not the
        // two-character percent literal.
        let directive = only_directive("%5%");
        assert_eq!(directive.width.as_deref(), Some("5"));
        assert_eq!(directive.conversion, '%');
    }

    #[test]
    fn unterminated_at_end_is_literal() {
        assert_eq!(
            tokenize("%"),
            vec![Token::Unterminated {
                raw: "%".into(),
                arg_ref: ArgRef::Sequential,
            }]
        );
        assert_eq!(
            tokenize("trail %-"),
            vec![
                Token::Literal("trail ".into()),
                Token::Unterminated {
                    raw: "%-".into(),
                    arg_ref: ArgRef::Sequential,
                },
            ]
        );
    }

    #[test]
    fn unterminated_positional_remembers_its_index() {
        assert_eq!(
            tokenize("%5$"),
            vec![Token::Unterminated {
                raw: "%5$".into(),
                arg_ref: ArgRef::Positional(5),
            }]
        );
    }

    // =========================================================================
    // Classification
    // =========================================================================

    #[test]
    fn decimal_conversions_classify_numeric() {
        for conv in ['f', 'F', 'e', 'E', 'g', 'G'] {
            let format = format!("%{conv}");
            assert!(only_directive(&format).is_numeric_decimal(), "{conv}");
        }
        for conv in ['d', 'i', 'u', 'o', 'x', 'X', 's', 'c', 'k'] {
            let format = format!("%{conv}");
            assert!(!only_directive(&format).is_numeric_decimal(), "{conv}");
        }
    }

    #[test]
    fn float_length_modifiers_stay_in_the_class() {
        assert!(only_directive("%lf").is_numeric_decimal());
        assert!(only_directive("%Lg").is_numeric_decimal());
        assert!(only_directive("%hf").is_numeric_decimal());
        assert!(!only_directive("%ld").is_numeric_decimal());
    }

    #[test]
    fn integer_only_length_modifiers_leave_the_class() {
        for format in ["%jf", "%qf", "%tf", "%zf", "%jG"] {
            assert!(!only_directive(format).is_numeric_decimal(), "{format}");
        }
        // One integer-only modifier anywhere in the run takes it out.
        assert!(!only_directive("%ljf").is_numeric_decimal());
    }

    // =========================================================================
    // Sequential re-emission
    // =========================================================================

    #[test]
    fn emit_drops_positional_prefix() {
        let directive = only_directive("%2$'-10.3lf");
        assert_eq!(directive.emit_sequential(true), "%-'10.3lf");
    }

    #[test]
    fn emit_strips_unsupported_grouping() {
        let directive = only_directive("%'d");
        assert_eq!(directive.emit_sequential(true), "%'d");
        assert_eq!(directive.emit_sequential(false), "%d");
    }

    #[test]
    fn emit_reconstructs_zero_pad_width() {
        let directive = only_directive("%010d");
        assert_eq!(directive.emit_sequential(true), "%010d");
    }

    // =========================================================================
    // Properties
    // =========================================================================

    fn reconstruct(tokens: &[Token]) -> String {
        tokens.iter().map(Token::raw_text).collect()
    }

    proptest! {
        #[test]
        fn tokenize_is_total(format in ".*") {
            let _ = tokenize(&format);
        }

        #[test]
        fn tokenize_is_lossless(format in ".*") {
            let tokens = tokenize(&format);
            prop_assert_eq!(reconstruct(&tokens), format);
        }

        #[test]
        fn generated_directives_scan_as_one_token(
            flags in proptest::sample::subsequence(vec!['-', '+', '0', '\'', '#'], 0..=5),
            width in proptest::option::of(1u32..10_000),
            precision in proptest::option::of(0u32..10_000),
            conv in proptest::sample::select(vec!['d', 'i', 's', 'c', 'x', 'f', 'e', 'G']),
        ) {
            let mut format = String::from("%");
            format.extend(flags.iter());
            if let Some(width) = width {
                format.push_str(&width.to_string());
            }
            if let Some(precision) = precision {
                format.push('.');
                format.push_str(&precision.to_string());
            }
            format.push(conv);
            let directive = only_directive(&format);
            prop_assert_eq!(directive.conversion, conv);
            prop_assert_eq!(directive.arg_ref, ArgRef::Sequential);
        }
    }
}
