//! Argument binding and format rewriting.
//!
//! The token stream from [`tokenize`] still names arguments two ways:
//! positional `N$` references and implicit sequential slots. Binding resolves
//! both against the call-time argument count, producing a stream where every
//! surviving directive carries an explicit value reference and every
//! unbindable directive has been demoted to inert literal text. The bound
//! stream then emits the collaborator-facing call: a sequential-only format
//! string with `%` re-escaped in literal runs, plus the projected argument
//! values in slot order.
//!
//! # Binding rules
//!
//! | Reference | In range | Out of range |
//! |---|---|---|
//! | `%N$...` | binds argument N eagerly | whole directive stays literal |
//! | `%...` (sequential) | binds the next cursor slot | binds the empty value |
//! | `%%` | no argument, literal `%` | n/a |
//! | unterminated | stays literal; a sequential start still advances the cursor | n/a |
//!
//! The sequential cursor advances exactly once per sequential `%`-start,
//! bound or not, keeping later sequential directives aligned with the
//! remaining call arguments. Positional and sequential references never
//! disturb each other: `%2$s %s` with `["a", "b"]` renders `b a`.

use smallvec::SmallVec;

use crate::directive::{ArgRef, Directive, Token, tokenize};
use crate::numeric::remap_decimal_separator;

/// Where a bound directive takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundValue {
    /// Index into the caller's argument list (0-indexed).
    Arg(usize),
    /// The empty value: a sequential directive past the last argument.
    Empty,
}

/// One piece of a bound format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// Text that reaches the output as-is: literal runs, the `%` of `%%`,
    /// and directives demoted to literal text.
    Literal(String),
    /// A directive bound to an explicit value.
    Bound(Directive, BoundValue),
}

/// A format string with every argument reference resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundFormat {
    pieces: SmallVec<[Piece; 8]>,
}

/// Rendering options resolved from the runtime numeric profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitOptions {
    /// The active locale decimal point decimal arguments are remapped to.
    pub decimal_point: char,
    /// Whether the native formatter accepts the `'` grouping flag.
    pub grouping_supported: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            decimal_point: '.',
            grouping_supported: false,
        }
    }
}

/// The rewritten format string and projected arguments for one native
/// formatter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCall {
    /// Sequential-only format text; literal `%` re-escaped as `%%`.
    pub format: String,
    /// Argument values in directive order; decimal values already remapped
    /// to the active decimal point.
    pub args: Vec<String>,
}

/// Resolves every argument reference in `format` against `arg_count`
/// available call arguments. Total: any input produces a bound stream.
#[must_use]
pub fn bind(format: &str, arg_count: usize) -> BoundFormat {
    let mut pieces: SmallVec<[Piece; 8]> = SmallVec::new();
    let mut cursor = 0usize;
    for token in tokenize(format) {
        match token {
            Token::Literal(text) => push_literal(&mut pieces, text),
            Token::PercentLiteral => push_literal(&mut pieces, "%".to_string()),
            Token::Directive(directive) => match directive.arg_ref {
                ArgRef::Positional(index) => {
                    if (1..=arg_count).contains(&index) {
                        pieces.push(Piece::Bound(directive, BoundValue::Arg(index - 1)));
                    } else {
                        push_literal(&mut pieces, directive.raw_text().to_string());
                    }
                }
                ArgRef::Sequential => {
                    let value = if cursor < arg_count {
                        BoundValue::Arg(cursor)
                    } else {
                        BoundValue::Empty
                    };
                    cursor += 1;
                    pieces.push(Piece::Bound(directive, value));
                }
            },
            Token::Unterminated { raw, arg_ref } => {
                if arg_ref == ArgRef::Sequential {
                    cursor += 1;
                }
                push_literal(&mut pieces, raw);
            }
        }
    }
    BoundFormat { pieces }
}

fn push_literal(pieces: &mut SmallVec<[Piece; 8]>, text: String) {
    if let Some(Piece::Literal(last)) = pieces.last_mut() {
        last.push_str(&text);
    } else {
        pieces.push(Piece::Literal(text));
    }
}

impl BoundFormat {
    /// Number of pieces (merged literal runs plus bound directives).
    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// The bound pieces in output order.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter()
    }

    /// Projects `args` through the bound stream into one native formatter
    /// call.
    ///
    /// `args` must be the list whose length was given to [`bind`]; a shorter
    /// list degrades the missing slots to empty values. Arguments no
    /// directive consumed are dropped here.
    #[must_use]
    pub fn to_native_call(&self, args: &[&str], opts: &EmitOptions) -> NativeCall {
        let mut format = String::new();
        let mut projected = Vec::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => push_escaped(&mut format, text),
                Piece::Bound(directive, value) => {
                    format.push_str(&directive.emit_sequential(opts.grouping_supported));
                    let raw_value = match value {
                        BoundValue::Arg(index) => args.get(*index).copied().unwrap_or(""),
                        BoundValue::Empty => "",
                    };
                    let value = if directive.is_numeric_decimal() {
                        remap_decimal_separator(raw_value, opts.decimal_point).into_owned()
                    } else {
                        raw_value.to_string()
                    };
                    projected.push(value);
                }
            }
        }
        NativeCall {
            format,
            args: projected,
        }
    }
}

/// Escapes literal text for the native formatter, which treats `%` as a
/// directive introducer unless doubled.
fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn native(format: &str, args: &[&str]) -> NativeCall {
        bind(format, args.len()).to_native_call(args, &EmitOptions::default())
    }

    // =========================================================================
    // Binding
    // =========================================================================

    #[test]
    fn positional_binds_to_the_original_list() {
        let call = native("%2$s has %1$d apples", &["3", "Ken"]);
        assert_eq!(call.format, "%s has %d apples");
        assert_eq!(call.args, ["Ken", "3"]);
    }

    #[test]
    fn sequential_consumes_in_scan_order() {
        let call = native("%s, %s and %s", &["a", "b", "c"]);
        assert_eq!(call.format, "%s, %s and %s");
        assert_eq!(call.args, ["a", "b", "c"]);
    }

    #[test]
    fn sequential_exhausted_binds_empty() {
        let call = native("%s and %s", &["Ann"]);
        assert_eq!(call.format, "%s and %s");
        assert_eq!(call.args, ["Ann", ""]);
    }

    #[test]
    fn positional_out_of_range_stays_literal() {
        let call = native("%5$s", &["a", "b"]);
        assert_eq!(call.format, "%%5$s");
        assert!(call.args.is_empty());
    }

    #[test]
    fn positional_zero_is_out_of_range() {
        let call = native("%0$s", &["a"]);
        assert_eq!(call.format, "%%0$s");
        assert!(call.args.is_empty());
    }

    #[test]
    fn positional_does_not_move_the_sequential_cursor() {
        // The cursor is independent of positional references: both kinds can
        // name the same argument.
        let call = native("%2$s %s %s", &["a", "b", "c"]);
        assert_eq!(call.format, "%s %s %s");
        assert_eq!(call.args, ["b", "a", "b"]);
    }

    #[test]
    fn percent_literal_consumes_nothing() {
        let call = native("100%% done", &[]);
        assert_eq!(call.format, "100%% done");
        assert!(call.args.is_empty());
    }

    #[test]
    fn extra_arguments_are_dropped() {
        let call = native("%s", &["a", "b", "c"]);
        assert_eq!(call.args, ["a"]);
    }

    #[test]
    fn trailing_unterminated_directive_stays_literal() {
        let call = native("%s %", &["a", "b"]);
        assert_eq!(call.format, "%s %%");
        assert_eq!(call.args, ["a"]);
    }

    #[test]
    fn empty_format_binds_to_nothing() {
        let call = native("", &["a"]);
        assert_eq!(call.format, "");
        assert!(call.args.is_empty());
    }

    #[test]
    fn adjacent_literals_merge() {
        let bound = bind("a%%b%9$sc", 0);
        assert_eq!(bound.len(), 1);
        let pieces: Vec<_> = bound.pieces().collect();
        assert_eq!(pieces[0], &Piece::Literal("a%b%9$sc".to_string()));
    }

    // =========================================================================
    // Emission
    // =========================================================================

    #[test]
    fn decimal_arguments_are_remapped() {
        let opts = EmitOptions {
            decimal_point: ',',
            grouping_supported: false,
        };
        let call = bind("%f", 1).to_native_call(&["3.14"], &opts);
        assert_eq!(call.args, ["3,14"]);
    }

    #[test]
    fn non_decimal_arguments_pass_through() {
        let opts = EmitOptions {
            decimal_point: ',',
            grouping_supported: false,
        };
        let call = bind("%s %d", 2).to_native_call(&["3.14", "1.5"], &opts);
        assert_eq!(call.args, ["3.14", "1.5"]);
    }

    #[test]
    fn integer_length_modifier_skips_the_remap() {
        let opts = EmitOptions {
            decimal_point: ',',
            grouping_supported: false,
        };
        let call = bind("%jf %f", 2).to_native_call(&["1.5", "2.5"], &opts);
        assert_eq!(call.args, ["1.5", "2,5"]);
    }

    #[test]
    fn grouping_flag_follows_support() {
        let supported = EmitOptions {
            decimal_point: '.',
            grouping_supported: true,
        };
        let stripped = EmitOptions::default();
        assert_eq!(bind("%'d", 1).to_native_call(&["9"], &supported).format, "%'d");
        assert_eq!(bind("%'d", 1).to_native_call(&["9"], &stripped).format, "%d");
    }

    #[test]
    fn literal_percent_is_escaped_for_the_native_call() {
        let call = native("50%% of %s", &["it"]);
        assert_eq!(call.format, "50%% of %s");
    }

    // =========================================================================
    // Properties
    // =========================================================================

    proptest! {
        #[test]
        fn bind_is_total(format in ".*", count in 0usize..8) {
            let _ = bind(&format, count);
        }

        #[test]
        fn projection_matches_bound_directives(format in ".*", count in 0usize..8) {
            let bound = bind(&format, count);
            let args: Vec<String> = (0..count).map(|i| i.to_string()).collect();
            let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
            let call = bound.to_native_call(&arg_refs, &EmitOptions::default());
            let bound_count = bound
                .pieces()
                .filter(|p| matches!(p, Piece::Bound(..)))
                .count();
            prop_assert_eq!(call.args.len(), bound_count);
        }

        #[test]
        fn sequential_slots_are_consumed_in_order(format in ".*", count in 0usize..8) {
            let mut expected = 0usize;
            for piece in bind(&format, count).pieces() {
                if let Piece::Bound(directive, value) = piece {
                    if directive.arg_ref == ArgRef::Sequential {
                        match value {
                            BoundValue::Arg(index) => {
                                prop_assert_eq!(*index, expected);
                                prop_assert!(*index < count);
                            }
                            BoundValue::Empty => prop_assert!(expected >= count),
                        }
                        expected += 1;
                    }
                }
            }
        }
    }
}
