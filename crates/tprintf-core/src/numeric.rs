//! Locale-sensitive decimal separator rewriting.
//!
//! Decimal arguments may spell their separator three ways: the Arabic
//! decimal separator, a comma, or a period. Before the native formatter
//! parses the value, the first such occurrence is rewritten to the decimal
//! point the runtime actually uses, so the formatter's locale-aware input
//! parsing and the engine's output agree. The rewrite touches exactly one
//! occurrence; everything else in the argument passes through untouched.

use std::borrow::Cow;

/// U+066B, the Arabic decimal separator.
pub const ARABIC_DECIMAL_SEPARATOR: char = '\u{66b}';

/// Separator symbols recognized in decimal arguments, in priority order:
/// the first symbol present (by this order, not by position in the text)
/// is the one remapped.
pub const SEPARATOR_PRIORITY: [char; 3] = [ARABIC_DECIMAL_SEPARATOR, ',', '.'];

/// Replaces the first recognized decimal separator in `value` with
/// `decimal_point`. Text without a recognized separator, and text whose
/// separator already is the active decimal point, is returned borrowed.
#[must_use]
pub fn remap_decimal_separator(value: &str, decimal_point: char) -> Cow<'_, str> {
    for separator in SEPARATOR_PRIORITY {
        let Some(pos) = value.find(separator) else {
            continue;
        };
        if separator == decimal_point {
            return Cow::Borrowed(value);
        }
        let mut out = String::with_capacity(value.len() + decimal_point.len_utf8());
        out.push_str(&value[..pos]);
        out.push(decimal_point);
        out.push_str(&value[pos + separator.len_utf8()..]);
        return Cow::Owned(out);
    }
    Cow::Borrowed(value)
}
