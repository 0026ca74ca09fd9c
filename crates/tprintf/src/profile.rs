//! Locale probing for the native formatter.
//!
//! The formatter runs in whatever locale the process inherited, so its
//! decimal separator is discovered rather than assumed: `%.1f` of `1`
//! renders as `1<sep>0`, and whatever sits between the digits is the
//! separator. A separator is only trusted if the formatter can also read
//! it back (`1<sep>2` must re-render as itself); a formatter that prints
//! a separator it cannot parse falls back to the period. Grouping support
//! is probed by checking that the `'` flag renders `0` untouched.
//!
//! Every probe fails open to the period-and-no-grouping default. Probing
//! costs up to three formatter runs, so callers cache the result.

use tprintf_core::EmitOptions;

use crate::native::NativeFormatter;

const DEFAULT_DECIMAL_POINT: char = '.';

/// Numeric conventions of the active native formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleNumericProfile {
    /// Separator the formatter prints and parses in decimal values.
    pub decimal_point: char,
    /// Whether the `'` grouping flag is honored.
    pub grouping_supported: bool,
}

impl Default for LocaleNumericProfile {
    fn default() -> Self {
        Self {
            decimal_point: DEFAULT_DECIMAL_POINT,
            grouping_supported: false,
        }
    }
}

impl LocaleNumericProfile {
    /// Probes the formatter's numeric conventions.
    #[must_use]
    pub fn detect(native: &dyn NativeFormatter) -> Self {
        let profile = Self {
            decimal_point: probe_decimal_point(native),
            grouping_supported: probe_grouping(native),
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(
            decimal_point = %profile.decimal_point,
            grouping = profile.grouping_supported,
            "probed numeric profile"
        );
        profile
    }

    /// Emission settings matching this profile.
    #[must_use]
    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            decimal_point: self.decimal_point,
            grouping_supported: self.grouping_supported,
        }
    }
}

fn probe_decimal_point(native: &dyn NativeFormatter) -> char {
    let Ok(rendered) = native.render("%.1f", &["1".to_string()]) else {
        return DEFAULT_DECIMAL_POINT;
    };
    let Some(separator) = isolate_separator(&rendered) else {
        return DEFAULT_DECIMAL_POINT;
    };
    if separator == DEFAULT_DECIMAL_POINT {
        return separator;
    }
    // Decimal arguments are handed back carrying this separator, so the
    // formatter must parse its own output, not just print it.
    let round_trip = format!("1{separator}2");
    match native.render("%.1f", &[round_trip.clone()]) {
        Ok(echoed) if echoed == round_trip => separator,
        _ => DEFAULT_DECIMAL_POINT,
    }
}

/// Extracts the one character between the digits of a `1<sep>0` rendering.
fn isolate_separator(rendered: &str) -> Option<char> {
    let body = rendered.strip_prefix('1')?.strip_suffix('0')?;
    let mut chars = body.chars();
    let separator = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(separator)
}

fn probe_grouping(native: &dyn NativeFormatter) -> bool {
    matches!(native.render("%'d", &["0".to_string()]), Ok(out) if out == "0")
}
