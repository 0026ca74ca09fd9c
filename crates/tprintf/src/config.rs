//! Environment configuration inputs.
//!
//! Lookup behavior follows the standard gettext environment. The variables
//! are captured once into a plain snapshot at engine construction, so the
//! decision logic stays a pure function of its inputs and tests never have
//! to touch the real process environment.
//!
//! | Variable | Effect |
//! |---|---|
//! | `TEXTDOMAIN` | default text domain for lookups |
//! | `TEXTDOMAINDIR` | catalog directory forwarded to the resolver tools |

use std::env;

/// Environment variables consumed at engine construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvInputs {
    pub textdomain: Option<String>,
    pub textdomain_dir: Option<String>,
}

impl EnvInputs {
    /// Captures the live process environment. Unset and empty values are
    /// both treated as absent, matching how the gettext tools read them.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            textdomain: non_empty(env::var("TEXTDOMAIN").ok()),
            textdomain_dir: non_empty(env::var("TEXTDOMAINDIR").ok()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_empty() {
        let inputs = EnvInputs::default();
        assert_eq!(inputs.textdomain, None);
        assert_eq!(inputs.textdomain_dir, None);
    }

    #[test]
    fn empty_values_count_as_absent() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("msgs".into())), Some("msgs".into()));
        assert_eq!(non_empty(None), None);
    }
}
