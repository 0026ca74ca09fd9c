//! The message resolution collaborator.
//!
//! Catalog lookup is delegated to gettext-compatible tools outside the
//! process. The four lookup variants (plain, plural, context-qualified, and
//! context-qualified plural) share one descriptor table and one dispatcher
//! rather than four hand-written code paths; a variant differs only in
//! whether a context and/or a plural form participates.
//!
//! Context is packed as `msgctxt EOT msgid` (U+0004), the gettext shell
//! convention for tools that take a single key argument. A reply still
//! containing the separator means the catalog had no entry, and the lookup
//! reports "no translation" so the engine can fall back to the bare key.

use std::process::Command;

use crate::error::{CollaboratorError, CollaboratorErrorKind};

/// Separator packing a context and key into one lookup argument (U+0004).
pub const CONTEXT_SEPARATOR: char = '\u{4}';

/// The plural half of a lookup: the untranslated plural form and the count
/// that selects between forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluralQuery<'a> {
    pub msgid_plural: &'a str,
    pub n: u64,
}

/// A translation lookup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageQuery<'a> {
    pub msgid: &'a str,
    pub msgctxt: Option<&'a str>,
    pub plural: Option<PluralQuery<'a>>,
}

/// The catalog lookup collaborator.
///
/// `Ok(None)` means "no translation". Errors are treated the same way by
/// the engine (logged, then verbatim fallback): a missing resolver must
/// never take formatting down.
pub trait MessageResolver {
    fn resolve(&self, query: &MessageQuery<'_>) -> Result<Option<String>, CollaboratorError>;
}

/// Parameter shape of one lookup variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupShape {
    /// Conventional name of the variant.
    pub name: &'static str,
    pub takes_context: bool,
    pub takes_plural: bool,
}

/// Every lookup variant the engine dispatches, indexed by
/// `context_bit * 2 + plural_bit`.
pub const LOOKUP_SHAPES: [LookupShape; 4] = [
    LookupShape {
        name: "gettext",
        takes_context: false,
        takes_plural: false,
    },
    LookupShape {
        name: "ngettext",
        takes_context: false,
        takes_plural: true,
    },
    LookupShape {
        name: "pgettext",
        takes_context: true,
        takes_plural: false,
    },
    LookupShape {
        name: "npgettext",
        takes_context: true,
        takes_plural: true,
    },
];

impl LookupShape {
    /// The shape a query dispatches through.
    #[must_use]
    pub fn of(query: &MessageQuery<'_>) -> &'static LookupShape {
        let index =
            usize::from(query.msgctxt.is_some()) * 2 + usize::from(query.plural.is_some());
        &LOOKUP_SHAPES[index]
    }
}

/// Spawns the platform gettext-family tools for lookups.
///
/// Plain and context lookups run the `gettext` command; plural lookups run
/// `ngettext` with the packed key, the bare plural form, and the count.
/// Exit failure and non-UTF-8 replies degrade to "no translation"; only a
/// spawn failure is reported as an error.
#[derive(Debug, Clone)]
pub struct CommandResolver {
    gettext_command: String,
    ngettext_command: String,
    domain: Option<String>,
    domain_dir: Option<String>,
}

impl CommandResolver {
    pub const DEFAULT_GETTEXT: &'static str = "gettext";
    pub const DEFAULT_NGETTEXT: &'static str = "ngettext";

    #[must_use]
    pub fn new(
        gettext_command: impl Into<String>,
        ngettext_command: impl Into<String>,
    ) -> Self {
        Self {
            gettext_command: gettext_command.into(),
            ngettext_command: ngettext_command.into(),
            domain: None,
            domain_dir: None,
        }
    }

    /// Restricts lookups to one text domain (`-d` on the spawned tools).
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Overrides `TEXTDOMAINDIR` for the spawned tools.
    #[must_use]
    pub fn with_domain_dir(mut self, dir: impl Into<String>) -> Self {
        self.domain_dir = Some(dir.into());
        self
    }

    /// The command a query of this shape runs.
    fn command_for(&self, shape: &LookupShape) -> &str {
        if shape.takes_plural {
            &self.ngettext_command
        } else {
            &self.gettext_command
        }
    }
}

impl Default for CommandResolver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GETTEXT, Self::DEFAULT_NGETTEXT)
    }
}

impl MessageResolver for CommandResolver {
    fn resolve(&self, query: &MessageQuery<'_>) -> Result<Option<String>, CollaboratorError> {
        let shape = LookupShape::of(query);
        let command_name = self.command_for(shape);
        let key = match query.msgctxt {
            Some(ctx) => format!("{ctx}{CONTEXT_SEPARATOR}{}", query.msgid),
            None => query.msgid.to_string(),
        };

        let mut command = Command::new(command_name);
        if let Some(domain) = &self.domain {
            command.arg("-d").arg(domain);
        }
        if let Some(dir) = &self.domain_dir {
            command.env("TEXTDOMAINDIR", dir);
        }
        command.arg("--").arg(&key);
        if let Some(plural) = &query.plural {
            command.arg(plural.msgid_plural).arg(plural.n.to_string());
        }

        let output = command.output().map_err(|e| {
            CollaboratorError::new(command_name, CollaboratorErrorKind::Spawn(e))
        })?;
        if !output.status.success() {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                command = %command_name,
                variant = shape.name,
                code = ?output.status.code(),
                "lookup tool exited non-zero; treating as untranslated"
            );
            return Ok(None);
        }
        let Ok(text) = String::from_utf8(output.stdout) else {
            return Ok(None);
        };
        // An untranslated packed key comes back with the separator intact.
        if query.msgctxt.is_some() && text.contains(CONTEXT_SEPARATOR) {
            return Ok(None);
        }
        Ok(Some(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query<'a>(
        msgid: &'a str,
        msgctxt: Option<&'a str>,
        plural: Option<PluralQuery<'a>>,
    ) -> MessageQuery<'a> {
        MessageQuery {
            msgid,
            msgctxt,
            plural,
        }
    }

    // =========================================================================
    // Shape dispatch
    // =========================================================================

    #[test]
    fn shapes_cover_all_four_variants() {
        let plural = PluralQuery {
            msgid_plural: "things",
            n: 2,
        };
        assert_eq!(LookupShape::of(&query("m", None, None)).name, "gettext");
        assert_eq!(
            LookupShape::of(&query("m", None, Some(plural))).name,
            "ngettext"
        );
        assert_eq!(
            LookupShape::of(&query("m", Some("menu"), None)).name,
            "pgettext"
        );
        assert_eq!(
            LookupShape::of(&query("m", Some("menu"), Some(plural))).name,
            "npgettext"
        );
    }

    #[test]
    fn plural_shapes_run_the_plural_command() {
        let resolver = CommandResolver::new("g", "ng");
        for shape in &LOOKUP_SHAPES {
            let expected = if shape.takes_plural { "ng" } else { "g" };
            assert_eq!(resolver.command_for(shape), expected, "{}", shape.name);
        }
    }

    // =========================================================================
    // Spawn failure
    // =========================================================================

    #[test]
    fn missing_tool_reports_spawn_error() {
        let resolver =
            CommandResolver::new("tprintf-test-no-such-tool", "tprintf-test-no-such-tool");
        let error = resolver
            .resolve(&query("hello", None, None))
            .expect_err("missing tool must error");
        assert_eq!(error.command(), "tprintf-test-no-such-tool");
    }
}
