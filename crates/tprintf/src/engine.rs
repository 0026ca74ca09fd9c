//! Formatting entry points.
//!
//! [`Engine`] owns the two collaborator handles and the cached numeric
//! profile, and glues the pure pipeline together: translate the key,
//! tokenize and bind the resulting format string, remap decimal separators
//! in the bound arguments, then hand one sequential-only format plus the
//! projected argument list to the native formatter. Every intermediate
//! value lives on the call stack; the profile cache is the only state
//! shared across calls, and it is rewritten only by explicit re-detection.

use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tprintf_core::{bind, decode_escapes};

use crate::config::EnvInputs;
use crate::error::FormatError;
use crate::native::{CommandFormatter, NativeFormatter};
use crate::profile::LocaleNumericProfile;
use crate::resolver::{CommandResolver, MessageQuery, MessageResolver, PluralQuery};

/// Trailing-newline policy of the printing entry points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NewlineMode {
    /// Terminate the line unless the rendered text already does.
    #[default]
    Append,
    /// Emit the rendered text exactly as produced.
    Suppress,
    /// Terminate the line even if the rendered text already does.
    Force,
}

impl NewlineMode {
    /// Whether a newline follows `rendered` under this mode.
    #[must_use]
    pub fn appends_newline(self, rendered: &str) -> bool {
        match self {
            Self::Append => !rendered.ends_with('\n'),
            Self::Suppress => false,
            Self::Force => true,
        }
    }
}

/// How a message key is prepared before lookup.
///
/// Keys are used completely literally unless decoding is requested, in
/// which case backslash escapes are decoded first and the decoded text is
/// both the catalog key and the fallback output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyForm {
    #[default]
    Literal,
    DecodeEscapes,
}

/// One translation lookup, assembled with builder calls.
///
/// ```
/// use tprintf::{KeyForm, LookupRequest};
///
/// let request = LookupRequest::new("Here is %d apple.")
///     .with_plural("Here are %d apples.", 3)
///     .with_key_form(KeyForm::Literal);
/// # let _ = request;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LookupRequest<'a> {
    msgid: &'a str,
    msgctxt: Option<&'a str>,
    plural: Option<(&'a str, u64)>,
    key_form: KeyForm,
}

impl<'a> LookupRequest<'a> {
    #[must_use]
    pub fn new(msgid: &'a str) -> Self {
        Self {
            msgid,
            msgctxt: None,
            plural: None,
            key_form: KeyForm::Literal,
        }
    }

    /// Adds a plural form and the count that selects between forms.
    #[must_use]
    pub fn with_plural(mut self, msgid_plural: &'a str, n: u64) -> Self {
        self.plural = Some((msgid_plural, n));
        self
    }

    /// Adds a disambiguating context.
    #[must_use]
    pub fn with_context(mut self, msgctxt: &'a str) -> Self {
        self.msgctxt = Some(msgctxt);
        self
    }

    #[must_use]
    pub fn with_key_form(mut self, key_form: KeyForm) -> Self {
        self.key_form = key_form;
        self
    }

    /// The key text as looked up: decoded only when the form asks for it.
    /// Context strings are never decoded.
    fn decoded(&self, raw: &'a str) -> Cow<'a, str> {
        match self.key_form {
            KeyForm::Literal => Cow::Borrowed(raw),
            KeyForm::DecodeEscapes => Cow::Owned(decode_escapes(raw)),
        }
    }
}

/// Translation-aware formatter over two external collaborators.
///
/// One engine value holds the message resolver and the native formatter,
/// plus the lazily probed numeric profile. Formatting never fails for a
/// missing translation, a missing argument, or an out-of-range positional
/// reference; those degrade to literal or empty text. Only a native
/// formatter that cannot produce output at all surfaces an error.
pub struct Engine {
    resolver: Box<dyn MessageResolver>,
    native: Box<dyn NativeFormatter>,
    profile: RwLock<Option<LocaleNumericProfile>>,
}

impl Engine {
    #[must_use]
    pub fn new(
        resolver: impl MessageResolver + 'static,
        native: impl NativeFormatter + 'static,
    ) -> Self {
        Self {
            resolver: Box::new(resolver),
            native: Box::new(native),
            profile: RwLock::new(None),
        }
    }

    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// The active numeric profile, probed on first use and cached.
    pub fn numeric_profile(&self) -> LocaleNumericProfile {
        if let Some(profile) = *self.profile_read() {
            return profile;
        }
        let mut slot = self.profile_write();
        if let Some(profile) = *slot {
            return profile;
        }
        let profile = LocaleNumericProfile::detect(self.native.as_ref());
        *slot = Some(profile);
        profile
    }

    /// Reruns the probes and replaces the cached profile, e.g. after the
    /// surrounding locale changed.
    pub fn redetect_numeric_profile(&self) -> LocaleNumericProfile {
        let profile = LocaleNumericProfile::detect(self.native.as_ref());
        *self.profile_write() = Some(profile);
        profile
    }

    /// Substitutes `args` into `format` and returns the rendered text,
    /// without any trailing-newline handling.
    ///
    /// Positional (`%N$`) references bind against the original argument
    /// order; sequential references consume left-to-right slots. The call
    /// the native formatter sees is sequential-only, with out-of-range
    /// positional directives carried through as escaped literal text.
    pub fn format(&self, format: &str, args: &[&str]) -> Result<String, FormatError> {
        let bound = bind(format, args.len());
        let opts = self.numeric_profile().emit_options();
        let call = bound.to_native_call(args, &opts);
        self.native
            .render(&call.format, &call.args)
            .map_err(FormatError::Formatter)
    }

    /// Like [`Engine::format`], with the output terminated by a newline.
    pub fn format_line(&self, format: &str, args: &[&str]) -> Result<String, FormatError> {
        let mut text = self.format(format, args)?;
        if NewlineMode::Append.appends_newline(&text) {
            text.push('\n');
        }
        Ok(text)
    }

    /// Formats and writes to standard output.
    pub fn print(
        &self,
        format: &str,
        args: &[&str],
        newline: NewlineMode,
    ) -> Result<(), FormatError> {
        let mut stdout = io::stdout().lock();
        self.write_to(&mut stdout, format, args, newline)
    }

    /// Formats and writes to `out`, applying the newline policy.
    pub fn write_to(
        &self,
        out: &mut dyn Write,
        format: &str,
        args: &[&str],
        newline: NewlineMode,
    ) -> Result<(), FormatError> {
        let text = self.format(format, args)?;
        out.write_all(text.as_bytes()).map_err(FormatError::Output)?;
        if newline.appends_newline(&text) {
            out.write_all(b"\n").map_err(FormatError::Output)?;
        }
        Ok(())
    }

    /// Resolves one lookup request to localized text.
    ///
    /// A resolver that reports no translation, or fails outright, never
    /// fails the call: the (decoded) key itself is returned, with the
    /// plural form chosen locally by `n == 1`.
    #[must_use]
    pub fn lookup(&self, request: LookupRequest<'_>) -> String {
        let msgid = request.decoded(request.msgid);
        let plural = request
            .plural
            .map(|(text, n)| (request.decoded(text), n));
        let resolved = {
            let query = MessageQuery {
                msgid: &msgid,
                msgctxt: request.msgctxt,
                plural: plural.as_ref().map(|(text, n)| PluralQuery {
                    msgid_plural: text.as_ref(),
                    n: *n,
                }),
            };
            self.resolver.resolve(&query)
        };
        match resolved {
            Ok(Some(translated)) => translated,
            Ok(None) => untranslated(msgid, plural),
            Err(_error) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %_error, "message lookup failed; using the key verbatim");
                untranslated(msgid, plural)
            }
        }
    }

    #[must_use]
    pub fn translate(&self, msgid: &str) -> String {
        self.lookup(LookupRequest::new(msgid))
    }

    #[must_use]
    pub fn translate_plural(&self, msgid: &str, msgid_plural: &str, n: u64) -> String {
        self.lookup(LookupRequest::new(msgid).with_plural(msgid_plural, n))
    }

    #[must_use]
    pub fn translate_with_context(&self, msgctxt: &str, msgid: &str) -> String {
        self.lookup(LookupRequest::new(msgid).with_context(msgctxt))
    }

    #[must_use]
    pub fn translate_plural_with_context(
        &self,
        msgctxt: &str,
        msgid: &str,
        msgid_plural: &str,
        n: u64,
    ) -> String {
        self.lookup(
            LookupRequest::new(msgid)
                .with_context(msgctxt)
                .with_plural(msgid_plural, n),
        )
    }

    /// Translates `msgid` and formats the result with `args` in one call.
    pub fn translate_format(&self, msgid: &str, args: &[&str]) -> Result<String, FormatError> {
        let format = self.translate(msgid);
        self.format(&format, args)
    }

    /// Plural variant of [`Engine::translate_format`]. The count selects
    /// the message form; it is not substituted into the text unless it is
    /// also passed in `args`.
    pub fn translate_format_plural(
        &self,
        msgid: &str,
        msgid_plural: &str,
        n: u64,
        args: &[&str],
    ) -> Result<String, FormatError> {
        let format = self.translate_plural(msgid, msgid_plural, n);
        self.format(&format, args)
    }

    fn profile_read(&self) -> RwLockReadGuard<'_, Option<LocaleNumericProfile>> {
        self.profile.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn profile_write(&self) -> RwLockWriteGuard<'_, Option<LocaleNumericProfile>> {
        self.profile.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("profile", &*self.profile_read())
            .finish_non_exhaustive()
    }
}

/// Local plural selection when no translation exists: the count picks the
/// form, one against everything else.
fn untranslated(msgid: Cow<'_, str>, plural: Option<(Cow<'_, str>, u64)>) -> String {
    match plural {
        Some((plural_text, n)) if n != 1 => plural_text.into_owned(),
        _ => msgid.into_owned(),
    }
}

/// Assembles an [`Engine`] from command names, a text domain, and optional
/// in-process collaborators.
///
/// Command names and the domain apply to the default command-backed
/// collaborators; a collaborator injected via [`EngineBuilder::resolver`]
/// or [`EngineBuilder::native_formatter`] carries its own configuration
/// and wins over the command settings.
#[derive(Default)]
pub struct EngineBuilder {
    gettext_command: Option<String>,
    ngettext_command: Option<String>,
    formatter_command: Option<String>,
    domain: Option<String>,
    domain_dir: Option<String>,
    resolver: Option<Box<dyn MessageResolver>>,
    native: Option<Box<dyn NativeFormatter>>,
}

impl EngineBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn gettext_command(mut self, command: impl Into<String>) -> Self {
        self.gettext_command = Some(command.into());
        self
    }

    #[must_use]
    pub fn ngettext_command(mut self, command: impl Into<String>) -> Self {
        self.ngettext_command = Some(command.into());
        self
    }

    #[must_use]
    pub fn formatter_command(mut self, command: impl Into<String>) -> Self {
        self.formatter_command = Some(command.into());
        self
    }

    /// Text domain for catalog lookups. Falls back to `TEXTDOMAIN`.
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Catalog directory for lookups. Falls back to `TEXTDOMAINDIR`.
    #[must_use]
    pub fn domain_dir(mut self, dir: impl Into<String>) -> Self {
        self.domain_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn resolver(mut self, resolver: impl MessageResolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    #[must_use]
    pub fn native_formatter(mut self, native: impl NativeFormatter + 'static) -> Self {
        self.native = Some(Box::new(native));
        self
    }

    /// Builds with domain defaults taken from the process environment.
    #[must_use]
    pub fn build(self) -> Engine {
        let env = EnvInputs::from_env();
        self.build_with_env(&env)
    }

    /// Builds against an explicit environment snapshot.
    #[must_use]
    pub fn build_with_env(self, env: &EnvInputs) -> Engine {
        let domain = self.domain.or_else(|| env.textdomain.clone());
        let domain_dir = self.domain_dir.or_else(|| env.textdomain_dir.clone());
        let resolver: Box<dyn MessageResolver> = match self.resolver {
            Some(resolver) => resolver,
            None => {
                let gettext = self
                    .gettext_command
                    .unwrap_or_else(|| CommandResolver::DEFAULT_GETTEXT.to_string());
                let ngettext = self
                    .ngettext_command
                    .unwrap_or_else(|| CommandResolver::DEFAULT_NGETTEXT.to_string());
                let mut resolver = CommandResolver::new(gettext, ngettext);
                if let Some(domain) = domain {
                    resolver = resolver.with_domain(domain);
                }
                if let Some(dir) = domain_dir {
                    resolver = resolver.with_domain_dir(dir);
                }
                Box::new(resolver)
            }
        };
        let native: Box<dyn NativeFormatter> = match self.native {
            Some(native) => native,
            None => {
                let command = self
                    .formatter_command
                    .unwrap_or_else(|| CommandFormatter::DEFAULT_COMMAND.to_string());
                Box::new(CommandFormatter::new(command))
            }
        };
        Engine {
            resolver,
            native,
            profile: RwLock::new(None),
        }
    }
}
