//! The native formatter collaborator.
//!
//! Final rendering is delegated to a printf-compatible primitive outside the
//! process. The engine guarantees the format text it hands over is
//! sequential-only (no `N$` references, the platform tool has no positional
//! grammar) with `%` doubled in literal runs, and that every directive has a
//! matching argument, so the primitive never sees the argument-less case
//! whose behavior varies between implementations.

use std::process::Command;

use crate::error::{CollaboratorError, CollaboratorErrorKind};

/// The printf-compatible primitive the engine delegates rendering to.
///
/// Implementations should error only when they cannot produce output at
/// all; diagnostic chatter alongside usable output is not a failure.
pub trait NativeFormatter {
    /// Renders `format` against `args` and returns the produced text.
    fn render(&self, format: &str, args: &[String]) -> Result<String, CollaboratorError>;
}

/// Spawns the platform `printf` tool once per render call.
///
/// Standard output is the rendered text. A non-zero exit with output still
/// counts as success: the tool diagnoses bad numeric arguments on stderr
/// while printing a usable default, and formatting must not fail over that.
/// A run that fails without printing anything is reported as
/// [`CollaboratorErrorKind::Rejected`].
/// The platform tool also interprets backslash escapes in the format
/// operand; message text flows through with only `%` re-escaped, matching
/// how translated catalogs spell control characters.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    command: String,
}

impl CommandFormatter {
    /// Default command name, resolved through `PATH`.
    pub const DEFAULT_COMMAND: &'static str = "printf";

    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// The configured command name.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Default for CommandFormatter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COMMAND)
    }
}

impl NativeFormatter for CommandFormatter {
    fn render(&self, format: &str, args: &[String]) -> Result<String, CollaboratorError> {
        // `--` keeps a dash-initiated format from being read as an option.
        let output = Command::new(&self.command)
            .arg("--")
            .arg(format)
            .args(args)
            .output()
            .map_err(|e| {
                CollaboratorError::new(&self.command, CollaboratorErrorKind::Spawn(e))
            })?;
        if !output.status.success() && output.stdout.is_empty() {
            return Err(CollaboratorError::new(
                &self.command,
                CollaboratorErrorKind::Rejected,
            ));
        }
        #[cfg(feature = "tracing")]
        if !output.status.success() {
            tracing::debug!(
                command = %self.command,
                code = ?output.status.code(),
                "native formatter exited non-zero; keeping its output"
            );
        }
        String::from_utf8(output.stdout).map_err(|e| {
            CollaboratorError::new(&self.command, CollaboratorErrorKind::NonUtf8(e))
        })
    }
}
