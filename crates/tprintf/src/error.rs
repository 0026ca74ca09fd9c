//! Errors for collaborator process failures.
//!
//! Text problems never error: unknown directives, missing arguments, and
//! absent translations all degrade inside the engine. What can fail is the
//! machinery around the text: a collaborator process that cannot run, or an
//! output stream that cannot be written.

use std::fmt;

/// A collaborator process could not produce output.
#[derive(Debug)]
pub struct CollaboratorError {
    command: String,
    kind: CollaboratorErrorKind,
}

/// What went wrong running the collaborator.
#[derive(Debug)]
pub enum CollaboratorErrorKind {
    /// The command could not be spawned at all.
    Spawn(std::io::Error),
    /// The command produced bytes that are not valid UTF-8.
    NonUtf8(std::string::FromUtf8Error),
    /// The command ran but refused the request outright.
    Rejected,
}

impl CollaboratorError {
    #[must_use]
    pub fn new(command: impl Into<String>, kind: CollaboratorErrorKind) -> Self {
        Self {
            command: command.into(),
            kind,
        }
    }

    /// The command name the failure is attributed to.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    #[must_use]
    pub fn kind(&self) -> &CollaboratorErrorKind {
        &self.kind
    }
}

impl fmt::Display for CollaboratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CollaboratorErrorKind::Spawn(e) => {
                write!(f, "failed to run `{}`: {}", self.command, e)
            }
            CollaboratorErrorKind::NonUtf8(e) => {
                write!(f, "`{}` produced non-UTF-8 output: {}", self.command, e)
            }
            CollaboratorErrorKind::Rejected => {
                write!(f, "`{}` rejected the request", self.command)
            }
        }
    }
}

impl std::error::Error for CollaboratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            CollaboratorErrorKind::Spawn(e) => Some(e),
            CollaboratorErrorKind::NonUtf8(e) => Some(e),
            CollaboratorErrorKind::Rejected => None,
        }
    }
}

/// Failure of a formatting entry point.
#[derive(Debug)]
pub enum FormatError {
    /// The native formatter collaborator failed; no text was produced.
    Formatter(CollaboratorError),
    /// The formatted text could not be written to the output stream.
    Output(std::io::Error),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Formatter(e) => write!(f, "native formatter failed: {e}"),
            Self::Output(e) => write!(f, "could not write formatted output: {e}"),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Formatter(e) => Some(e),
            Self::Output(e) => Some(e),
        }
    }
}
