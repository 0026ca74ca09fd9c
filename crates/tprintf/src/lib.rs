#![forbid(unsafe_code)]

//! Translation-aware text formatting over external collaborators.
//!
//! [`Engine`] resolves a message key through a gettext-compatible resolver,
//! rewrites the localized printf-like format string so every argument
//! reference is sequential and explicit, remaps decimal separators to the
//! probed locale conventions, and renders through a printf-compatible
//! formatter. The pure text pipeline lives in `tprintf-core`; this crate
//! adds the collaborator processes, the locale probes, and the public
//! entry points.
//!
//! Missing translations, missing arguments, out-of-range positional
//! references, and unknown directives never fail a call; they degrade to
//! literal or empty text. Only a native formatter that cannot produce
//! output at all reports an error.
//!
//! ```no_run
//! use tprintf::{Engine, NewlineMode};
//!
//! let engine = Engine::builder().domain("orchard").build();
//! let line = engine.translate_format_plural(
//!     "Here is %d apple.",
//!     "Here are %d apples.",
//!     3,
//!     &["3"],
//! )?;
//! engine.print("%s", &[line.as_str()], NewlineMode::Append)?;
//! # Ok::<(), tprintf::FormatError>(())
//! ```
//!
//! Lookup commands, the formatter command, and the text domain are all
//! overridable through [`EngineBuilder`]; in-process [`MessageResolver`]
//! and [`NativeFormatter`] values can replace the command-backed defaults
//! entirely, which is how the test suites run without platform tools.

pub mod config;
pub mod engine;
pub mod error;
pub mod native;
pub mod profile;
pub mod resolver;

pub use config::EnvInputs;
pub use engine::{Engine, EngineBuilder, KeyForm, LookupRequest, NewlineMode};
pub use error::{CollaboratorError, CollaboratorErrorKind, FormatError};
pub use native::{CommandFormatter, NativeFormatter};
pub use profile::LocaleNumericProfile;
pub use resolver::{
    CommandResolver, LookupShape, MessageQuery, MessageResolver, PluralQuery, CONTEXT_SEPARATOR,
    LOOKUP_SHAPES,
};

pub use tprintf_core::{decode_escapes, EmitOptions};
