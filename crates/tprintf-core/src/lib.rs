#![forbid(unsafe_code)]

//! Format-directive engine: escape decoding, directive scanning, argument
//! reordering, and locale-aware numeric rewriting.
//!
//! `tprintf-core` is the pure text half of tprintf. It owns everything that
//! can be computed without leaving the process: decoding backslash escapes in
//! message keys, scanning printf-style format strings into typed directives,
//! resolving positional (`%2$s`) and sequential (`%s`) argument references
//! into one explicit ordering, and rewriting decimal arguments to the active
//! locale decimal point. The process collaborators (catalog lookup, the
//! native formatter) live in the `tprintf` crate.
//!
//! # Pipeline
//!
//! ```text
//! raw key -> decode_escapes -> lookup (external) -> tokenize -> bind
//!         -> to_native_call -> native formatter (external) -> text
//! ```
//!
//! # Design principles
//!
//! - **No I/O**: all types are pure data + logic; collaborators live upstream.
//! - **Total**: scanning and binding never fail; malformed input degrades to
//!   literal text instead of erroring.
//! - **Single scan**: the tokenizer runs once per format string; later stages
//!   work on typed tokens, never on raw text.
//!
//! # Example
//! ```
//! use tprintf_core::{EmitOptions, bind};
//!
//! let bound = bind("%2$s has %1$d apples", 2);
//! let call = bound.to_native_call(&["3", "Ken"], &EmitOptions::default());
//! assert_eq!(call.format, "%s has %d apples");
//! assert_eq!(call.args, ["Ken", "3"]);
//! ```

pub mod directive;
pub mod escape;
pub mod numeric;
pub mod reorder;

pub use directive::{ArgRef, ConvFlags, Directive, Token, tokenize};
pub use escape::decode_escapes;
pub use numeric::{ARABIC_DECIMAL_SEPARATOR, remap_decimal_separator};
pub use reorder::{BoundFormat, BoundValue, EmitOptions, NativeCall, Piece, bind};
