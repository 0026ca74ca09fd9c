#![forbid(unsafe_code)]

//! Command-line argument parsing for the `tprintf` binary.
//!
//! Parses args manually (no external dependencies) to keep the binary lean.

use std::env;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
tprintf — look up a message and format it with arguments

USAGE:
    tprintf [OPTIONS] FORMAT [ARG]...

ARGS:
    FORMAT               Message key; the looked-up text is the format string
    ARG...               Arguments substituted into %-directives

OPTIONS:
    --plural=TEXT        Plural message key (requires --count)
    --count=N            Count selecting the singular (n=1) or plural form
    --context=CTX        Disambiguating message context
    --domain=DOM         Text domain (default: $TEXTDOMAIN)
    -e                   Decode backslash escapes in the message keys
    -n                   Do not append a trailing newline
    --help, -h           Show this help message
    --version, -V        Show version

DIRECTIVES:
    %s %c %d %i %u %f %e %g ...   printf-style conversions
    %N$...                        positional argument reference (1-indexed)
    %%                            literal percent

ENVIRONMENT VARIABLES:
    TEXTDOMAIN           Default text domain
    TEXTDOMAINDIR        Catalog directory passed to the lookup tools";

/// Parsed command-line options.
#[derive(Debug)]
pub struct Opts {
    /// Message key; after lookup it is the format string.
    pub format: String,
    /// Call-time arguments substituted into `%`-directives.
    pub args: Vec<String>,
    /// Plural message key, paired with `count`.
    pub plural: Option<String>,
    /// Count selecting the singular or plural form.
    pub count: u64,
    /// Disambiguating message context.
    pub context: Option<String>,
    /// Text domain override.
    pub domain: Option<String>,
    /// `-n`: do not append a trailing newline.
    pub suppress_newline: bool,
    /// `-e`: decode backslash escapes in the message keys.
    pub decode_escapes: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            format: String::new(),
            args: Vec::new(),
            plural: None,
            count: 0,
            context: None,
            domain: None,
            suppress_newline: false,
            decode_escapes: false,
        }
    }
}

/// What an argument list asked for.
#[derive(Debug)]
pub enum Parsed {
    /// Format a message with the given options.
    Run(Opts),
    /// Print the help text.
    Help,
    /// Print the version.
    Version,
}

impl Opts {
    /// Parse command-line arguments, exiting on `--help`, `--version`, or a
    /// usage error.
    pub fn parse() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        match Self::parse_from(&args) {
            Ok(Parsed::Run(opts)) => opts,
            Ok(Parsed::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Parsed::Version) => {
                println!("tprintf {VERSION}");
                process::exit(0);
            }
            Err(message) => {
                eprintln!("tprintf: {message}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse an argument list. Separated from [`Opts::parse`] so tests can
    /// drive it without touching the process environment.
    pub fn parse_from(args: &[String]) -> Result<Parsed, String> {
        let mut opts = Self::default();
        let mut count: Option<u64> = None;
        let mut operands: Vec<String> = Vec::new();
        let mut options_done = false;

        for arg in args {
            if options_done {
                operands.push(arg.clone());
                continue;
            }
            match arg.as_str() {
                "--" => options_done = true,
                "--help" | "-h" => return Ok(Parsed::Help),
                "--version" | "-V" => return Ok(Parsed::Version),
                "-n" => opts.suppress_newline = true,
                "-e" => opts.decode_escapes = true,
                other => {
                    if let Some(val) = other.strip_prefix("--plural=") {
                        opts.plural = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--count=") {
                        match val.parse() {
                            Ok(n) => count = Some(n),
                            Err(_) => return Err(format!("invalid --count value: {val}")),
                        }
                    } else if let Some(val) = other.strip_prefix("--context=") {
                        opts.context = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--domain=") {
                        opts.domain = Some(val.to_string());
                    } else if other.starts_with('-') && other.len() > 1 {
                        return Err(format!("unknown option: {other}"));
                    } else {
                        operands.push(other.to_string());
                    }
                }
            }
        }

        let mut operands = operands.into_iter();
        let Some(format) = operands.next() else {
            return Err("missing FORMAT operand".to_string());
        };
        opts.format = format;
        opts.args = operands.collect();

        match (&opts.plural, count) {
            (Some(_), Some(n)) => opts.count = n,
            (Some(_), None) => return Err("--plural requires --count".to_string()),
            (None, Some(_)) => return Err("--count requires --plural".to_string()),
            (None, None) => {}
        }

        Ok(Parsed::Run(opts))
    }
}
