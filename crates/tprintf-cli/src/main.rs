#![forbid(unsafe_code)]

//! `tprintf` binary entry point: translate a message key, then format it.

mod cli;

use std::process;

use tprintf::{Engine, KeyForm, LookupRequest, NewlineMode};

use crate::cli::Opts;

fn main() {
    let opts = Opts::parse();

    let mut builder = Engine::builder();
    if let Some(domain) = &opts.domain {
        builder = builder.domain(domain.as_str());
    }
    let engine = builder.build();

    let mut request = LookupRequest::new(&opts.format);
    if let Some(context) = &opts.context {
        request = request.with_context(context);
    }
    if let Some(plural) = &opts.plural {
        request = request.with_plural(plural, opts.count);
    }
    if opts.decode_escapes {
        request = request.with_key_form(KeyForm::DecodeEscapes);
    }
    let resolved = engine.lookup(request);

    let args: Vec<&str> = opts.args.iter().map(String::as_str).collect();
    let newline = if opts.suppress_newline {
        NewlineMode::Suppress
    } else {
        NewlineMode::Append
    };
    if let Err(error) = engine.print(&resolved, &args, newline) {
        eprintln!("tprintf: {error}");
        process::exit(1);
    }
}
