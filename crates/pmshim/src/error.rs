//! Top-level error rendering. Everything below the binary crate speaks in
//! terms of [`pmshim_types::PmError`] or plain `anyhow::Error`; this module
//! is the one place that turns a failure into the user-facing miette
//! diagnostic and decides the exit code: every error kind surfaces and
//! exits non-zero, and nothing is ever swallowed.

use miette::Diagnostic;
use owo_colors::OwoColorize;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
struct Reported {
    message: String,
}

/// Print `err`'s full context chain as a miette diagnostic and return the
/// exit code the shell should see: always `1` for a structured failure here,
/// since a successful child dispatch never reaches this path (its own exit
/// code is returned directly by the caller instead).
pub fn report(err: &anyhow::Error) -> i32 {
    let message = err
        .chain()
        .enumerate()
        .map(|(i, cause)| if i == 0 { cause.to_string() } else { format!("  caused by: {cause}") })
        .collect::<Vec<_>>()
        .join("\n");

    let report = miette::Report::new(Reported { message });
    eprintln!("{} {:?}", "error:".red().bold(), report);
    1
}
