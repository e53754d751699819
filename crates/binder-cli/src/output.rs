use crate::error::CliError;
use serde::Serialize;

#[derive(Clone, Copy, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

/// Print a successful result, as pretty JSON under `--format json` or via
/// `Display` (usually `{:#?}`-free, human-oriented) otherwise.
pub fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce() -> String) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("failed to serialize output: {err}"),
        },
        OutputFormat::Text => println!("{}", text()),
    }
}

/// Print an error to stderr: a structured `{ "error": "..." }` object under
/// `--format json` (§6), a plain message otherwise.
pub fn emit_error(format: OutputFormat, err: &CliError) {
    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({ "error": err.to_string() });
            eprintln!("{body}");
        }
        OutputFormat::Text => eprintln!("error: {err}"),
    }
}
