//! A thin `clap`-based front end over `binder-store`/`binder-input`/
//! `binder-dsl` (§6's CLI surface, named only for completeness: this
//! process is not where the interesting engineering lives).

pub mod cli;
pub mod commands;
pub mod error;
pub mod fields;
pub mod output;
pub mod schema_file;

pub use cli::Cli;
pub use error::{CliError, CliResult};

/// Run a parsed [`Cli`] invocation to completion.
pub fn run(cli: Cli) -> CliResult<()> {
    commands::run(cli.command, &cli.workspace, cli.author, cli.format)
}
