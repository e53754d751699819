use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

///
/// Cli
///
/// The thin argument surface named in §6: `init`, `create`, `read`,
/// `update`, `delete`, `search`, `schema`, `transaction`, `undo [n]`,
/// `redo [n]`.
///

#[derive(Parser, Debug)]
#[command(name = "binder", about = "A local, file-backed knowledge-graph workbench", version)]
pub struct Cli {
    /// Workspace root directory. Holds `log.bin`, `head`, `index/`,
    /// `config.yaml`, `schema.json`, and the undo/redo logs.
    #[arg(long, global = true, default_value = ".")]
    pub workspace: PathBuf,

    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Overrides the workspace config's author for this invocation only.
    #[arg(long, global = true)]
    pub author: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new, empty workspace at `--workspace`.
    Init,

    /// Create a record entity. Repeat `--field key=value` for each field;
    /// values are parsed the same way the patch DSL parses literals.
    Create {
        #[arg(value_name = "TYPE")]
        type_name: String,
        #[arg(long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },

    /// Materialize and print a record entity's current fieldset.
    Read { reference: String },

    /// Update a record entity. `--field key=value` sets/clears a field
    /// (anchored on its prior value); `--patch` additionally accepts one
    /// patch-DSL invocation for list and relation mutations.
    Update {
        reference: String,
        #[arg(long = "type", value_name = "TYPE")]
        type_name: String,
        #[arg(long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
        #[arg(long)]
        patch: Option<String>,
    },

    /// Clear every field on a record entity, leaving a tombstone behind.
    Delete {
        reference: String,
        #[arg(long = "type", value_name = "TYPE")]
        type_name: String,
    },

    /// List live record references whose reference contains `query`.
    Search { query: String },

    #[command(subcommand)]
    Schema(SchemaAction),

    /// Print a transaction by id, or the head transaction if omitted.
    Transaction { id: Option<u64> },

    /// Undo the last `n` transactions (default 1).
    Undo { n: Option<u64> },

    /// Redo the last `n` undone transactions (default 1).
    Redo { n: Option<u64> },
}

#[derive(Subcommand, Debug)]
pub enum SchemaAction {
    /// Print the workspace's locally defined record and config types.
    Show,
    /// Replace the workspace's schema with the one in the given JSON file.
    Define {
        #[arg(long)]
        from: PathBuf,
    },
}
