use thiserror::Error as ThisError;

///
/// CliError
///
/// Wraps every lower-layer error the CLI can surface. `exit_code` decides
/// the process's exit status (§6: "exit code 0 on success, 1 on any
/// error"); every variant here returns 1, but the method exists as the one
/// place that decision lives.
///

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] binder_store::StoreError),

    #[error(transparent)]
    Tx(#[from] binder_tx::TxError),

    #[error(transparent)]
    Schema(#[from] binder_schema::SchemaError),

    #[error(transparent)]
    Change(#[from] binder_core::ChangeError),

    #[error(transparent)]
    Validation(#[from] binder_input::ValidationError),

    #[error(transparent)]
    Dsl(#[from] binder_dsl::DslError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("unknown entity type {type_name}")]
    UnknownType { type_name: String },

    #[error("entity {reference} does not exist")]
    NoSuchEntity { reference: String },

    #[error("workspace already initialized at {path}")]
    AlreadyInitialized { path: String },

    #[error("workspace not initialized at {path}; run `binder init` first")]
    NotInitialized { path: String },
}

impl CliError {
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        1
    }
}

pub type CliResult<T> = Result<T, CliError>;
