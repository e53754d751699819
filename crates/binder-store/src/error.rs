use binder_tx::TxError;
use thiserror::Error as ThisError;

///
/// StoreError
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error(transparent)]
    Tx(#[from] TxError),

    #[error("chain broken: expected previous {expected}, found {found}")]
    ChainBroken { expected: String, found: String },

    #[error("log entry corrupt: {reason}")]
    Corruption { reason: String },

    #[error("failed to acquire log lock within the configured timeout")]
    LockTimeout,

    #[error("no undone transaction available to redo")]
    NoRedoAvailable,

    #[error("fewer than {requested} transactions in the log to roll back")]
    NoUndoAvailable { requested: u64 },

    #[error("transaction {id} not found")]
    NotFound { id: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
