use binder_core::ChangeError;
use thiserror::Error as ThisError;

///
/// TxError
///
/// Transaction-level failures: the C1/C2 algebra's own errors, widened with
/// the chain-integrity and shape failures that only make sense once
/// changes are grouped into a transaction.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TxError {
    #[error(transparent)]
    Change(#[from] ChangeError),

    #[error("chain broken: expected previous {expected}, found {found}")]
    ChainBroken { expected: String, found: String },

    #[error("transaction corrupt: {reason}")]
    Corruption { reason: String },

    #[error("empty changeset for entity {reference}")]
    EmptyChangeset { reference: String },

    #[error("unknown type: {type_name}")]
    UnknownType { type_name: String },
}

pub type TxResult<T> = Result<T, TxError>;
