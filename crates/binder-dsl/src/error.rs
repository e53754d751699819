use thiserror::Error as ThisError;

///
/// DslError
///

#[derive(Debug, ThisError)]
pub enum DslError {
    #[error("field {field} is patched by conflicting operations in the same invocation")]
    DuplicateFieldPatch { field: String },

    #[error("field {field} needs a position to remove by (`--` requires an accessor)")]
    MissingRemoveValue { field: String },

    #[error("unrecognized patch token: {token:?}")]
    UnknownOperator { token: String },

    #[error("value {token:?} is not valid YAML/JSON")]
    MalformedLiteral { token: String },

    #[error("unknown field {field}")]
    UnknownField { field: String },
}

pub type DslResult<T> = Result<T, DslError>;
