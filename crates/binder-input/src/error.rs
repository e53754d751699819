use thiserror::Error as ThisError;

///
/// ValidationError
///

#[derive(Debug, ThisError)]
pub enum ValidationError {
    #[error("field {field} violates its schema: {reason}")]
    SchemaViolation { field: String, reason: String },

    #[error("unknown field {field}")]
    UnknownField { field: String },

    #[error("missing required field {field}")]
    MissingRequiredField { field: String },

    #[error("field {field}'s when-condition is not met by its siblings")]
    WhenConditionUnmet { field: String },
}

pub type ValidationResult<T> = Result<T, ValidationError>;
