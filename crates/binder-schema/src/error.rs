use thiserror::Error as ThisError;

///
/// SchemaError
///
/// Failures raised while assembling or querying a [`crate::schema::Schema`].
/// Distinct from `binder_input::error::ValidationError`, which reports a
/// *value* failing to conform to an otherwise-valid schema.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("unknown type: {type_name}")]
    UnknownType { type_name: String },

    #[error("unknown field {field} on type {type_name}")]
    UnknownField { type_name: String, field: String },

    #[error("duplicate field id {id} on type {type_name}")]
    DuplicateFieldId { type_name: String, id: u32 },

    #[error("duplicate field key {field} on type {type_name}")]
    DuplicateFieldKey { type_name: String, field: String },

    #[error("duplicate type {type_name} in namespace")]
    DuplicateType { type_name: String },
}

pub type SchemaResult<T> = Result<T, SchemaError>;
