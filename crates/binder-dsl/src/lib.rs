//! The human-readable patch DSL (C8): tokens of the form
//! `field[:accessor](op)value` parsed into a [`binder_core::FieldChangeset`].

pub mod error;
pub mod parser;

pub use error::{DslError, DslResult};
pub use parser::{parse_str, parse_tokens};
