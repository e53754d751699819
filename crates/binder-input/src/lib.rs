//! The input/validation shim (C9): turns untyped JSON-shaped input into
//! internal changesets, validated against a [`Schema`].

pub mod error;
pub mod normalize;

pub use error::{ValidationError, ValidationResult};
pub use normalize::{normalize_create, normalize_update};
