//! Entity and field schema model.
//!
//! A [`schema::Schema`] is a plain runtime data structure — no derive
//! macros, no codegen. It exists to answer two questions the rest of the
//! workspace needs: "what is field `x.y`'s canonical id" (C3) and "is this
//! input shape valid for this type" (C9).

pub mod entity;
pub mod error;
pub mod field;
pub mod schema;
pub mod when;

pub use entity::TypeDef;
pub use error::{SchemaError, SchemaResult};
pub use field::{FieldDef, FieldKind};
pub use schema::{Namespace, Schema};
pub use when::WhenCondition;
