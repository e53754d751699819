//! Field-change algebra and fieldset changesets.
//!
//! This crate has no notion of transactions, storage, or entity identity —
//! it is the pure, replayable core that every other `binder-*` crate builds
//! on: a [`value::Value`] data model, a single-field [`change::ValueChange`]
//! algebra (apply/inverse/squash/rebase), and its lift to whole
//! [`fieldset::FieldChangeset`]s.

pub mod change;
pub mod error;
pub mod fieldset;
pub mod relation;
pub mod value;

pub use change::{SeqMutation, ValueChange};
pub use error::{ChangeError, ChangeResult};
pub use fieldset::FieldChangeset;
pub use relation::{promote, reference_of, RelationTuple};
pub use value::{Fieldset, Value};
