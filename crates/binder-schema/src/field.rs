use crate::when::WhenCondition;
use serde::{Deserialize, Serialize};

///
/// FieldKind
///
/// The data shape a field holds. `Relation` fields store either a bare
/// reference or a `[ref, attrs]` tuple (see `binder_core::relation`); all
/// other kinds store plain scalar or structured values.
///

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Bool,
    Number,
    Text,
    Relation { to: String },
}

///
/// FieldDef
///
/// One field of a [`crate::entity::TypeDef`]. `id` is the stable integer
/// used to order this field's key in the canonical encoding (C3) — it must
/// never be reused or reassigned once a schema has been used to hash a
/// transaction, since renumbering changes hash output.
///

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub id: u32,
    pub key: String,
    pub kind: FieldKind,
    pub list: bool,
    pub required: bool,
    pub when: Option<WhenCondition>,
    /// Delimiter the patch DSL (C8) splits a raw value on for this field
    /// when building multiple `insert`/`remove` mutations from one token.
    pub list_delimiter: char,
}

impl FieldDef {
    #[must_use]
    pub const fn new(id: u32, key: String, kind: FieldKind) -> Self {
        Self {
            id,
            key,
            kind,
            list: false,
            required: false,
            when: None,
            list_delimiter: ',',
        }
    }

    #[must_use]
    pub const fn list(mut self) -> Self {
        self.list = true;
        self
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn when(mut self, condition: WhenCondition) -> Self {
        self.when = Some(condition);
        self
    }

    #[must_use]
    pub const fn delimiter(mut self, delimiter: char) -> Self {
        self.list_delimiter = delimiter;
        self
    }

    #[must_use]
    pub const fn is_relation(&self) -> bool {
        matches!(self.kind, FieldKind::Relation { .. })
    }
}
