use crate::error::{SchemaError, SchemaResult};
use crate::field::FieldDef;
use serde::{Deserialize, Serialize};

///
/// TypeDef
///
/// The field definitions for one entity type (record or config). Field ids
/// are assigned by the caller at construction and checked for uniqueness.
///

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    pub ident: String,
    fields: Vec<FieldDef>,
}

impl TypeDef {
    pub fn new(ident: impl Into<String>, fields: Vec<FieldDef>) -> SchemaResult<Self> {
        let ident = ident.into();
        let mut seen_ids = std::collections::BTreeSet::new();
        let mut seen_keys = std::collections::BTreeSet::new();
        for field in &fields {
            if !seen_ids.insert(field.id) {
                return Err(SchemaError::DuplicateFieldId {
                    type_name: ident.clone(),
                    id: field.id,
                });
            }
            if !seen_keys.insert(field.key.clone()) {
                return Err(SchemaError::DuplicateFieldKey {
                    type_name: ident.clone(),
                    field: field.key.clone(),
                });
            }
        }
        Ok(Self { ident, fields })
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    #[must_use]
    pub fn get_field(&self, key: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.key == key)
    }

    #[must_use]
    pub fn field_id(&self, key: &str) -> Option<u32> {
        self.get_field(key).map(|f| f.id)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;

    #[test]
    fn rejects_duplicate_field_id() {
        let fields = vec![
            FieldDef::new(0, "title".into(), FieldKind::Text),
            FieldDef::new(0, "body".into(), FieldKind::Text),
        ];
        assert_eq!(
            TypeDef::new("note", fields).unwrap_err(),
            SchemaError::DuplicateFieldId {
                type_name: "note".into(),
                id: 0
            }
        );
    }

    #[test]
    fn get_field_looks_up_by_key() {
        let fields = vec![FieldDef::new(0, "title".into(), FieldKind::Text)];
        let type_def = TypeDef::new("note", fields).unwrap();
        assert_eq!(type_def.field_id("title"), Some(0));
        assert_eq!(type_def.field_id("missing"), None);
    }
}
