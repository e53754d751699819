use crate::entity::TypeDef;
use crate::error::{SchemaError, SchemaResult};
use std::collections::BTreeMap;

///
/// Namespace
///
/// The two changeset namespaces every transaction carries (§3 of the data
/// model): `Record` for graph data, `Config` for the schema and other
/// structural configuration.
///

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    Record,
    Config,
}

///
/// Schema
///
/// The set of known entity types for each namespace. Consulted by C3 to
/// order and filter changeset keys, and by C9 to validate input.
///

#[derive(Clone, Debug, Default)]
pub struct Schema {
    record_types: BTreeMap<String, TypeDef>,
    config_types: BTreeMap<String, TypeDef>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_type(&mut self, namespace: Namespace, type_def: TypeDef) -> SchemaResult<()> {
        let table = self.table_mut(namespace);
        if table.contains_key(&type_def.ident) {
            return Err(SchemaError::DuplicateType {
                type_name: type_def.ident,
            });
        }
        table.insert(type_def.ident.clone(), type_def);
        Ok(())
    }

    #[must_use]
    pub fn type_def(&self, namespace: Namespace, type_name: &str) -> Option<&TypeDef> {
        self.table(namespace).get(type_name)
    }

    pub fn require_type(&self, namespace: Namespace, type_name: &str) -> SchemaResult<&TypeDef> {
        self.type_def(namespace, type_name).ok_or_else(|| SchemaError::UnknownType {
            type_name: type_name.to_string(),
        })
    }

    /// The canonical field id for `type_name.field_key`, used to order
    /// changeset keys during hashing (C3). Returns `None` for an unknown
    /// type or field, which C3 treats as "drop this key".
    #[must_use]
    pub fn field_id(&self, namespace: Namespace, type_name: &str, field_key: &str) -> Option<u32> {
        self.type_def(namespace, type_name)?.field_id(field_key)
    }

    /// All type definitions in `namespace`, for commands that need to list
    /// or dump the whole schema (e.g. the CLI's `schema` subcommand).
    pub fn types(&self, namespace: Namespace) -> impl Iterator<Item = &TypeDef> {
        self.table(namespace).values()
    }

    fn table(&self, namespace: Namespace) -> &BTreeMap<String, TypeDef> {
        match namespace {
            Namespace::Record => &self.record_types,
            Namespace::Config => &self.config_types,
        }
    }

    fn table_mut(&mut self, namespace: Namespace) -> &mut BTreeMap<String, TypeDef> {
        match namespace {
            Namespace::Record => &mut self.record_types,
            Namespace::Config => &mut self.config_types,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldDef, FieldKind};

    #[test]
    fn field_id_resolves_through_namespace_and_type() {
        let mut schema = Schema::new();
        let fields = vec![FieldDef::new(3, "title".into(), FieldKind::Text)];
        schema
            .insert_type(Namespace::Record, TypeDef::new("note", fields).unwrap())
            .unwrap();

        assert_eq!(schema.field_id(Namespace::Record, "note", "title"), Some(3));
        assert_eq!(schema.field_id(Namespace::Record, "note", "missing"), None);
        assert_eq!(schema.field_id(Namespace::Config, "note", "title"), None);
    }

    #[test]
    fn rejects_duplicate_type_in_same_namespace() {
        let mut schema = Schema::new();
        schema
            .insert_type(Namespace::Record, TypeDef::new("note", vec![]).unwrap())
            .unwrap();
        let err = schema
            .insert_type(Namespace::Record, TypeDef::new("note", vec![]).unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateType {
                type_name: "note".into()
            }
        );
    }
}
