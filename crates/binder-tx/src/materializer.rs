//! Entity materializer (C6): fold a transaction range into the current
//! fieldset for one entity.

use crate::error::TxResult;
use crate::transaction::Transaction;
use binder_core::{fieldset, Fieldset};
use binder_schema::Namespace;

/// Fold transactions touching `reference`, in order, onto an initially
/// empty fieldset.
pub fn materialize<'a>(namespace: Namespace, reference: &str, transactions: impl IntoIterator<Item = &'a Transaction>) -> TxResult<Fieldset> {
    let mut current = Fieldset::new();
    for tx in transactions {
        let entities = match namespace {
            Namespace::Record => &tx.records,
            Namespace::Config => &tx.configs,
        };
        if let Some(entity) = entities.get(reference) {
            current = fieldset::apply(&current, &entity.fields)?;
        }
    }
    Ok(current)
}

/// Whether a fieldset represents a live entity, an entity that never
/// existed, or a tombstone (deleted: carries a non-null `id` but every
/// other field is null).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityState {
    NeverExisted,
    Live,
    Deleted,
}

#[must_use]
pub fn entity_state(fieldset: &Fieldset) -> EntityState {
    if is_tombstone(fieldset) {
        EntityState::Deleted
    } else if fieldset.is_empty() {
        EntityState::NeverExisted
    } else {
        EntityState::Live
    }
}

/// A fieldset with a non-null `id` but every other field absent/null.
#[must_use]
pub fn is_tombstone(fieldset: &Fieldset) -> bool {
    let has_id = fieldset.get("id").is_some_and(|v| !v.is_absent());
    has_id && fieldset.iter().all(|(key, value)| key == "id" || value.is_absent())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::{EntitiesChangeset, EntityChangeset};
    use binder_core::{FieldChangeset, Value, ValueChange};
    use binder_schema::{FieldDef, FieldKind, Schema, TypeDef};

    fn note_schema() -> Schema {
        let mut schema = Schema::new();
        let fields = vec![
            FieldDef::new(0, "id".into(), FieldKind::Text),
            FieldDef::new(1, "title".into(), FieldKind::Text),
        ];
        schema.insert_type(Namespace::Record, TypeDef::new("note", fields).unwrap()).unwrap();
        schema
    }

    fn tx_setting(schema: &Schema, predecessor: &Transaction, reference: &str, changes: Vec<(&str, ValueChange)>) -> Transaction {
        let mut fields = FieldChangeset::new();
        for (key, change) in changes {
            fields.insert(key.to_string(), change);
        }
        let mut records = EntitiesChangeset::new();
        records.insert(reference.to_string(), EntityChangeset::new("note".into(), fields));
        Transaction::construct(schema, predecessor, "u", "2024-01-01T00:00:00.000Z", records, EntitiesChangeset::new()).unwrap()
    }

    #[test]
    fn materialize_folds_transactions_in_order() {
        let schema = note_schema();
        let genesis = Transaction::genesis();
        let t1 = tx_setting(&schema, &genesis, "t1", vec![("id", ValueChange::set("t1")), ("title", ValueChange::set("a"))]);
        let t2 = tx_setting(&schema, &t1, "t1", vec![("title", ValueChange::set_anchored("b", "a"))]);

        let result = materialize(Namespace::Record, "t1", [&t1, &t2]).unwrap();
        assert_eq!(result.get("title"), Some(&Value::text("b")));
    }

    #[test]
    fn deleted_entity_is_a_tombstone() {
        let schema = note_schema();
        let genesis = Transaction::genesis();
        let t1 = tx_setting(&schema, &genesis, "t1", vec![("id", ValueChange::set("t1")), ("title", ValueChange::set("a"))]);
        let t2 = tx_setting(&schema, &t1, "t1", vec![("title", ValueChange::clear("a"))]);

        let result = materialize(Namespace::Record, "t1", [&t1, &t2]).unwrap();
        assert_eq!(entity_state(&result), EntityState::Deleted);
    }

    #[test]
    fn untouched_entity_never_existed() {
        let result = materialize(Namespace::Record, "ghost", []).unwrap();
        assert_eq!(entity_state(&result), EntityState::NeverExisted);
    }
}
