//! Untyped-JSON-to-internal normalization (C9): `{ type, key, ...fields }`
//! becomes a create changeset, `{ $ref, ...fields }` becomes an update
//! changeset, each validated against a [`Schema`].

use crate::error::{ValidationError, ValidationResult};
use binder_core::{FieldChangeset, Fieldset, Value, ValueChange, SeqMutation};
use binder_schema::{FieldDef, FieldKind, Namespace, Schema, TypeDef};
use ulid::Ulid;

const TYPE_KEY: &str = "type";
const KEY_KEY: &str = "key";
const REF_KEY: &str = "$ref";

/// Normalize a `{ type, key, ...fields }` create payload. A missing `key`
/// gets a fresh ULID. Every user-supplied field is normalized to a plain
/// `set` — there is no prior value for a create to diff against.
pub fn normalize_create(schema: &Schema, namespace: Namespace, raw: &Fieldset) -> ValidationResult<(String, String, FieldChangeset)> {
    let type_name = require_text_meta(raw, TYPE_KEY)?;
    let type_def = require_type(schema, namespace, &type_name)?;

    let reference = match raw.get(KEY_KEY) {
        Some(Value::Text(key)) => key.clone(),
        Some(_) => {
            return Err(ValidationError::SchemaViolation {
                field: KEY_KEY.to_string(),
                reason: "must be a string".to_string(),
            })
        }
        None => Ulid::new().to_string(),
    };

    let siblings: Fieldset = raw.iter().filter(|(k, _)| *k != TYPE_KEY && *k != KEY_KEY).map(|(k, v)| (k.clone(), v.clone())).collect();

    let mut changeset = FieldChangeset::new();
    for (key, value) in &siblings {
        let field = require_field(type_def, key)?;
        check_type(field, value)?;
        check_when(field, &siblings, key)?;
        changeset.insert(key.clone(), ValueChange::set(value.clone()));
    }

    for field in type_def.required_fields() {
        if !changeset.contains_key(&field.key) {
            return Err(ValidationError::MissingRequiredField { field: field.key.clone() });
        }
    }

    Ok((reference, type_name, changeset))
}

/// Normalize a `{ $ref, ...fields }` update payload against `prior`, the
/// entity's currently materialized fieldset. Each field is dispatched by
/// shape: a plain scalar becomes `set` (anchored on the prior value when
/// one exists), a list of `[kind, value, pos?]` triples becomes `seq`, and
/// a nested map on a relation field becomes `patch`.
pub fn normalize_update(schema: &Schema, namespace: Namespace, type_name: &str, raw: &Fieldset, prior: &Fieldset) -> ValidationResult<(String, FieldChangeset)> {
    let type_def = require_type(schema, namespace, type_name)?;
    let reference = require_text_meta(raw, REF_KEY)?;

    let siblings: Fieldset = prior
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .chain(raw.iter().filter(|(k, _)| *k != REF_KEY).map(|(k, v)| (k.clone(), v.clone())))
        .collect();

    let mut changeset = FieldChangeset::new();
    for (key, value) in raw.iter().filter(|(k, _)| *k != REF_KEY) {
        let field = require_field(type_def, key)?;
        check_type(field, value)?;
        check_when(field, &siblings, key)?;

        if let Some(change) = normalize_value_change(field, value, prior.get(key))? {
            changeset.insert(key.clone(), change);
        }
    }

    Ok((reference, changeset))
}

fn normalize_value_change(field: &FieldDef, raw: &Value, prior: Option<&Value>) -> ValidationResult<Option<ValueChange>> {
    if matches!(raw, Value::Null) {
        return Ok(match prior {
            Some(p) if !p.is_absent() => Some(ValueChange::clear(p.clone())),
            _ => None,
        });
    }

    if field.list {
        if let Value::List(items) = raw {
            let mutations = items.iter().map(|item| parse_seq_triple(item)).collect::<ValidationResult<Vec<_>>>()?;
            return Ok(Some(ValueChange::Seq(mutations)));
        }
    }

    if field.is_relation() {
        if let Value::Map(fields) = raw {
            let prior_map = prior.and_then(Value::as_map);
            let nested: FieldChangeset = fields
                .iter()
                .filter_map(|(key, value)| set_or_clear(value, prior_map.and_then(|m| m.get(key))).map(|c| (key.clone(), c)))
                .collect();
            return Ok(Some(ValueChange::Patch(nested)));
        }
    }

    Ok(set_or_clear(raw, prior))
}

fn set_or_clear(value: &Value, prior: Option<&Value>) -> Option<ValueChange> {
    if matches!(value, Value::Null) {
        return prior.filter(|p| !p.is_absent()).map(|p| ValueChange::clear(p.clone()));
    }
    Some(match prior {
        Some(p) if !p.is_absent() => ValueChange::set_anchored(value.clone(), p.clone()),
        _ => ValueChange::set(value.clone()),
    })
}

fn parse_seq_triple(item: &Value) -> ValidationResult<SeqMutation> {
    let Value::List(parts) = item else {
        return Err(ValidationError::SchemaViolation {
            field: "seq".to_string(),
            reason: "each list mutation must itself be a [kind, value] or [kind, value, pos] list".to_string(),
        });
    };
    let kind = parts.first().and_then(Value::as_text).ok_or_else(|| ValidationError::SchemaViolation {
        field: "seq".to_string(),
        reason: "mutation kind must be a string".to_string(),
    })?;

    match kind {
        "insert" | "remove" => {
            let value = parts.get(1).cloned().unwrap_or(Value::Null);
            let pos = parts.get(2).and_then(Value::as_text).and_then(|s| s.parse().ok()).or_else(|| {
                parts.get(2).and_then(|v| match v {
                    Value::Number(n) => n.as_u64().map(|n| n as usize),
                    _ => None,
                })
            });
            Ok(if kind == "insert" {
                SeqMutation::Insert { value, pos }
            } else {
                SeqMutation::Remove { value, pos }
            })
        }
        "patch" => {
            let reference = parts.get(1).and_then(Value::as_text).ok_or_else(|| ValidationError::SchemaViolation {
                field: "seq".to_string(),
                reason: "a patch mutation's second element must be the target reference".to_string(),
            })?;
            let changeset = parts.get(2).and_then(Value::as_map).map_or_else(FieldChangeset::new, |fields| {
                fields.iter().map(|(k, v)| (k.clone(), ValueChange::set(v.clone()))).collect()
            });
            Ok(SeqMutation::Patch { reference: reference.to_string(), changeset })
        }
        other => Err(ValidationError::SchemaViolation {
            field: "seq".to_string(),
            reason: format!("unknown mutation kind {other:?}"),
        }),
    }
}

fn require_type<'a>(schema: &'a Schema, namespace: Namespace, type_name: &str) -> ValidationResult<&'a TypeDef> {
    schema.require_type(namespace, type_name).map_err(|err| ValidationError::SchemaViolation {
        field: TYPE_KEY.to_string(),
        reason: err.to_string(),
    })
}

fn require_field<'a>(type_def: &'a TypeDef, key: &str) -> ValidationResult<&'a FieldDef> {
    type_def.get_field(key).ok_or_else(|| ValidationError::UnknownField { field: key.to_string() })
}

fn require_text_meta(raw: &Fieldset, key: &str) -> ValidationResult<String> {
    match raw.get(key) {
        Some(Value::Text(s)) => Ok(s.clone()),
        _ => Err(ValidationError::SchemaViolation {
            field: key.to_string(),
            reason: "must be present and a string".to_string(),
        }),
    }
}

fn check_type(field: &FieldDef, value: &Value) -> ValidationResult<()> {
    if field.list {
        if !matches!(value, Value::List(_)) {
            return Err(ValidationError::SchemaViolation {
                field: field.key.clone(),
                reason: "expected a list".to_string(),
            });
        }
        return Ok(());
    }

    let matches_kind = match (&field.kind, value) {
        (FieldKind::Bool, Value::Bool(_)) => true,
        (FieldKind::Number, Value::Number(_)) => true,
        (FieldKind::Text, Value::Text(_)) => true,
        (FieldKind::Relation { .. }, Value::Text(_) | Value::List(_)) => true,
        _ => false,
    };
    if matches_kind {
        Ok(())
    } else {
        Err(ValidationError::SchemaViolation {
            field: field.key.clone(),
            reason: format!("value does not match field kind {:?}", field.kind),
        })
    }
}

fn check_when(field: &FieldDef, siblings: &Fieldset, key: &str) -> ValidationResult<()> {
    match &field.when {
        Some(condition) if !condition.is_met(siblings) => Err(ValidationError::WhenConditionUnmet { field: key.to_string() }),
        _ => Ok(()),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use binder_schema::WhenCondition;

    fn note_schema() -> Schema {
        let mut schema = Schema::new();
        let fields = vec![
            FieldDef::new(0, "title".into(), FieldKind::Text).required(),
            FieldDef::new(1, "tags".into(), FieldKind::Text).list(),
            FieldDef::new(2, "archived_reason".into(), FieldKind::Text).when(WhenCondition::new("archived".into(), Value::Bool(true))),
            FieldDef::new(3, "archived".into(), FieldKind::Bool),
        ];
        schema.insert_type(Namespace::Record, TypeDef::new("note", fields).unwrap()).unwrap();
        schema
    }

    fn raw(pairs: &[(&str, Value)]) -> Fieldset {
        pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
    }

    #[test]
    fn create_assigns_fresh_key_when_absent() {
        let schema = note_schema();
        let input = raw(&[("type", Value::text("note")), ("title", Value::text("hello"))]);
        let (reference, type_name, changeset) = normalize_create(&schema, Namespace::Record, &input).unwrap();
        assert!(!reference.is_empty());
        assert_eq!(type_name, "note");
        assert_eq!(changeset.get("title"), Some(&ValueChange::set("hello")));
    }

    #[test]
    fn create_rejects_missing_required_field() {
        let schema = note_schema();
        let input = raw(&[("type", Value::text("note")), ("key", Value::text("n1"))]);
        let err = normalize_create(&schema, Namespace::Record, &input).unwrap_err();
        assert!(matches!(err, ValidationError::MissingRequiredField { .. }));
    }

    #[test]
    fn update_anchors_set_on_prior_value() {
        let schema = note_schema();
        let mut prior = Fieldset::new();
        prior.insert("title".into(), Value::text("old"));

        let input = raw(&[("$ref", Value::text("n1")), ("title", Value::text("new"))]);
        let (reference, changeset) = normalize_update(&schema, Namespace::Record, "note", &input, &prior).unwrap();
        assert_eq!(reference, "n1");
        assert_eq!(changeset.get("title"), Some(&ValueChange::set_anchored("new", "old")));
    }

    #[test]
    fn update_null_against_prior_becomes_clear() {
        let schema = note_schema();
        let mut prior = Fieldset::new();
        prior.insert("title".into(), Value::text("old"));

        let input = raw(&[("$ref", Value::text("n1")), ("title", Value::Null)]);
        let (_, changeset) = normalize_update(&schema, Namespace::Record, "note", &input, &prior).unwrap();
        assert_eq!(changeset.get("title"), Some(&ValueChange::clear("old")));
    }

    #[test]
    fn update_seq_triples_become_mutations() {
        let schema = note_schema();
        let prior = Fieldset::new();
        let input = raw(&[
            ("$ref", Value::text("n1")),
            ("tags", Value::List(vec![Value::List(vec![Value::text("insert"), Value::text("a")])])),
        ]);
        let (_, changeset) = normalize_update(&schema, Namespace::Record, "note", &input, &prior).unwrap();
        assert_eq!(changeset.get("tags"), Some(&ValueChange::Seq(vec![SeqMutation::Insert { value: Value::text("a"), pos: None }])));
    }

    #[test]
    fn when_condition_unmet_is_rejected() {
        let schema = note_schema();
        let input = raw(&[("type", Value::text("note")), ("title", Value::text("x")), ("archived_reason", Value::text("spam"))]);
        let err = normalize_create(&schema, Namespace::Record, &input).unwrap_err();
        assert!(matches!(err, ValidationError::WhenConditionUnmet { .. }));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let schema = note_schema();
        let input = raw(&[("type", Value::text("note")), ("title", Value::text("x")), ("nonexistent", Value::text("y"))]);
        let err = normalize_create(&schema, Namespace::Record, &input).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownField { .. }));
    }
}
