//! Fieldset changesets (C2): lifting the single-field algebra in
//! [`crate::change`] over a map of fields.

use crate::change::{self, ValueChange};
use crate::error::ChangeResult;
use crate::value::{Fieldset, Value};
use std::collections::BTreeMap;

/// A changeset over a fieldset: field key to the change applied to that
/// field. Keys absent from the changeset are left untouched.
pub type FieldChangeset = BTreeMap<String, ValueChange>;

/// Apply every field change in `changeset` against `fieldset`, returning the
/// resulting fieldset. A field that becomes null is dropped from the result
/// — unless the change that produced it was a `seq`, in which case an
/// explicit null is preserved to distinguish "became empty" from "never
/// set".
pub fn apply(fieldset: &Fieldset, changeset: &FieldChangeset) -> ChangeResult<Fieldset> {
    let mut result = fieldset.clone();
    for (key, change) in changeset {
        let current = result.get(key).cloned().unwrap_or(Value::Null);
        let next = change::apply(&current, change).map_err(|err| err.with_field(key))?;

        let is_seq = matches!(change, ValueChange::Seq(_));
        if next.is_absent() && !is_seq {
            result.remove(key);
        } else {
            result.insert(key.clone(), next);
        }
    }
    Ok(result)
}

/// Invert every field change in a changeset, preserving the key set.
pub fn invert(changeset: &FieldChangeset) -> ChangeResult<FieldChangeset> {
    changeset
        .iter()
        .map(|(key, change)| {
            let inverted = change::inverse(change).map_err(|err| err.with_field(key))?;
            Ok((key.clone(), inverted))
        })
        .collect()
}

/// Compose two changesets applied in sequence (`a` then `b`) into one.
/// Fields present in only one side pass through unchanged; fields present
/// in both are squashed at the value-change level, and dropped entirely
/// from the result if they cancel out.
pub fn squash(a: &FieldChangeset, b: &FieldChangeset) -> ChangeResult<FieldChangeset> {
    let mut result = FieldChangeset::new();

    for (key, a_change) in a {
        match b.get(key) {
            None => {
                result.insert(key.clone(), a_change.clone());
            }
            Some(b_change) => {
                if let Some(squashed) = change::squash(a_change, b_change).map_err(|err| err.with_field(key))? {
                    result.insert(key.clone(), squashed);
                }
            }
        }
    }
    for (key, b_change) in b {
        if !a.contains_key(key) {
            result.insert(key.clone(), b_change.clone());
        }
    }

    Ok(result)
}

/// Rebase `change` (a changeset not yet applied) against `base` (a
/// changeset that has already landed). Fields untouched by `base` pass
/// through unchanged.
pub fn rebase(base: &FieldChangeset, change: &FieldChangeset) -> ChangeResult<FieldChangeset> {
    change
        .iter()
        .map(|(key, value_change)| {
            let rebased = match base.get(key) {
                Some(base_change) => change::rebase(base_change, value_change).map_err(|err| err.with_field(key))?,
                None => value_change.clone(),
            };
            Ok((key.clone(), rebased))
        })
        .collect()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn changeset(pairs: Vec<(&str, ValueChange)>) -> FieldChangeset {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn apply_drops_nulled_field_except_from_seq() {
        let mut fieldset = Fieldset::new();
        fieldset.insert("title".into(), Value::text("a"));
        fieldset.insert("tags".into(), Value::List(vec![Value::text("x")]));

        let cs = changeset(vec![
            ("title", ValueChange::clear("a")),
            (
                "tags",
                ValueChange::Seq(vec![crate::change::SeqMutation::Remove {
                    value: Value::text("x"),
                    pos: None,
                }]),
            ),
        ]);

        let result = apply(&fieldset, &cs).unwrap();
        assert!(!result.contains_key("title"));
        assert_eq!(result.get("tags"), Some(&Value::Null));
    }

    #[test]
    fn apply_then_apply_inverse_round_trips() {
        let mut fieldset = Fieldset::new();
        fieldset.insert("title".into(), Value::text("a"));

        let cs = changeset(vec![("title", ValueChange::set_anchored("b", "a"))]);
        let after = apply(&fieldset, &cs).unwrap();
        let inv = invert(&cs).unwrap();
        let back = apply(&after, &inv).unwrap();
        assert_eq!(back, fieldset);
    }

    #[test]
    fn squash_independent_fields_keeps_both() {
        let a = changeset(vec![("title", ValueChange::set("a"))]);
        let b = changeset(vec![("body", ValueChange::set("b"))]);
        let squashed = squash(&a, &b).unwrap();
        assert_eq!(squashed.len(), 2);
    }

    #[test]
    fn squash_same_field_cancels_to_absent() {
        let a = changeset(vec![("title", ValueChange::set("a"))]);
        let b = changeset(vec![("title", ValueChange::clear("a"))]);
        let squashed = squash(&a, &b).unwrap();
        assert!(squashed.is_empty());
    }

    #[test]
    fn rebase_passes_through_untouched_fields() {
        let base = changeset(vec![("title", ValueChange::set_anchored("b", "a"))]);
        let change = changeset(vec![("body", ValueChange::set("x"))]);
        let rebased = rebase(&base, &change).unwrap();
        assert_eq!(rebased, change);
    }

    use proptest::prelude::*;

    fn arb_scalar_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9_]{0,6}".prop_map(Value::text),
        ]
    }

    fn arb_triple() -> impl Strategy<Value = (Value, Value, Value)> {
        (arb_scalar_value(), arb_scalar_value(), arb_scalar_value())
    }

    proptest! {
        /// Law 1, lifted over a two-field changeset: applying a changeset then
        /// its inverse restores the original fieldset.
        #[test]
        fn law1_fieldset_apply_then_inverse_round_trips(title in arb_triple(), body in arb_triple()) {
            let (t0, t1, _) = title;
            let (b0, b1, _) = body;
            let mut fieldset = Fieldset::new();
            fieldset.insert("title".into(), t0.clone());
            fieldset.insert("body".into(), b0.clone());

            let cs = changeset(vec![
                ("title", ValueChange::set_anchored(t1, t0)),
                ("body", ValueChange::set_anchored(b1, b0)),
            ]);
            let after = apply(&fieldset, &cs).unwrap();
            let inv = invert(&cs).unwrap();
            let back = apply(&after, &inv).unwrap();
            prop_assert_eq!(back, fieldset);
        }

        /// Law 2: applying two changesets in sequence agrees with applying
        /// their squash in one step.
        #[test]
        fn law2_fieldset_squash_agrees_with_sequential_apply(title in arb_triple(), body in arb_triple()) {
            let (t0, t1, t2) = title;
            let (b0, b1, b2) = body;
            let mut fieldset = Fieldset::new();
            fieldset.insert("title".into(), t0.clone());
            fieldset.insert("body".into(), b0.clone());

            let a = changeset(vec![
                ("title", ValueChange::set_anchored(t1.clone(), t0)),
                ("body", ValueChange::set_anchored(b1.clone(), b0)),
            ]);
            let b = changeset(vec![
                ("title", ValueChange::set_anchored(t2, t1)),
                ("body", ValueChange::set_anchored(b2, b1)),
            ]);

            let sequential = apply(&apply(&fieldset, &a).unwrap(), &b).unwrap();
            let squashed = squash(&a, &b).unwrap();
            let composed = apply(&fieldset, &squashed).unwrap();
            prop_assert_eq!(sequential, composed);
        }

        /// Law 3: squashing a changeset with its own inverse yields the empty
        /// changeset, field by field.
        #[test]
        fn law3_fieldset_squash_with_own_inverse_cancels(title in arb_triple(), body in arb_triple()) {
            let (t0, t1, _) = title;
            let (b0, b1, _) = body;
            let cs = changeset(vec![
                ("title", ValueChange::set_anchored(t1, t0)),
                ("body", ValueChange::set_anchored(b1, b0)),
            ]);
            let inv = invert(&cs).unwrap();
            let squashed = squash(&cs, &inv).unwrap();
            prop_assert!(squashed.is_empty());
        }
    }
}
