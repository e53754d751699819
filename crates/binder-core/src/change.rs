//! The value-change algebra (C1): `apply`, `inverse`, `squash`, `rebase` over
//! a single field's [`ValueChange`]. All operations are pure — they consume
//! references and return new values, never mutate in place.

use crate::error::{ChangeError, ChangeResult};
use crate::fieldset::{self, FieldChangeset};
use crate::relation::{self, RelationTuple};
use crate::value::Value;
use serde::{Deserialize, Serialize};

///
/// ValueChange
///
/// Tagged sum describing how a single field's value changes. `Set`/`Clear`
/// carry an optional/required anchor (`prev`) against which `apply` checks
/// the field's current value. `Seq` carries an ordered list of positional
/// mutations; `Patch` carries a nested changeset applied to a relation's
/// attrs, promoting a bare reference to a tuple as needed.
///

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueChange {
    Set { new: Value, prev: Option<Value> },
    Clear { prev: Value },
    Seq(Vec<SeqMutation>),
    Patch(FieldChangeset),
}

impl ValueChange {
    /// Shorthand constructor for an unanchored `set(new)`.
    #[must_use]
    pub fn set(new: impl Into<Value>) -> Self {
        Self::Set {
            new: new.into(),
            prev: None,
        }
    }

    /// Shorthand constructor for an anchored `set(new, prev)`.
    #[must_use]
    pub fn set_anchored(new: impl Into<Value>, prev: impl Into<Value>) -> Self {
        Self::Set {
            new: new.into(),
            prev: Some(prev.into()),
        }
    }

    /// Shorthand constructor for `clear(prev)`.
    #[must_use]
    pub fn clear(prev: impl Into<Value>) -> Self {
        Self::Clear { prev: prev.into() }
    }
}

///
/// SeqMutation
///
/// One step of an ordered-list mutation, applied left-to-right against the
/// current list value by [`apply`].
///

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeqMutation {
    Insert { value: Value, pos: Option<usize> },
    Remove { value: Value, pos: Option<usize> },
    Patch { reference: String, changeset: FieldChangeset },
}

/// Endpoint form of a `Set`/`Clear` change: `(new, prev)` with `None`
/// standing in for null/absence on either side.
type Endpoint = (Option<Value>, Option<Value>);

fn endpoint_of(change: &ValueChange) -> Endpoint {
    match change {
        ValueChange::Set { new, prev } => (Some(new.clone()), prev.clone()),
        ValueChange::Clear { prev } => (None, Some(prev.clone())),
        _ => unreachable!("endpoint_of called on a non set/clear change"),
    }
}

fn endpoint_to_change(new: Option<Value>, prev: Option<Value>) -> ChangeResult<ValueChange> {
    match new {
        Some(new) => Ok(ValueChange::Set { new, prev }),
        None => prev
            .map(|prev| ValueChange::Clear { prev })
            .ok_or(ChangeError::CannotRebaseSet),
    }
}

/// Apply a value change against the field's current value (`Value::Null`
/// standing in for an absent field). Returns the new value, or
/// `Value::Null` when the field becomes absent (empty lists are coerced to
/// absent as well).
pub fn apply(current: &Value, change: &ValueChange) -> ChangeResult<Value> {
    match change {
        ValueChange::Set { new, prev } => {
            let ok = if current.is_absent() {
                prev.is_none()
            } else {
                prev.as_ref() == Some(current)
            };
            if !ok {
                return Err(ChangeError::SetPrecondition {
                    expected: prev.as_ref().map_or_else(|| "null".to_string(), ToString::to_string),
                    found: current.to_string(),
                });
            }
            Ok(new.clone())
        }
        ValueChange::Clear { prev } => {
            if current != prev {
                return Err(ChangeError::ClearPrecondition {
                    expected: prev.to_string(),
                    found: current.to_string(),
                });
            }
            Ok(Value::Null)
        }
        ValueChange::Seq(mutations) => apply_seq(current, mutations),
        ValueChange::Patch(changeset) => apply_patch(current, changeset),
    }
}

fn apply_seq(current: &Value, mutations: &[SeqMutation]) -> ChangeResult<Value> {
    let mut list = current.clone().into_list().ok_or(ChangeError::NotAList)?;
    for (index, mutation) in mutations.iter().enumerate() {
        apply_seq_mutation(&mut list, mutation).map_err(|err| err.with_index(index))?;
    }
    Ok(if list.is_empty() {
        Value::Null
    } else {
        Value::List(list)
    })
}

fn apply_seq_mutation(list: &mut Vec<Value>, mutation: &SeqMutation) -> ChangeResult<()> {
    match mutation {
        SeqMutation::Insert { value, pos } => match pos {
            None => {
                list.push(value.clone());
                Ok(())
            }
            Some(p) => {
                // Toggle rule: inserting a value already present at `pos` removes it
                // instead, supporting self-cancellation under replay.
                if *p < list.len() && &list[*p] == value {
                    list.remove(*p);
                    Ok(())
                } else if *p <= list.len() {
                    list.insert(*p, value.clone());
                    Ok(())
                } else {
                    Err(ChangeError::PositionOutOfRange {
                        pos: *p,
                        len: list.len(),
                    })
                }
            }
        },
        SeqMutation::Remove { value, pos } => {
            let idx = match pos {
                Some(p) => *p,
                None => match list.len().checked_sub(1) {
                    Some(last) => last,
                    None => {
                        return Err(ChangeError::PositionOutOfRange { pos: 0, len: 0 });
                    }
                },
            };
            if idx >= list.len() {
                return Err(ChangeError::PositionOutOfRange { pos: idx, len: list.len() });
            }
            if &list[idx] != value {
                return Err(ChangeError::RemoveValueMismatch {
                    expected: value.to_string(),
                    found: list[idx].to_string(),
                });
            }
            list.remove(idx);
            Ok(())
        }
        SeqMutation::Patch { reference, changeset } => {
            let idx = list
                .iter()
                .position(|v| relation::reference_of(v) == Some(reference.as_str()))
                .ok_or_else(|| ChangeError::RefNotFound {
                    reference: reference.clone(),
                })?;
            let tuple = relation::promote(&list[idx])?;
            let new_attrs = fieldset::apply(&tuple.attrs, changeset).map_err(|err| err.with_field(reference))?;
            list[idx] = RelationTuple {
                reference: tuple.reference,
                attrs: new_attrs,
            }
            .into_tuple_value();
            Ok(())
        }
    }
}

fn apply_patch(current: &Value, changeset: &FieldChangeset) -> ChangeResult<Value> {
    let tuple = relation::promote(current)?;
    let new_attrs = fieldset::apply(&tuple.attrs, changeset)?;
    Ok(RelationTuple {
        reference: tuple.reference,
        attrs: new_attrs,
    }
    .into_tuple_value())
}

/// Produce the inverse of a value change: applying `c` then `inverse(c)`
/// restores the original value.
pub fn inverse(change: &ValueChange) -> ChangeResult<ValueChange> {
    match change {
        ValueChange::Set { new, prev: None } => Ok(ValueChange::Clear { prev: new.clone() }),
        ValueChange::Set { new, prev: Some(prev) } => Ok(ValueChange::Set {
            new: prev.clone(),
            prev: Some(new.clone()),
        }),
        ValueChange::Clear { prev } => Ok(ValueChange::Set {
            new: prev.clone(),
            prev: None,
        }),
        ValueChange::Seq(mutations) => {
            let mut inverted = Vec::with_capacity(mutations.len());
            for mutation in mutations.iter().rev() {
                inverted.push(inverse_mutation(mutation)?);
            }
            Ok(ValueChange::Seq(inverted))
        }
        ValueChange::Patch(changeset) => Ok(ValueChange::Patch(fieldset::invert(changeset)?)),
    }
}

fn inverse_mutation(mutation: &SeqMutation) -> ChangeResult<SeqMutation> {
    match mutation {
        SeqMutation::Insert { value, pos } => Ok(SeqMutation::Remove {
            value: value.clone(),
            pos: *pos,
        }),
        SeqMutation::Remove { value, pos } => Ok(SeqMutation::Insert {
            value: value.clone(),
            pos: *pos,
        }),
        SeqMutation::Patch { reference, changeset } => Ok(SeqMutation::Patch {
            reference: reference.clone(),
            changeset: fieldset::invert(changeset)?,
        }),
    }
}

/// Compose `a` then `b` (applied against the same field, in that order)
/// into a single equivalent change. `None` means the two changes cancel:
/// the field is dropped from the squashed changeset entirely.
pub fn squash(a: &ValueChange, b: &ValueChange) -> ChangeResult<Option<ValueChange>> {
    use ValueChange::{Clear, Patch, Seq, Set};

    match (a, b) {
        (Set { .. } | Clear { .. }, Set { .. } | Clear { .. }) => squash_endpoints(a, b),
        (Set { .. } | Clear { .. }, Seq(_) | Patch(_)) => squash_materialize(a, b),
        (Seq(a_ms), Seq(b_ms)) => {
            let merged = squash_seq(a_ms, b_ms)?;
            if merged.is_empty() {
                Ok(None)
            } else {
                Ok(Some(Seq(merged)))
            }
        }
        (Patch(a_cs), Patch(b_cs)) => {
            let merged = fieldset::squash(a_cs, b_cs)?;
            if merged.is_empty() {
                Ok(None)
            } else {
                Ok(Some(Patch(merged)))
            }
        }
        // Unlisted kind combinations (e.g. a `seq` followed by a full `set`) have no
        // concrete prior value to symbolically combine against; the later change wins.
        _ => Ok(Some(b.clone())),
    }
}

fn squash_endpoints(a: &ValueChange, b: &ValueChange) -> ChangeResult<Option<ValueChange>> {
    let (a_new, a_prev) = endpoint_of(a);
    let (b_new, b_prev) = endpoint_of(b);

    if b_prev != a_new {
        return Err(ChangeError::SetPrecondition {
            expected: a_new.map_or_else(|| "null".to_string(), |v| v.to_string()),
            found: b_prev.map_or_else(|| "null".to_string(), |v| v.to_string()),
        });
    }

    if b_new == a_prev {
        Ok(None)
    } else {
        Ok(Some(endpoint_to_change(b_new, a_prev)?))
    }
}

fn squash_materialize(a: &ValueChange, b: &ValueChange) -> ChangeResult<Option<ValueChange>> {
    let (a_new, a_prev) = endpoint_of(a);
    let base = a_new.unwrap_or(Value::Null);
    let materialized = apply(&base, b)?;
    let new_opt = if materialized.is_absent() {
        None
    } else {
        Some(materialized)
    };

    if new_opt == a_prev {
        Ok(None)
    } else {
        Ok(Some(endpoint_to_change(new_opt, a_prev)?))
    }
}

fn squash_seq(a_ms: &[SeqMutation], b_ms: &[SeqMutation]) -> ChangeResult<Vec<SeqMutation>> {
    let mut combined: Vec<SeqMutation> = Vec::with_capacity(a_ms.len() + b_ms.len());
    for mutation in a_ms.iter().chain(b_ms.iter()) {
        merge_seq_mutation(&mut combined, mutation.clone())?;
    }
    Ok(combined)
}

fn merge_seq_mutation(combined: &mut Vec<SeqMutation>, mutation: SeqMutation) -> ChangeResult<()> {
    match &mutation {
        SeqMutation::Patch { reference, changeset } => {
            if let Some(SeqMutation::Patch {
                reference: last_ref,
                changeset: last_cs,
            }) = combined.last()
            {
                if last_ref == reference {
                    let merged = fieldset::squash(last_cs, changeset)?;
                    combined.pop();
                    if !merged.is_empty() {
                        combined.push(SeqMutation::Patch {
                            reference: reference.clone(),
                            changeset: merged,
                        });
                    }
                    return Ok(());
                }
            }
            combined.push(mutation);
            Ok(())
        }
        SeqMutation::Remove { value, pos } => {
            let cancel_idx = combined.iter().position(|existing| {
                matches!(existing, SeqMutation::Insert { value: iv, pos: ip } if iv == value && ip == pos)
            });
            if let Some(idx) = cancel_idx {
                combined.remove(idx);
                if let Some(p) = pos {
                    for later in &mut combined[idx..] {
                        decrement_position_if_greater(later, *p);
                    }
                }
                return Ok(());
            }
            combined.push(mutation);
            Ok(())
        }
        SeqMutation::Insert { .. } => {
            combined.push(mutation);
            Ok(())
        }
    }
}

fn decrement_position_if_greater(mutation: &mut SeqMutation, threshold: usize) {
    match mutation {
        SeqMutation::Insert { pos: Some(p), .. } | SeqMutation::Remove { pos: Some(p), .. } => {
            if *p > threshold {
                *p -= 1;
            }
        }
        _ => {}
    }
}

/// Adjust `change` so that, applied after `base` has already landed, it
/// achieves what it would have achieved against the common ancestor.
pub fn rebase(base: &ValueChange, change: &ValueChange) -> ChangeResult<ValueChange> {
    use ValueChange::{Clear, Patch, Seq, Set};

    match (base, change) {
        (Set { .. } | Clear { .. }, Set { .. } | Clear { .. }) => rebase_endpoints(base, change),
        (Seq(base_ms), Seq(change_ms)) => Ok(Seq(rebase_seq(base_ms, change_ms)?)),
        (Patch(base_cs), Patch(change_cs)) => Ok(Patch(fieldset::rebase(base_cs, change_cs)?)),
        _ => Ok(change.clone()),
    }
}

fn rebase_endpoints(base: &ValueChange, change: &ValueChange) -> ChangeResult<ValueChange> {
    let (base_new, base_prev) = endpoint_of(base);
    let (change_new, change_prev) = endpoint_of(change);

    if change_prev == base_new {
        Ok(change.clone())
    } else if change_prev == base_prev {
        endpoint_to_change(change_new, base_new)
    } else {
        Err(ChangeError::CannotRebaseSet)
    }
}

fn rebase_seq(base_ms: &[SeqMutation], change_ms: &[SeqMutation]) -> ChangeResult<Vec<SeqMutation>> {
    change_ms.iter().map(|m| rebase_seq_mutation(base_ms, m)).collect()
}

fn rebase_seq_mutation(base_ms: &[SeqMutation], mutation: &SeqMutation) -> ChangeResult<SeqMutation> {
    match mutation {
        SeqMutation::Insert { value, pos: Some(p) } => Ok(SeqMutation::Insert {
            value: value.clone(),
            pos: Some(adjust_position(base_ms, true, *p)?),
        }),
        SeqMutation::Remove { value, pos: Some(p) } => Ok(SeqMutation::Remove {
            value: value.clone(),
            pos: Some(adjust_position(base_ms, false, *p)?),
        }),
        SeqMutation::Patch { reference, changeset } => {
            for base_mutation in base_ms {
                if let SeqMutation::Patch {
                    reference: base_ref,
                    changeset: base_cs,
                } = base_mutation
                {
                    if base_ref == reference {
                        return Ok(SeqMutation::Patch {
                            reference: reference.clone(),
                            changeset: fieldset::rebase(base_cs, changeset)?,
                        });
                    }
                }
            }
            Ok(mutation.clone())
        }
        // Trailing (position-less) inserts/removes have no fixed index to rebase.
        _ => Ok(mutation.clone()),
    }
}

fn adjust_position(base_ms: &[SeqMutation], target_is_insert: bool, original_pos: usize) -> ChangeResult<usize> {
    let mut pos = original_pos;
    for base_mutation in base_ms {
        match base_mutation {
            SeqMutation::Insert { pos: Some(bp), .. } => {
                if target_is_insert && *bp == original_pos {
                    return Err(ChangeError::RebaseConflict);
                }
                if *bp <= pos {
                    pos += 1;
                }
            }
            SeqMutation::Remove { pos: Some(bp), .. } => {
                if !target_is_insert && *bp == original_pos {
                    return Err(ChangeError::RebaseConflict);
                }
                if *bp < pos {
                    pos = pos.saturating_sub(1);
                }
            }
            _ => {}
        }
    }
    Ok(pos)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_into_empty_list_then_remove_coerces_to_null() {
        let after_insert = apply(&Value::Null, &ValueChange::Seq(vec![SeqMutation::Insert {
            value: Value::text("x"),
            pos: None,
        }]))
        .unwrap();
        assert_eq!(after_insert, Value::List(vec![Value::text("x")]));

        let after_remove = apply(
            &after_insert,
            &ValueChange::Seq(vec![SeqMutation::Remove {
                value: Value::text("x"),
                pos: None,
            }]),
        )
        .unwrap();
        assert_eq!(after_remove, Value::Null);
    }

    #[test]
    fn insert_toggle_removes_matching_value_at_position() {
        let tags = Value::List(vec![Value::text("a"), Value::text("b")]);
        let result = apply(
            &tags,
            &ValueChange::Seq(vec![SeqMutation::Insert {
                value: Value::text("b"),
                pos: Some(1),
            }]),
        )
        .unwrap();
        assert_eq!(result, Value::List(vec![Value::text("a")]));
    }

    #[test]
    fn set_on_absent_field_requires_unanchored_prev() {
        let err = apply(&Value::Null, &ValueChange::set_anchored("a", "b")).unwrap_err();
        assert!(matches!(err, ChangeError::SetPrecondition { .. }));

        let ok = apply(&Value::Null, &ValueChange::set("a")).unwrap();
        assert_eq!(ok, Value::text("a"));
    }

    #[test]
    fn set_on_present_field_requires_matching_prev() {
        let current = Value::text("a");
        let err = apply(&current, &ValueChange::set("b")).unwrap_err();
        assert!(matches!(err, ChangeError::SetPrecondition { .. }));

        let ok = apply(&current, &ValueChange::set_anchored("b", "a")).unwrap();
        assert_eq!(ok, Value::text("b"));
    }

    #[test]
    fn apply_then_inverse_round_trips() {
        let current = Value::text("a");
        let change = ValueChange::set_anchored("b", "a");
        let next = apply(&current, &change).unwrap();
        let back = apply(&next, &inverse(&change).unwrap()).unwrap();
        assert_eq!(back, current);
    }

    #[test]
    fn squash_create_then_delete_cancels() {
        let create = ValueChange::set("v");
        let delete = ValueChange::clear("v");
        assert_eq!(squash(&create, &delete).unwrap(), None);
    }

    #[test]
    fn squash_self_with_inverse_cancels() {
        let change = ValueChange::set_anchored("b", "a");
        let inv = inverse(&change).unwrap();
        assert_eq!(squash(&change, &inv).unwrap(), None);
    }

    #[test]
    fn squash_seq_cancels_matching_insert_remove_with_renumbering() {
        let a = ValueChange::Seq(vec![
            SeqMutation::Insert { value: Value::from(17i64), pos: Some(2) },
            SeqMutation::Remove { value: Value::from(15i64), pos: Some(6) },
        ]);
        let b = ValueChange::Seq(vec![SeqMutation::Remove { value: Value::from(17i64), pos: Some(2) }]);

        let squashed = squash(&a, &b).unwrap().unwrap();
        assert_eq!(
            squashed,
            ValueChange::Seq(vec![SeqMutation::Remove { value: Value::from(15i64), pos: Some(5) }])
        );
    }

    #[test]
    fn squash_seq_insert_remove_pair_cancels_entirely() {
        let a = ValueChange::Seq(vec![SeqMutation::Insert { value: Value::text("x"), pos: Some(0) }]);
        let b = ValueChange::Seq(vec![SeqMutation::Remove { value: Value::text("x"), pos: Some(0) }]);
        assert_eq!(squash(&a, &b).unwrap(), None);
    }

    #[test]
    fn rebase_set_reanchors_on_common_ancestor() {
        let base = ValueChange::set_anchored("b", "a");
        let change = ValueChange::set_anchored("c", "a");
        let rebased = rebase(&base, &change).unwrap();
        assert_eq!(rebased, ValueChange::set_anchored("c", "b"));
    }

    #[test]
    fn rebase_set_conflict_on_divergent_anchor() {
        let base = ValueChange::set_anchored("b", "a");
        let change = ValueChange::set_anchored("c", "z");
        assert_eq!(rebase(&base, &change).unwrap_err(), ChangeError::CannotRebaseSet);
    }

    #[test]
    fn rebase_insert_shifts_position_past_base_insert() {
        let base = ValueChange::Seq(vec![SeqMutation::Insert { value: Value::text("x"), pos: Some(0) }]);
        let change = ValueChange::Seq(vec![SeqMutation::Insert { value: Value::text("y"), pos: Some(0) }]);
        let rebased = rebase(&base, &change).unwrap();
        assert_eq!(
            rebased,
            ValueChange::Seq(vec![SeqMutation::Insert { value: Value::text("y"), pos: Some(1) }])
        );
    }

    #[test]
    fn rebase_insert_collision_at_same_position_conflicts() {
        // Two concurrent inserts at the same position, base committed first.
        let base = ValueChange::Seq(vec![SeqMutation::Insert { value: Value::text("x"), pos: Some(2) }]);
        let change = ValueChange::Seq(vec![SeqMutation::Insert { value: Value::text("y"), pos: Some(2) }]);
        let err = rebase(&base, &change).unwrap_err();
        assert_eq!(err, ChangeError::RebaseConflict);
    }

    use proptest::prelude::*;

    fn arb_scalar_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9_]{0,8}".prop_map(Value::text),
        ]
    }

    proptest! {
        /// Law 1: applying a change then its inverse restores the original value.
        #[test]
        fn law1_apply_then_inverse_round_trips(current in arb_scalar_value(), new in arb_scalar_value()) {
            let change = ValueChange::set_anchored(new, current.clone());
            let next = apply(&current, &change).unwrap();
            let back = apply(&next, &inverse(&change).unwrap()).unwrap();
            prop_assert_eq!(back, current);
        }

        /// Law 3: squashing a change with its own inverse cancels entirely.
        #[test]
        fn law3_squash_with_own_inverse_cancels(current in arb_scalar_value(), new in arb_scalar_value()) {
            let change = ValueChange::set_anchored(new, current);
            let inv = inverse(&change).unwrap();
            prop_assert_eq!(squash(&change, &inv).unwrap(), None);
        }

        /// Law 3, sequence form: a positional insert and the matching remove
        /// cancel regardless of the value or position involved.
        #[test]
        fn law3_seq_insert_remove_pair_cancels(value in arb_scalar_value(), pos in 0usize..16) {
            let insert = ValueChange::Seq(vec![SeqMutation::Insert { value: value.clone(), pos: Some(pos) }]);
            let remove = ValueChange::Seq(vec![SeqMutation::Remove { value, pos: Some(pos) }]);
            prop_assert_eq!(squash(&insert, &remove).unwrap(), None);
        }

        /// Law 4: inverting a squash is the same as squashing the inverses in
        /// reverse order (anti-homomorphism), whenever the squash doesn't cancel
        /// the field outright.
        #[test]
        fn law4_inverse_of_squash_is_squash_of_inverses_reversed(
            v0 in arb_scalar_value(), v1 in arb_scalar_value(), v2 in arb_scalar_value(),
        ) {
            prop_assume!(v0 != v2);
            let a = ValueChange::set_anchored(v1.clone(), v0);
            let b = ValueChange::set_anchored(v2, v1);

            let squashed = squash(&a, &b).unwrap().unwrap();
            let inverse_of_squashed = inverse(&squashed).unwrap();

            let squash_of_inverses = squash(&inverse(&b).unwrap(), &inverse(&a).unwrap()).unwrap().unwrap();
            prop_assert_eq!(inverse_of_squashed, squash_of_inverses);
        }

        /// Law 5: rebasing a concurrent change against a landed base, then
        /// applying it after the base, agrees with applying the original
        /// change directly to the common ancestor.
        #[test]
        fn law5_rebase_then_apply_agrees_with_direct_application(
            ancestor in arb_scalar_value(), base_new in arb_scalar_value(), change_new in arb_scalar_value(),
        ) {
            let base = ValueChange::set_anchored(base_new.clone(), ancestor.clone());
            let change = ValueChange::set_anchored(change_new, ancestor.clone());

            let after_base = apply(&ancestor, &base).unwrap();
            let rebased = rebase(&base, &change).unwrap();
            let applied_after_base = apply(&after_base, &rebased).unwrap();
            let applied_direct = apply(&ancestor, &change).unwrap();
            prop_assert_eq!(applied_after_base, applied_direct);
        }

        /// Sequence specifics: inserting into an absent field then removing the
        /// same value coerces back to absent, for any scalar value.
        #[test]
        fn seq_insert_into_absent_then_remove_coerces_to_null(value in arb_scalar_value()) {
            let after_insert = apply(&Value::Null, &ValueChange::Seq(vec![SeqMutation::Insert {
                value: value.clone(),
                pos: None,
            }]))
            .unwrap();
            prop_assert_eq!(&after_insert, &Value::List(vec![value.clone()]));

            let after_remove = apply(
                &after_insert,
                &ValueChange::Seq(vec![SeqMutation::Remove { value, pos: None }]),
            )
            .unwrap();
            prop_assert_eq!(after_remove, Value::Null);
        }
    }
}
