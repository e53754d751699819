//! The patch DSL parser (C8): turns tokens like `tags+=urgent,important` or
//! `title=New title` into a [`FieldChangeset`], ready to feed into C2.

use crate::error::{DslError, DslResult};
use binder_core::value::Value;
use binder_core::{FieldChangeset, SeqMutation, ValueChange};
use binder_schema::TypeDef;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    Set,
    Insert,
    Remove,
    RemoveByPosition,
}

enum Accessor {
    Position(usize),
    Last,
    Reference(String),
}

/// Parse a whitespace-separated patch-DSL invocation, merging per-field
/// results into one changeset.
pub fn parse_str(type_def: &TypeDef, input: &str) -> DslResult<FieldChangeset> {
    let tokens: Vec<&str> = input.split_ascii_whitespace().collect();
    parse_tokens(type_def, &tokens)
}

/// Parse already-split tokens (e.g. CLI argv), merging per-field results
/// into one changeset. Fields with compatible list operations across
/// multiple tokens are merged; incompatible operations on the same field
/// fail [`DslError::DuplicateFieldPatch`].
pub fn parse_tokens(type_def: &TypeDef, tokens: &[&str]) -> DslResult<FieldChangeset> {
    let mut changeset = FieldChangeset::new();
    for token in tokens {
        let (field, change) = parse_token(type_def, token)?;
        merge_into(&mut changeset, field, change)?;
    }
    Ok(changeset)
}

fn merge_into(changeset: &mut FieldChangeset, field: String, change: ValueChange) -> DslResult<()> {
    match changeset.remove(&field) {
        None => {
            changeset.insert(field, change);
        }
        Some(ValueChange::Seq(mut existing)) => match change {
            ValueChange::Seq(more) => {
                existing.extend(more);
                changeset.insert(field, ValueChange::Seq(existing));
            }
            _ => return Err(DslError::DuplicateFieldPatch { field }),
        },
        Some(_) => return Err(DslError::DuplicateFieldPatch { field }),
    }
    Ok(())
}

fn parse_token(type_def: &TypeDef, token: &str) -> DslResult<(String, ValueChange)> {
    let (field_part, accessor_part, op, op_end) = split_token(token)?;

    let field_def = type_def
        .get_field(field_part)
        .ok_or_else(|| DslError::UnknownField { field: field_part.to_string() })?;
    let raw_value = &token[op_end..];
    let accessor = accessor_part.map(parse_accessor);

    let change = match op {
        Op::Set => ValueChange::set(parse_value(raw_value)?),
        Op::Insert => build_seq_change(raw_value, &accessor, field_def.list_delimiter, SeqKind::Insert)?,
        Op::Remove => build_seq_change(raw_value, &accessor, field_def.list_delimiter, SeqKind::Remove)?,
        Op::RemoveByPosition => {
            let pos = match accessor {
                Some(Accessor::Position(p)) => Some(p),
                Some(Accessor::Last) => None,
                Some(Accessor::Reference(_)) | None => {
                    return Err(DslError::MissingRemoveValue { field: field_part.to_string() });
                }
            };
            ValueChange::Seq(vec![SeqMutation::Remove { value: Value::Null, pos }])
        }
    };

    Ok((field_part.to_string(), change))
}

#[derive(Clone, Copy)]
enum SeqKind {
    Insert,
    Remove,
}

fn build_seq_change(raw_value: &str, accessor: &Option<Accessor>, delimiter: char, kind: SeqKind) -> DslResult<ValueChange> {
    if let Some(Accessor::Reference(reference)) = accessor {
        if raw_value.starts_with('{') {
            let literal = parse_value(raw_value)?;
            let Value::Map(fields) = literal else {
                return Err(DslError::MalformedLiteral { token: raw_value.to_string() });
            };
            let changeset: FieldChangeset = fields.into_iter().map(|(k, v)| (k, ValueChange::set(v))).collect();
            return Ok(ValueChange::Seq(vec![SeqMutation::Patch {
                reference: reference.clone(),
                changeset,
            }]));
        }
    }

    let pos = match accessor {
        None | Some(Accessor::Last) => None,
        Some(Accessor::Position(p)) => Some(*p),
        Some(Accessor::Reference(_)) => None,
    };

    let mutations = raw_value
        .split(delimiter)
        .filter(|s| !s.is_empty())
        .map(|item| {
            let value = parse_value(item)?;
            Ok(match kind {
                SeqKind::Insert => SeqMutation::Insert { value, pos },
                SeqKind::Remove => SeqMutation::Remove { value, pos },
            })
        })
        .collect::<DslResult<Vec<_>>>()?;

    Ok(ValueChange::Seq(mutations))
}

fn parse_accessor(raw: &str) -> Accessor {
    match raw {
        "first" | "0" => Accessor::Position(0),
        "last" => Accessor::Last,
        _ if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => {
            Accessor::Position(raw.parse().expect("all-digit accessor parses as usize"))
        }
        _ => Accessor::Reference(raw.to_string()),
    }
}

fn parse_value(raw: &str) -> DslResult<Value> {
    if raw.is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(raw).map_err(|_| DslError::MalformedLiteral { token: raw.to_string() })
}

/// Split `token` into `(field, accessor, op, op_end_byte)`. The field name
/// runs up to the first `:` (accessor delimiter) or operator, whichever
/// comes first; the accessor (if any) runs from there to the operator.
fn split_token(token: &str) -> DslResult<(&str, Option<&str>, Op, usize)> {
    let op_match = find_operator(token);
    let colon = token.find(':');

    match (colon, op_match) {
        (Some(colon_pos), Some((op, op_start, op_end))) if colon_pos < op_start => {
            Ok((&token[..colon_pos], Some(&token[colon_pos + 1..op_start]), op, op_end))
        }
        (_, Some((op, op_start, op_end))) => Ok((&token[..op_start], None, op, op_end)),
        (_, None) => Err(DslError::UnknownOperator { token: token.to_string() }),
    }
}

fn find_operator(s: &str) -> Option<(Op, usize, usize)> {
    let mut i = 0;
    while i < s.len() {
        let rest = &s[i..];
        if rest.starts_with("+=") {
            return Some((Op::Insert, i, i + 2));
        }
        if rest.starts_with("-=") {
            return Some((Op::Remove, i, i + 2));
        }
        if rest.starts_with("--") {
            return Some((Op::RemoveByPosition, i, i + 2));
        }
        if rest.starts_with('=') {
            return Some((Op::Set, i, i + 1));
        }
        i += rest.chars().next().map_or(1, char::len_utf8);
    }
    None
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use binder_schema::{FieldDef, FieldKind};

    fn note_type() -> TypeDef {
        TypeDef::new(
            "note",
            vec![
                FieldDef::new(0, "title".into(), FieldKind::Text),
                FieldDef::new(1, "tags".into(), FieldKind::Text).list(),
                FieldDef::new(2, "links".into(), FieldKind::Relation { to: "note".into() }).list(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn set_parses_plain_scalar() {
        let type_def = note_type();
        let changeset = parse_str(&type_def, "title=New title").unwrap();
        assert_eq!(changeset.get("title"), Some(&ValueChange::set("New title")));
    }

    #[test]
    fn insert_splits_by_delimiter_with_no_position() {
        let type_def = note_type();
        let changeset = parse_str(&type_def, "tags+=urgent,important").unwrap();
        assert_eq!(
            changeset.get("tags"),
            Some(&ValueChange::Seq(vec![
                SeqMutation::Insert { value: Value::text("urgent"), pos: None },
                SeqMutation::Insert { value: Value::text("important"), pos: None },
            ]))
        );
    }

    #[test]
    fn remove_by_position_uses_null_value() {
        let type_def = note_type();
        let changeset = parse_str(&type_def, "tags:0--").unwrap();
        assert_eq!(changeset.get("tags"), Some(&ValueChange::Seq(vec![SeqMutation::Remove { value: Value::Null, pos: Some(0) }])));
    }

    #[test]
    fn remove_by_position_without_accessor_fails() {
        let type_def = note_type();
        let err = parse_str(&type_def, "tags--").unwrap_err();
        assert!(matches!(err, DslError::MissingRemoveValue { .. }));
    }

    #[test]
    fn string_accessor_with_brace_value_becomes_patch() {
        let type_def = note_type();
        let changeset = parse_str(&type_def, "links:n42+={title: Renamed}").unwrap();
        match changeset.get("links") {
            Some(ValueChange::Seq(mutations)) => {
                assert_eq!(mutations.len(), 1);
                assert!(matches!(&mutations[0], SeqMutation::Patch { reference, .. } if reference == "n42"));
            }
            other => panic!("expected a seq patch mutation, got {other:?}"),
        }
    }

    #[test]
    fn conflicting_ops_on_same_field_fail_duplicate_field_patch() {
        let type_def = note_type();
        let err = parse_str(&type_def, "title=a title--").unwrap_err();
        assert!(matches!(err, DslError::DuplicateFieldPatch { .. }));
    }

    #[test]
    fn compatible_seq_ops_on_same_field_merge() {
        let type_def = note_type();
        let changeset = parse_str(&type_def, "tags+=urgent tags+=important").unwrap();
        assert_eq!(
            changeset.get("tags"),
            Some(&ValueChange::Seq(vec![
                SeqMutation::Insert { value: Value::text("urgent"), pos: None },
                SeqMutation::Insert { value: Value::text("important"), pos: None },
            ]))
        );
    }

    #[test]
    fn unknown_field_is_rejected() {
        let type_def = note_type();
        let err = parse_str(&type_def, "nonexistent=x").unwrap_err();
        assert!(matches!(err, DslError::UnknownField { .. }));
    }
}
