//! Canonical encoder & hasher (C3): a deterministic byte form for a
//! transaction, and the SHA-256-derived hash identifier computed over it.

use crate::error::{TxError, TxResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use binder_core::{FieldChangeset, SeqMutation, Value, ValueChange};
use binder_schema::{FieldDef, FieldKind, Namespace, Schema};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// One entity's changeset plus the type it belongs to — the type is what
/// lets the canonical encoder resolve each field's schema-assigned id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityChangeset {
    pub type_name: String,
    pub fields: FieldChangeset,
}

impl EntityChangeset {
    #[must_use]
    pub const fn new(type_name: String, fields: FieldChangeset) -> Self {
        Self { type_name, fields }
    }
}

pub type EntitiesChangeset = BTreeMap<String, EntityChangeset>;

/// The fixed 43-character predecessor hash of transaction id 1.
pub const GENESIS_HASH: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Render `digest` (a raw SHA-256 output) as the 43-character URL-safe,
/// unpadded base64 form used throughout as a content-addressed identifier.
#[must_use]
pub fn encode_hash(digest: &[u8; 32]) -> String {
    URL_SAFE_NO_PAD.encode(digest)
}

/// The canonical byte form of a transaction envelope, ready to hash.
///
/// Field order is fixed (`previous`, `createdAt`, `author`, `records?`,
/// `configs?`); `records`/`configs` are omitted entirely when empty.
pub fn canonical_bytes(
    schema: &Schema,
    previous: &str,
    created_at: &str,
    author: &str,
    records: &EntitiesChangeset,
    configs: &EntitiesChangeset,
) -> TxResult<Vec<u8>> {
    let mut out = String::new();
    out.push('{');
    write_key(&mut out, "previous");
    write_json_string(&mut out, previous);

    out.push(',');
    write_key(&mut out, "createdAt");
    write_json_string(&mut out, created_at);

    out.push(',');
    write_key(&mut out, "author");
    write_json_string(&mut out, author);

    let records_body = canonicalize_entities(schema, Namespace::Record, records)?;
    if !records_body.is_empty() {
        out.push(',');
        write_key(&mut out, "records");
        write_entities_body(&mut out, &records_body);
    }

    let configs_body = canonicalize_entities(schema, Namespace::Config, configs)?;
    if !configs_body.is_empty() {
        out.push(',');
        write_key(&mut out, "configs");
        write_entities_body(&mut out, &configs_body);
    }

    out.push('}');
    Ok(out.into_bytes())
}

/// Hash a pre-built canonical byte form.
#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> String {
    let digest: [u8; 32] = Sha256::digest(bytes).into();
    encode_hash(&digest)
}

type CanonicalField = (u32, String, String);

fn canonicalize_entities(
    schema: &Schema,
    namespace: Namespace,
    entities: &EntitiesChangeset,
) -> TxResult<Vec<(String, Vec<CanonicalField>)>> {
    let mut out = Vec::new();
    for (reference, entity) in entities {
        if entity.fields.is_empty() {
            continue;
        }
        let type_def = schema.require_type(namespace, &entity.type_name).map_err(|_| TxError::UnknownType {
            type_name: entity.type_name.clone(),
        })?;

        let mut fields = Vec::new();
        for (key, change) in &entity.fields {
            let Some(field_def) = type_def.get_field(key) else {
                continue; // unknown field: dropped from the canonical form
            };
            let encoded = canonical_value_change(schema, namespace, field_def, change)?;
            fields.push((field_def.id, key.clone(), encoded));
        }
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        if !fields.is_empty() {
            out.push((reference.clone(), fields));
        }
    }
    // Entity references are already in lexicographic order via `BTreeMap` iteration.
    Ok(out)
}

fn write_entities_body(out: &mut String, entities: &[(String, Vec<CanonicalField>)]) {
    out.push('{');
    for (i, (reference, fields)) in entities.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_json_string(out, reference);
        out.push(':');
        out.push('{');
        for (j, (_, key, encoded)) in fields.iter().enumerate() {
            if j > 0 {
                out.push(',');
            }
            write_json_string(out, key);
            out.push(':');
            out.push_str(encoded);
        }
        out.push('}');
    }
    out.push('}');
}

fn canonical_value_change(schema: &Schema, namespace: Namespace, field: &FieldDef, change: &ValueChange) -> TxResult<String> {
    let mut out = String::new();
    match change {
        ValueChange::Set { new, prev: None } => {
            out.push('{');
            write_key(&mut out, "set");
            write_json_value(&mut out, new);
            out.push('}');
        }
        ValueChange::Set { new, prev: Some(prev) } => {
            out.push('{');
            write_key(&mut out, "set");
            write_json_value(&mut out, new);
            out.push(',');
            write_key(&mut out, "prev");
            write_json_value(&mut out, prev);
            out.push('}');
        }
        ValueChange::Clear { prev } => {
            out.push('{');
            write_key(&mut out, "clear");
            write_json_value(&mut out, prev);
            out.push('}');
        }
        ValueChange::Seq(mutations) => {
            let target = relation_target(field);
            let mut ordered: Vec<&SeqMutation> = mutations.iter().collect();
            ordered.sort_by_key(|m| (mutation_position(m), mutation_kind_rank(m)));

            out.push('{');
            write_key(&mut out, "seq");
            out.push('[');
            for (i, mutation) in ordered.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&canonical_seq_mutation(schema, namespace, target, mutation)?);
            }
            out.push(']');
            out.push('}');
        }
        ValueChange::Patch(changeset) => {
            let target = relation_target(field).ok_or_else(|| TxError::Corruption {
                reason: format!("field {} carries a patch but is not a relation", field.key),
            })?;
            out.push('{');
            write_key(&mut out, "patch");
            out.push_str(&canonical_nested_changeset(schema, namespace, target, changeset)?);
            out.push('}');
        }
    }
    Ok(out)
}

fn canonical_nested_changeset(schema: &Schema, namespace: Namespace, type_name: &str, changeset: &FieldChangeset) -> TxResult<String> {
    let type_def = schema.require_type(namespace, type_name).map_err(|_| TxError::UnknownType {
        type_name: type_name.to_string(),
    })?;

    let mut fields = Vec::new();
    for (key, change) in changeset {
        let Some(field_def) = type_def.get_field(key) else { continue };
        let encoded = canonical_value_change(schema, namespace, field_def, change)?;
        fields.push((field_def.id, key.clone(), encoded));
    }
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = String::new();
    out.push('{');
    for (i, (_, key, encoded)) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_json_string(&mut out, key);
        out.push(':');
        out.push_str(encoded);
    }
    out.push('}');
    Ok(out)
}

fn canonical_seq_mutation(schema: &Schema, namespace: Namespace, target: Option<&str>, mutation: &SeqMutation) -> TxResult<String> {
    let mut out = String::new();
    match mutation {
        SeqMutation::Insert { value, pos } => {
            out.push('{');
            write_key(&mut out, "insert");
            write_json_value(&mut out, value);
            out.push(',');
            write_key(&mut out, "pos");
            write_pos(&mut out, *pos);
            out.push('}');
        }
        SeqMutation::Remove { value, pos } => {
            out.push('{');
            write_key(&mut out, "remove");
            write_json_value(&mut out, value);
            out.push(',');
            write_key(&mut out, "pos");
            write_pos(&mut out, *pos);
            out.push('}');
        }
        SeqMutation::Patch { reference, changeset } => {
            let target = target.ok_or_else(|| TxError::Corruption {
                reason: "seq patch mutation on a non-relation field".to_string(),
            })?;
            out.push('{');
            write_key(&mut out, "patch");
            out.push('{');
            write_key(&mut out, "ref");
            write_json_string(&mut out, reference);
            out.push(',');
            write_key(&mut out, "changeset");
            out.push_str(&canonical_nested_changeset(schema, namespace, target, changeset)?);
            out.push('}');
            out.push('}');
        }
    }
    Ok(out)
}

fn relation_target(field: &FieldDef) -> Option<&str> {
    match &field.kind {
        FieldKind::Relation { to } => Some(to.as_str()),
        _ => None,
    }
}

fn mutation_position(mutation: &SeqMutation) -> Option<usize> {
    match mutation {
        SeqMutation::Insert { pos, .. } | SeqMutation::Remove { pos, .. } => *pos,
        SeqMutation::Patch { .. } => None,
    }
}

/// Tie-break for equal positions: insert sorts before remove.
const fn mutation_kind_rank(mutation: &SeqMutation) -> u8 {
    match mutation {
        SeqMutation::Insert { .. } => 0,
        SeqMutation::Remove { .. } => 1,
        SeqMutation::Patch { .. } => 2,
    }
}

fn write_pos(out: &mut String, pos: Option<usize>) {
    match pos {
        Some(p) => {
            out.push_str(&p.to_string());
        }
        None => out.push_str("null"),
    }
}

fn write_key(out: &mut String, key: &str) {
    write_json_string(out, key);
    out.push(':');
}

fn write_json_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Text(s) => write_json_string(out, s),
        Value::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json_value(out, item);
            }
            out.push(']');
        }
        Value::Map(fields) => {
            out.push('{');
            for (i, (k, v)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json_string(out, k);
                out.push(':');
                write_json_value(out, v);
            }
            out.push('}');
        }
    }
}

/// Minimal JSON string escaping: quote, backslash, and C0 control
/// characters only. Everything else — including non-ASCII UTF-8 — passes
/// through untouched.
fn write_json_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
