//! Transaction model (C4): hash-chained entries grouping per-entity
//! changesets across the record and config namespaces.

use crate::canonical::{canonical_bytes, hash_bytes, EntitiesChangeset, EntityChangeset, GENESIS_HASH};
use crate::error::{TxError, TxResult};
use binder_core::fieldset;
use binder_schema::Schema;
use serde::{Deserialize, Serialize};

///
/// Transaction
///
/// The atomic unit of history. Immutable after construction; `hash` is the
/// content-addressed digest of the canonical form (C3) and `previous`
/// chains it to its predecessor.
///

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,
    pub hash: String,
    pub previous: String,
    pub created_at: String,
    pub author: String,
    pub records: EntitiesChangeset,
    pub configs: EntitiesChangeset,
}

impl Transaction {
    /// The synthetic predecessor of transaction id 1: id 0, the all-`A`
    /// hash, and a fixed epoch timestamp. Exists so `append` of the first
    /// real transaction validates against a concrete value.
    #[must_use]
    pub fn genesis() -> Self {
        Self {
            id: 0,
            hash: GENESIS_HASH.to_string(),
            previous: String::new(),
            created_at: "1970-01-01T00:00:00.000Z".to_string(),
            author: "genesis".to_string(),
            records: EntitiesChangeset::new(),
            configs: EntitiesChangeset::new(),
        }
    }

    /// Construct and hash a new transaction chained after `predecessor`.
    /// Drops any entity whose changeset is empty (an invariant of the
    /// canonical form) before hashing.
    pub fn construct(
        schema: &Schema,
        predecessor: &Self,
        author: impl Into<String>,
        created_at: impl Into<String>,
        records: EntitiesChangeset,
        configs: EntitiesChangeset,
    ) -> TxResult<Self> {
        let author = author.into();
        let created_at = created_at.into();
        let records = drop_empty(records);
        let configs = drop_empty(configs);

        let bytes = canonical_bytes(schema, &predecessor.hash, &created_at, &author, &records, &configs)?;
        let hash = hash_bytes(&bytes);

        Ok(Self {
            id: predecessor.id + 1,
            hash,
            previous: predecessor.hash.clone(),
            created_at,
            author,
            records,
            configs,
        })
    }

    /// A transaction whose per-entity changesets are the inverse of this
    /// one's. `previous`/`id`/`hash` are reassigned by the caller at
    /// append time, since inversion produces a *new*, re-dated transaction
    /// rather than rewriting history.
    pub fn invert(&self, schema: &Schema, author: impl Into<String>, created_at: impl Into<String>, appended_after: &Self) -> TxResult<Self> {
        let records = invert_entities(&self.records)?;
        let configs = invert_entities(&self.configs)?;
        Self::construct(schema, appended_after, author, created_at, records, configs)
    }

    /// A lightweight summary, cheap to keep in memory without paging the
    /// full changeset payload off disk.
    #[must_use]
    pub fn summary(&self) -> TransactionSummary {
        TransactionSummary {
            id: self.id,
            hash: self.hash.clone(),
            author: self.author.clone(),
            created_at: self.created_at.clone(),
            record_count: self.records.len(),
            config_count: self.configs.len(),
        }
    }
}

///
/// TransactionSummary
///
/// A `{ id, hash, author, createdAt, record_count, config_count }`
/// projection returned by head/listing queries without materializing full
/// changesets.
///

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub id: u64,
    pub hash: String,
    pub author: String,
    pub created_at: String,
    pub record_count: usize,
    pub config_count: usize,
}

/// Fold a contiguous range `[t1..tn]` into a single equivalent transaction:
/// per entity reference present in any of them, left-fold `squash` over
/// the per-entity changesets. Inherits `previous` from `t1` and
/// `author`/`created_at` from `tn`.
pub fn squash_range(schema: &Schema, transactions: &[Transaction]) -> TxResult<Transaction> {
    let Some(first) = transactions.first() else {
        return Err(TxError::Corruption {
            reason: "squash_range called with an empty range".to_string(),
        });
    };
    let last = transactions.last().expect("non-empty range has a last element");

    let mut records = EntitiesChangeset::new();
    let mut configs = EntitiesChangeset::new();
    for tx in transactions {
        squash_into(&mut records, &tx.records)?;
        squash_into(&mut configs, &tx.configs)?;
    }

    let predecessor = Transaction {
        id: first.id - 1,
        hash: first.previous.clone(),
        ..Transaction::genesis()
    };

    Transaction::construct(schema, &predecessor, last.author.clone(), last.created_at.clone(), records, configs)
}

fn squash_into(acc: &mut EntitiesChangeset, next: &EntitiesChangeset) -> TxResult<()> {
    for (reference, entity) in next {
        match acc.remove(reference) {
            None => {
                acc.insert(reference.clone(), entity.clone());
            }
            Some(existing) => {
                let merged = fieldset::squash(&existing.fields, &entity.fields)?;
                if !merged.is_empty() {
                    acc.insert(reference.clone(), EntityChangeset::new(entity.type_name.clone(), merged));
                }
            }
        }
    }
    Ok(())
}

fn invert_entities(entities: &EntitiesChangeset) -> TxResult<EntitiesChangeset> {
    entities
        .iter()
        .map(|(reference, entity)| {
            let inverted = fieldset::invert(&entity.fields)?;
            Ok((reference.clone(), EntityChangeset::new(entity.type_name.clone(), inverted)))
        })
        .collect()
}

fn drop_empty(entities: EntitiesChangeset) -> EntitiesChangeset {
    entities.into_iter().filter(|(_, entity)| !entity.fields.is_empty()).collect()
}
