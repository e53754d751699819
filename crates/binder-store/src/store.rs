//! `LogStore` (C5): the single type that owns a workspace's log directory —
//! the append-only log, the head cursor, the entity index, the advisory
//! lock, and the undo/redo bookkeeping described in §6.

use crate::error::{StoreError, StoreResult};
use crate::index::EntityIndex;
use crate::lock::LogLock;
use crate::log::TransactionLog;
use binder_schema::Schema;
use binder_tx::canonical::{canonical_bytes, hash_bytes};
use binder_tx::{EntitiesChangeset, Transaction, TransactionSummary};
use std::path::{Path, PathBuf};
use std::time::Duration;

struct UndoEntry {
    undone_id: u64,
    /// Head id immediately after the rollback batch this entry belongs to.
    /// A `redo` is only valid while the head still matches the most recent
    /// entry's value — any intervening ordinary append moves the head past
    /// it, which is what makes "undo, then mutate, then redo" fail.
    head_after: u64,
}

///
/// LogStore
///

pub struct LogStore {
    root: PathBuf,
    schema: Schema,
    _lock: LogLock,
    log: TransactionLog,
    index: EntityIndex,
    undo_log: Vec<UndoEntry>,
}

impl LogStore {
    pub fn open(root: &Path, schema: Schema, lock_timeout: Duration) -> StoreResult<Self> {
        std::fs::create_dir_all(root)?;
        let lock = LogLock::acquire(root, lock_timeout)?;
        let log = TransactionLog::open(root)?;

        let index_path = root.join("index/by-entity");
        let index = if index_path.exists() {
            EntityIndex::load(&index_path)?
        } else if log.head().id > 0 {
            let all = log.between(1, log.head().id)?;
            let rebuilt = EntityIndex::rebuild(&all);
            rebuilt.save(&index_path)?;
            rebuilt
        } else {
            EntityIndex::new()
        };

        let undo_log = Self::read_undo_log(root)?;

        Ok(Self { root: root.to_path_buf(), schema, _lock: lock, log, index, undo_log })
    }

    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub fn index(&self) -> &EntityIndex {
        &self.index
    }

    /// Rebuild the entity index from scratch by replaying the whole log,
    /// and persist it (§4.6's out-of-band repair path).
    pub fn rebuild_index(&mut self) -> StoreResult<()> {
        let all = self.log.between(1, self.log.head().id)?;
        self.index = EntityIndex::rebuild(&all);
        self.index.save(&self.root.join("index/by-entity"))
    }

    /// Fetch the transaction with id `id`, re-deriving its hash from the
    /// stored canonical fields and comparing it against the stored `hash`
    /// (§6: "the hash MUST be re-derived on read and compared").
    pub fn at(&self, id: u64) -> StoreResult<Transaction> {
        let tx = self.log.at(id)?;
        self.verify_hash(&tx)?;
        Ok(tx)
    }

    pub fn between(&self, lo: u64, hi: u64) -> StoreResult<Vec<Transaction>> {
        (lo..=hi).map(|id| self.at(id)).collect()
    }

    fn verify_hash(&self, tx: &Transaction) -> StoreResult<()> {
        let bytes = canonical_bytes(&self.schema, &tx.previous, &tx.created_at, &tx.author, &tx.records, &tx.configs)?;
        let recomputed = hash_bytes(&bytes);
        if recomputed != tx.hash {
            tracing::warn!(id = tx.id, expected = %tx.hash, recomputed = %recomputed, "transaction hash mismatch on read");
            return Err(StoreError::Corruption {
                reason: format!("transaction {} hash mismatch: stored {}, recomputed {recomputed}", tx.id, tx.hash),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn head(&self) -> TransactionSummary {
        let cursor = self.log.head();
        if cursor.id == 0 {
            let genesis = Transaction::genesis();
            return genesis.summary();
        }
        match self.log.at(cursor.id) {
            Ok(tx) => tx.summary(),
            Err(_) => TransactionSummary {
                id: cursor.id,
                hash: cursor.hash.clone(),
                author: String::new(),
                created_at: cursor.created_at.clone(),
                record_count: 0,
                config_count: 0,
            },
        }
    }

    /// Construct, append, and index a new transaction chained onto the
    /// current head. Clears the redo-log, per §6: "a non-undo/redo
    /// mutation clears the redo-log."
    pub fn append(
        &mut self,
        author: impl Into<String>,
        created_at: impl Into<String>,
        records: EntitiesChangeset,
        configs: EntitiesChangeset,
    ) -> StoreResult<Transaction> {
        let predecessor = self.predecessor_stub();
        let tx = Transaction::construct(&self.schema, &predecessor, author, created_at, records, configs)?;
        self.append_existing(&tx)?;
        Self::write_redo_log(&self.root, &[])?;
        Ok(tx)
    }

    /// Roll back the last `n` transactions: build their inverses in memory
    /// first (a pure function of already-loaded data, no I/O), and only
    /// once all `n` build successfully, append them for real. A failure
    /// partway through inversion therefore leaves the log untouched.
    pub fn rollback(&mut self, n: u64, author: impl Into<String>, created_at: impl Into<String>) -> StoreResult<Vec<Transaction>> {
        let author = author.into();
        let created_at = created_at.into();
        let head_id = self.log.head().id;
        if head_id < n {
            return Err(StoreError::NoUndoAvailable { requested: n });
        }
        if n == 0 {
            return Ok(Vec::new());
        }

        let originals: Vec<Transaction> = (head_id - n + 1..=head_id).rev().map(|id| self.log.at(id)).collect::<StoreResult<_>>()?;

        let mut appended_after = self.predecessor_stub();
        let mut inverses = Vec::with_capacity(originals.len());
        for original in &originals {
            let inv = original.invert(&self.schema, author.clone(), created_at.clone(), &appended_after)?;
            appended_after = inv.clone();
            inverses.push(inv);
        }

        for inv in &inverses {
            self.append_existing(inv)?;
        }

        let new_head_id = self.log.head().id;
        for original in &originals {
            self.undo_log.push(UndoEntry { undone_id: original.id, head_after: new_head_id });
        }
        Self::write_undo_log(&self.root, &self.undo_log)?;
        Self::write_redo_log(&self.root, &[])?;

        Ok(inverses)
    }

    /// Re-apply the last `n` undone transactions, in their original
    /// chronological order, provided nothing has been appended since they
    /// were undone.
    pub fn redo(&mut self, n: u64, author: impl Into<String>, created_at: impl Into<String>) -> StoreResult<Vec<Transaction>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        if (self.undo_log.len() as u64) < n {
            return Err(StoreError::NoRedoAvailable);
        }

        let split_at = self.undo_log.len() - n as usize;
        let tail = &self.undo_log[split_at..];
        let current_head = self.log.head().id;
        if tail.last().is_none_or(|entry| entry.head_after != current_head) {
            return Err(StoreError::NoRedoAvailable);
        }

        let author = author.into();
        let created_at = created_at.into();

        // `tail` is newest-undone-first; replaying in original chronological
        // order means walking it oldest-undone-first.
        let mut redone = Vec::with_capacity(tail.len());
        for entry in tail.iter().rev() {
            let original = self.log.at(entry.undone_id)?;
            let predecessor = self.predecessor_stub();
            let replay = Transaction::construct(
                &self.schema,
                &predecessor,
                author.clone(),
                created_at.clone(),
                original.records.clone(),
                original.configs.clone(),
            )?;
            self.append_existing(&replay)?;
            redone.push(replay);
        }

        self.undo_log.truncate(split_at);
        Self::write_undo_log(&self.root, &self.undo_log)?;
        let redone_ids: Vec<u64> = redone.iter().map(|tx| tx.id).collect();
        Self::write_redo_log(&self.root, &redone_ids)?;

        Ok(redone)
    }

    fn append_existing(&mut self, tx: &Transaction) -> StoreResult<()> {
        self.log.append(tx)?;
        self.index.observe(tx);
        self.index.save(&self.root.join("index/by-entity"))
    }

    fn predecessor_stub(&self) -> Transaction {
        let cursor = self.log.head();
        Transaction {
            id: cursor.id,
            hash: cursor.hash.clone(),
            previous: String::new(),
            created_at: cursor.created_at.clone(),
            author: String::new(),
            records: EntitiesChangeset::new(),
            configs: EntitiesChangeset::new(),
        }
    }

    fn read_undo_log(root: &Path) -> StoreResult<Vec<UndoEntry>> {
        let path = root.join(".undo-log");
        if !path.exists() {
            return Ok(Vec::new());
        }
        let text = std::fs::read_to_string(path)?;
        let mut entries = Vec::new();
        for line in text.lines().filter(|l| !l.is_empty()) {
            let mut parts = line.split(' ');
            let undone_id = parts.next().and_then(|s| s.parse().ok());
            let head_after = parts.next().and_then(|s| s.parse().ok());
            match (undone_id, head_after) {
                (Some(undone_id), Some(head_after)) => entries.push(UndoEntry { undone_id, head_after }),
                _ => {
                    return Err(StoreError::Corruption {
                        reason: format!("malformed .undo-log line: {line:?}"),
                    })
                }
            }
        }
        Ok(entries)
    }

    fn write_undo_log(root: &Path, entries: &[UndoEntry]) -> StoreResult<()> {
        let text = entries.iter().map(|e| format!("{} {}\n", e.undone_id, e.head_after)).collect::<String>();
        std::fs::write(root.join(".undo-log"), text)?;
        Ok(())
    }

    fn write_redo_log(root: &Path, ids: &[u64]) -> StoreResult<()> {
        let text = ids.iter().map(|id| format!("{id}\n")).collect::<String>();
        std::fs::write(root.join(".redo-log"), text)?;
        Ok(())
    }
}
