//! The entity index (§4.6): entity reference to the ordered list of
//! transaction ids that touched it, so range queries avoid a full log
//! scan. The only mutable cross-transaction state in the store.

use crate::error::StoreResult;
use binder_tx::Transaction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

///
/// EntityIndex
///

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityIndex {
    records: BTreeMap<String, Vec<u64>>,
    configs: BTreeMap<String, Vec<u64>>,
}

impl EntityIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Record that `tx` touched each entity in its record/config changesets.
    pub fn observe(&mut self, tx: &Transaction) {
        for reference in tx.records.keys() {
            self.records.entry(reference.clone()).or_default().push(tx.id);
        }
        for reference in tx.configs.keys() {
            self.configs.entry(reference.clone()).or_default().push(tx.id);
        }
    }

    #[must_use]
    pub fn record_ids(&self, reference: &str) -> &[u64] {
        self.records.get(reference).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn config_ids(&self, reference: &str) -> &[u64] {
        self.configs.get(reference).map_or(&[], Vec::as_slice)
    }

    /// Every record reference the index has observed, for commands that
    /// scan the whole workspace (e.g. the CLI's `search`).
    pub fn record_references(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Rebuild the whole index from scratch by replaying every transaction
    /// in the log (§4.6's "out-of-band rebuild... by replaying the main log").
    pub fn rebuild<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let mut index = Self::new();
        for tx in transactions {
            index.observe(tx);
        }
        index
    }
}
