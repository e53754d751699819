//! Canonical transaction encoding (C3), the transaction model (C4), and the
//! entity materializer (C6).

pub mod canonical;
pub mod error;
pub mod materializer;
pub mod transaction;

pub use canonical::{encode_hash, EntitiesChangeset, EntityChangeset, GENESIS_HASH};
pub use error::{TxError, TxResult};
pub use materializer::{entity_state, is_tombstone, materialize, EntityState};
pub use transaction::{squash_range, Transaction, TransactionSummary};
