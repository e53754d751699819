//! File-backed workspace storage (C5): the append-only log, head cursor,
//! entity index, advisory lock, workspace config, and undo/redo
//! bookkeeping built on top of `binder-tx`.

pub mod config;
pub mod error;
pub mod index;
pub mod lock;
pub mod log;
pub mod store;

pub use config::WorkspaceConfig;
pub use error::{StoreError, StoreResult};
pub use index::EntityIndex;
pub use lock::LogLock;
pub use log::{HeadCursor, TransactionLog};
pub use store::LogStore;
