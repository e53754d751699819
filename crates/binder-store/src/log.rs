//! The append-only transaction log file (`log.bin`) and the `head` cursor
//! file (§6).

use crate::error::{StoreError, StoreResult};
use binder_tx::Transaction;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

const HASH_LEN: usize = 43;

///
/// HeadCursor
///
/// The current tip of the log: id, hash, and when it was appended. Cheap
/// to keep resident in memory and re-derive from `head` on open.
///

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadCursor {
    pub id: u64,
    pub hash: String,
    pub created_at: String,
}

impl HeadCursor {
    #[must_use]
    pub fn genesis() -> Self {
        let genesis = Transaction::genesis();
        Self { id: genesis.id, hash: genesis.hash, created_at: genesis.created_at }
    }

    fn read(path: &Path) -> StoreResult<Self> {
        let mut file = File::open(path)?;
        let mut id_bytes = [0u8; 8];
        file.read_exact(&mut id_bytes)?;
        let id = u64::from_le_bytes(id_bytes);

        let mut hash_bytes = vec![0u8; HASH_LEN];
        file.read_exact(&mut hash_bytes)?;
        let hash = String::from_utf8(hash_bytes).map_err(|_| StoreError::Corruption {
            reason: "head hash is not valid UTF-8".to_string(),
        })?;

        let mut rest = String::new();
        file.read_to_string(&mut rest)?;

        Ok(Self { id, hash, created_at: rest })
    }

    fn write(&self, path: &Path) -> StoreResult<()> {
        let tmp = path.with_extension("tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&self.id.to_le_bytes())?;
            if self.hash.len() != HASH_LEN {
                return Err(StoreError::Corruption {
                    reason: format!("head hash must be {HASH_LEN} bytes, got {}", self.hash.len()),
                });
            }
            file.write_all(self.hash.as_bytes())?;
            file.write_all(self.created_at.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(tmp, path)?;
        Ok(())
    }
}

///
/// TransactionLog
///
/// The append-only `log.bin` file: a sequence of `u32`-length-prefixed
/// canonical-ish JSON records, one per transaction. Byte offsets are kept
/// in memory so `at`/`between` don't rescan on every call.
///

pub struct TransactionLog {
    path: PathBuf,
    head_path: PathBuf,
    offsets: Vec<u64>,
    head: HeadCursor,
}

impl TransactionLog {
    pub fn open(root: &Path) -> StoreResult<Self> {
        let path = root.join("log.bin");
        let head_path = root.join("head");

        let offsets = Self::scan_offsets(&path)?;
        let head = if head_path.exists() {
            HeadCursor::read(&head_path)?
        } else {
            let head = HeadCursor::genesis();
            head.write(&head_path)?;
            head
        };

        Ok(Self { path, head_path, offsets, head })
    }

    #[must_use]
    pub fn head(&self) -> &HeadCursor {
        &self.head
    }

    fn scan_offsets(path: &Path) -> StoreResult<Vec<u64>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut file = File::open(path)?;
        let mut offsets = Vec::new();
        loop {
            let offset = file.stream_position()?;
            let mut len_bytes = [0u8; 4];
            match file.read_exact(&mut len_bytes) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }
            let len = u32::from_le_bytes(len_bytes) as i64;
            file.seek(SeekFrom::Current(len))?;
            offsets.push(offset);
        }
        Ok(offsets)
    }

    /// Append `tx` (already validated to chain onto the current head) and
    /// advance the head cursor. The whole operation is atomic from the
    /// caller's point of view: either both the record and the head file
    /// land, or an error is returned before either does.
    pub fn append(&mut self, tx: &Transaction) -> StoreResult<()> {
        if tx.previous != self.head.hash || tx.id != self.head.id + 1 {
            return Err(StoreError::ChainBroken {
                expected: self.head.hash.clone(),
                found: tx.previous.clone(),
            });
        }

        let bytes = serde_json::to_vec(tx)?;
        let len = u32::try_from(bytes.len()).map_err(|_| StoreError::Corruption {
            reason: "transaction record exceeds 4 GiB".to_string(),
        })?;

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let offset = file.stream_position()?;
        file.write_all(&len.to_le_bytes())?;
        file.write_all(&bytes)?;
        file.sync_all()?;

        let new_head = HeadCursor { id: tx.id, hash: tx.hash.clone(), created_at: tx.created_at.clone() };
        new_head.write(&self.head_path)?;

        self.offsets.push(offset);
        self.head = new_head;
        tracing::info!(id = tx.id, hash = %tx.hash, "appended transaction");
        Ok(())
    }

    pub fn at(&self, id: u64) -> StoreResult<Transaction> {
        let Some(&offset) = id.checked_sub(1).and_then(|idx| self.offsets.get(idx as usize)) else {
            return Err(StoreError::NotFound { id });
        };

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;
        let mut len_bytes = [0u8; 4];
        file.read_exact(&mut len_bytes)?;
        let len = u32::from_le_bytes(len_bytes) as usize;

        let mut bytes = vec![0u8; len];
        file.read_exact(&mut bytes)?;
        let tx: Transaction = serde_json::from_slice(&bytes)?;

        if tx.id != id {
            return Err(StoreError::Corruption {
                reason: format!("record at offset {offset} has id {} expected {id}", tx.id),
            });
        }
        Ok(tx)
    }

    pub fn between(&self, lo: u64, hi: u64) -> StoreResult<Vec<Transaction>> {
        (lo..=hi).map(|id| self.at(id)).collect()
    }

    #[must_use]
    pub const fn len(&self) -> u64 {
        self.head.id
    }
}
