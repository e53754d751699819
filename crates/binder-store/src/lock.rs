//! Single-writer enforcement via an advisory file lock (§5).

use crate::error::{StoreError, StoreResult};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::time::{Duration, Instant};

///
/// LogLock
///
/// Holds the advisory lock on the `lock` file for as long as it's alive.
/// Released automatically on drop.
///

#[derive(Debug)]
pub struct LogLock {
    file: File,
}

impl LogLock {
    /// Acquire the exclusive lock on `root/lock`, polling until `timeout`
    /// elapses. `fs2` exposes no blocking-with-timeout primitive, so this
    /// polls `try_lock_exclusive` with a short backoff.
    pub fn acquire(root: &Path, timeout: Duration) -> StoreResult<Self> {
        let path = root.join("lock");
        let file = OpenOptions::new().create(true).write(true).truncate(false).open(&path)?;

        let deadline = Instant::now() + timeout;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "acquired log lock");
                    return Ok(Self { file });
                }
                Err(_) if Instant::now() >= deadline => return Err(StoreError::LockTimeout),
                Err(_) => std::thread::sleep(Duration::from_millis(20)),
            }
        }
    }
}

impl Drop for LogLock {
    fn drop(&mut self) {
        if fs2::FileExt::unlock(&self.file).is_ok() {
            tracing::debug!("released log lock");
        }
    }
}
