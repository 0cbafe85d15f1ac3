//! Advisory lock file serializing sync cycles across processes.

use crate::errors::AppResult;
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

/// Held for the duration of one sync cycle; released on drop.
#[derive(Debug)]
pub struct CycleLock {
    file: File,
}

impl CycleLock {
    /// Take the lock without waiting. `Ok(None)` means another process holds it.
    pub fn try_acquire(path: &Path) -> AppResult<Option<Self>> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => Ok(Some(Self { file })),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            // ERROR_LOCK_VIOLATION
            Err(e) if cfg!(windows) && e.raw_os_error() == Some(33) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for CycleLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::debug!(error = %e, "failed to release sync lock file");
        }
    }
}
