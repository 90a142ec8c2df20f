//! Cross-process lock on a store file
//!
//! `flock(LOCK_EX)` on a `<store>.lock` sibling serializes every process
//! that opens the same data directory. The lock is released when the guard
//! drops and its descriptor closes.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

/// Held while a store is reloaded, checked and rewritten
#[derive(Debug)]
pub struct StoreLock {
    _file: Option<File>,
}

impl StoreLock {
    /// Block until the exclusive lock on `path` is acquired
    pub fn exclusive(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;
        flock_exclusive(&file)?;
        Ok(Self { _file: Some(file) })
    }

    /// Guard for stores that never touch disk
    pub fn unlocked() -> Self {
        Self { _file: None }
    }
}

#[cfg(unix)]
fn flock_exclusive(file: &File) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    loop {
        // SAFETY: fd is a valid descriptor owned by `file` for the whole call.
        let result = unsafe { libc::flock(fd, libc::LOCK_EX) };
        if result == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

#[cfg(not(unix))]
fn flock_exclusive(file: &File) -> io::Result<()> {
    file.lock()
}
