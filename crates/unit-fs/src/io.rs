//! Atomic I/O operations and exclusive lock files

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use backoff::ExponentialBackoff;
use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write content atomically to a file.
///
/// Content goes to a temporary sibling first and is renamed over the target,
/// so readers observe either the previous document or the new one, never a
/// partial write.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.{}.tmp",
        path.file_name().unwrap_or("unit"),
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    let written = temp_file
        .write_all(content)
        .and_then(|_| temp_file.sync_all());
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&temp_path, e));
    }
    drop(temp_file);

    if let Err(e) = fs::rename(&temp_path, &native_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&native_path, e));
    }

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Retry settings for acquiring a [`TableLockFile`].
#[derive(Debug, Clone, Copy)]
pub struct LockOptions {
    /// Give up after waiting this long.
    pub timeout: Duration,
    /// First retry delay; later delays grow exponentially.
    pub initial_interval: Duration,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            initial_interval: Duration::from_millis(5),
        }
    }
}

/// An exclusive advisory lock held on a lock file for as long as the value
/// lives.
///
/// The lock is an OS-level `flock`, so it excludes other processes as well as
/// other handles within the same process. Dropping the value closes the file
/// and releases the lock.
#[derive(Debug)]
pub struct TableLockFile {
    path: NormalizedPath,
    _file: File,
}

impl TableLockFile {
    /// Acquire the lock at `path`, creating the file if needed.
    pub fn acquire(path: &NormalizedPath, options: LockOptions) -> Result<Self> {
        let native_path = path.to_native();
        if let Some(parent) = native_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&native_path)
            .map_err(|e| Error::io(&native_path, e))?;

        let policy = ExponentialBackoff {
            current_interval: options.initial_interval,
            initial_interval: options.initial_interval,
            max_interval: options.timeout.max(options.initial_interval),
            max_elapsed_time: Some(options.timeout),
            ..ExponentialBackoff::default()
        };

        let started = Instant::now();
        backoff::retry(policy, || {
            file.try_lock_exclusive()
                .map_err(backoff::Error::transient)
        })
        .map_err(|_| Error::LockFailed {
            path: native_path.clone(),
            waited_ms: started.elapsed().as_millis(),
        })?;

        tracing::debug!(path = %path, "Acquired table lock");
        Ok(Self {
            path: path.clone(),
            _file: file,
        })
    }

    /// Path of the underlying lock file.
    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }
}

impl Drop for TableLockFile {
    fn drop(&mut self) {
        tracing::debug!(path = %self.path, "Released table lock");
    }
}
