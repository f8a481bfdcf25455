//! Lock files guarding images in progress and the detection history.

use crate::constants::LOCK_FILE_EXTENSION;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Poll interval while waiting for a held lock.
const RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Lock file content for debugging.
#[derive(Debug, Serialize, Deserialize)]
pub struct LockInfo {
    /// Process ID that holds the lock.
    pub pid: u32,
    /// Hostname of the machine.
    pub hostname: String,
    /// When the lock was acquired.
    pub started: DateTime<Utc>,
    /// File the lock protects.
    pub input: PathBuf,
}

/// RAII guard for file locks.
#[derive(Debug)]
pub struct FileLock {
    lock_path: PathBuf,
}

impl FileLock {
    /// Attempt to acquire the lock for `input`, placing the lock file in `lock_dir`.
    pub fn acquire(input: &Path, lock_dir: &Path) -> Result<Self> {
        let lock_path = Self::lock_path_for(input, lock_dir);

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path);

        match file {
            Ok(mut f) => {
                let info = LockInfo {
                    pid: std::process::id(),
                    hostname: hostname::get().map_or_else(
                        |_| "unknown".to_string(),
                        |h| h.to_string_lossy().into_owned(),
                    ),
                    started: Utc::now(),
                    input: input.to_path_buf(),
                };

                let json = serde_json::to_string_pretty(&info).unwrap_or_else(|_| "{}".to_string());
                let _ = f.write_all(json.as_bytes());

                register_lock(&lock_path);
                Ok(Self { lock_path })
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(Error::FileLocked { path: lock_path })
            }
            Err(e) => Err(Error::LockCreate {
                path: lock_path,
                source: e,
            }),
        }
    }

    /// Acquire the lock, polling until `timeout` elapses.
    ///
    /// A lock older than `stale_after` is treated as abandoned and removed.
    pub fn acquire_waiting(
        input: &Path,
        lock_dir: &Path,
        timeout: Duration,
        stale_after: Duration,
    ) -> Result<Self> {
        let deadline = Instant::now() + timeout;
        loop {
            match Self::acquire(input, lock_dir) {
                Err(Error::FileLocked { path }) => {
                    if Self::is_stale(input, lock_dir, stale_after) {
                        tracing::warn!("Removing stale lock: {}", path.display());
                        Self::remove_stale(input, lock_dir)?;
                        continue;
                    }
                    if Instant::now() >= deadline {
                        return Err(Error::FileLocked { path });
                    }
                    std::thread::sleep(RETRY_INTERVAL);
                }
                other => return other,
            }
        }
    }

    /// Lock file path for a protected file.
    pub fn lock_path_for(input: &Path, lock_dir: &Path) -> PathBuf {
        let name = input
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        lock_dir.join(format!("{name}{LOCK_FILE_EXTENSION}"))
    }

    /// Check if a lock file exists.
    pub fn is_locked(input: &Path, lock_dir: &Path) -> bool {
        Self::lock_path_for(input, lock_dir).exists()
    }

    /// Check if a lock is stale (older than `max_age`).
    pub fn is_stale(input: &Path, lock_dir: &Path, max_age: Duration) -> bool {
        let lock_path = Self::lock_path_for(input, lock_dir);

        if let Ok(metadata) = fs::metadata(&lock_path)
            && let Ok(modified) = metadata.modified()
        {
            return modified.elapsed().unwrap_or_default() >= max_age;
        }
        false
    }

    /// Remove a stale lock.
    pub fn remove_stale(input: &Path, lock_dir: &Path) -> Result<()> {
        let lock_path = Self::lock_path_for(input, lock_dir);
        match fs::remove_file(&lock_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::LockRemove {
                path: lock_path,
                source: e,
            }),
        }
    }

    /// Path of the held lock file.
    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
        unregister_lock(&self.lock_path);
    }
}

/// Global registry of active lock paths for cleanup on signal.
static ACTIVE_LOCKS: std::sync::LazyLock<std::sync::Mutex<Vec<PathBuf>>> =
    std::sync::LazyLock::new(|| std::sync::Mutex::new(Vec::new()));

/// Register a lock path for cleanup on signal.
pub fn register_lock(path: &Path) {
    if let Ok(mut locks) = ACTIVE_LOCKS.lock() {
        locks.push(path.to_path_buf());
    }
}

/// Unregister a lock path after normal cleanup.
pub fn unregister_lock(path: &Path) {
    if let Ok(mut locks) = ACTIVE_LOCKS.lock() {
        locks.retain(|p| p != path);
    }
}

/// Clean up all registered locks. Called on signal.
pub fn cleanup_all_locks() {
    if let Ok(locks) = ACTIVE_LOCKS.lock() {
        for lock_path in locks.iter() {
            let _ = fs::remove_file(lock_path);
        }
    }
}
