//! Persistent detection history file.

use crate::catalog::Location;
use crate::constants::history::FILE_NAME;
use crate::error::{Error, Result};
use crate::history::HistoryEntry;
use crate::inference::Detection;
use crate::locking::FileLock;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// How long to wait for another process holding the history lock.
const LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Age after which a history lock is considered abandoned.
const LOCK_STALE_AFTER: Duration = Duration::from_secs(300);

/// JSON-array history stored in the data directory.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
    path: PathBuf,
}

impl HistoryStore {
    /// Open the store in `data_dir`, creating the directory if needed.
    pub fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir).map_err(|e| Error::HistoryWrite {
            path: data_dir.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            dir: data_dir.to_path_buf(),
            path: data_dir.join(FILE_NAME),
        })
    }

    /// Directory holding the history file.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the history file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all entries.
    ///
    /// A missing file is created empty. A file that is not a valid history
    /// array is an error and is left untouched.
    pub fn load(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            let _lock = self.lock()?;
            if !self.path.exists() {
                debug!("Creating empty history: {}", self.path.display());
                self.write_atomic(&[])?;
                return Ok(Vec::new());
            }
        }
        self.read()
    }

    fn read(&self) -> Result<Vec<HistoryEntry>> {
        let contents = fs::read_to_string(&self.path).map_err(|e| Error::HistoryRead {
            path: self.path.clone(),
            source: e,
        })?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents).map_err(|e| Error::HistoryParse {
            path: self.path.clone(),
            source: e,
        })
    }

    fn lock(&self) -> Result<FileLock> {
        FileLock::acquire_waiting(&self.path, &self.dir, LOCK_TIMEOUT, LOCK_STALE_AFTER)
    }

    /// Append one entry per detection of a single image analysis.
    ///
    /// Returns the number of entries written.
    pub fn append(
        &self,
        detection_id: &str,
        timestamp: &str,
        image_name: &str,
        location: Option<&Location>,
        results: &[Detection],
    ) -> Result<usize> {
        let new_entries: Vec<HistoryEntry> = results
            .iter()
            .map(|d| HistoryEntry::from_detection(detection_id, timestamp, image_name, location, d))
            .collect();
        self.append_entries(new_entries)
    }

    /// Append prepared entries under the history lock.
    pub fn append_entries(&self, new_entries: Vec<HistoryEntry>) -> Result<usize> {
        let _lock = self.lock()?;

        let mut entries = if self.path.exists() {
            self.read()?
        } else {
            Vec::new()
        };
        let added = new_entries.len();
        entries.extend(new_entries);
        self.write_atomic(&entries)?;

        debug!("Appended {added} history entries ({} total)", entries.len());
        Ok(added)
    }

    /// Remove all entries.
    pub fn clear(&self) -> Result<()> {
        let _lock = self.lock()?;
        self.write_atomic(&[])?;
        info!("Cleared detection history: {}", self.path.display());
        Ok(())
    }

    /// Write the whole history through a temp file and rename.
    fn write_atomic(&self, entries: &[HistoryEntry]) -> Result<()> {
        let write_err = |e| Error::HistoryWrite {
            path: self.path.clone(),
            source: e,
        };

        let json = serde_json::to_string_pretty(entries).map_err(|e| Error::Internal {
            message: format!("failed to serialize history: {e}"),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp).map_err(write_err)?;
        file.write_all(json.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        drop(file);

        fs::rename(&tmp, &self.path).map_err(write_err)
    }
}
