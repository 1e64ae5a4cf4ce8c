//! JSON-file backed store kept beside the notes.
//!
//! The whole map is rewritten on every change using the same
//! write-to-temp-then-rename pattern as the config file.

use super::KeyValueStore;
use crate::error::{Error, Result};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// The subdirectory name for per-folder client state.
pub const STATE_DIR: &str = ".folio";

/// The state file name.
const STATE_FILE: &str = "state.json";

/// Temporary file used during atomic writes.
const STATE_TEMP_FILE: &str = "state.json.tmp";

// ─────────────────────────────────────────────────────────────────────────────
// File Store
// ─────────────────────────────────────────────────────────────────────────────

/// A `KeyValueStore` persisted as a flat JSON object.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store for a notes folder: `{root}/.folio/state.json`.
    pub fn for_notes_root(root: &Path) -> Self {
        Self::open(root.join(STATE_DIR).join(STATE_FILE))
    }

    /// Open the store at an explicit file path.
    ///
    /// A missing, unreadable or malformed file yields an empty store; the
    /// next successful write replaces it.
    pub fn open(path: PathBuf) -> Self {
        let entries = load_entries(&path);
        Self { path, entries }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check that the backing directory can be created and written.
    pub fn probe_writable(&self) -> Result<()> {
        let dir = self.state_dir();
        fs::create_dir_all(&dir).map_err(|e| Error::StoreWrite {
            path: dir.clone(),
            source: e,
        })?;
        let metadata = fs::metadata(&dir)?;
        if metadata.permissions().readonly() {
            return Err(Error::StoreWrite {
                path: dir,
                source: std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "directory is read-only",
                ),
            });
        }
        Ok(())
    }

    fn state_dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn flush(&self) -> Result<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            debug!("Creating state directory: {}", dir.display());
            fs::create_dir_all(&dir).map_err(|e| Error::StoreWrite {
                path: dir.clone(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        let temp_path = dir.join(STATE_TEMP_FILE);

        fs::write(&temp_path, json).map_err(|e| Error::StoreWrite {
            path: temp_path.clone(),
            source: e,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| Error::StoreWrite {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(())
    }
}

fn load_entries(path: &Path) -> BTreeMap<String, String> {
    if !path.exists() {
        debug!("No state file at {}", path.display());
        return BTreeMap::new();
    }

    match fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => BTreeMap::new(),
        Ok(content) => match serde_json::from_str(&content) {
            Ok(entries) => {
                debug!("Loaded state from {}", path.display());
                entries
            }
            Err(e) => {
                warn!("Ignoring malformed state file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        },
        Err(e) => {
            warn!("Failed to read state file {}: {}", path.display(), e);
            BTreeMap::new()
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.entries.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_none() {
            return Ok(());
        }
        self.flush()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
