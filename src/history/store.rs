use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use crate::history::schema::{self, SchemaVersion};
use crate::history::{History, HistoryError, SEEN};

/// Where a monitor keeps its history between runs.
///
/// A missing document loads as an empty history. A save replaces the whole
/// document or leaves the previous one in place; there are no partial writes.
pub trait HistoryStore: Send + Sync {
    fn load(&self) -> Result<History, HistoryError>;

    fn save(&self, history: &History) -> Result<(), HistoryError>;
}

/// JSON document on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    legacy_label: String,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            legacy_label: SEEN.to_string(),
        }
    }

    /// Label given to identities found in a legacy list document.
    pub fn with_legacy_label(mut self, label: impl Into<String>) -> Self {
        self.legacy_label = label.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl HistoryStore for JsonFileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<History, HistoryError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no history yet, starting empty");
                return Ok(History::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let decoded = schema::decode(&bytes, &self.legacy_label).map_err(|e| {
            HistoryError::Malformed {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })?;

        if decoded.version == SchemaVersion::LegacyList {
            info!(
                entries = decoded.history.len(),
                legacy_label = %self.legacy_label,
                "migrated legacy identity list"
            );
        }

        Ok(decoded.history)
    }

    #[instrument(skip(self, history), fields(path = %self.path.display(), entries = history.len()))]
    fn save(&self, history: &History) -> Result<(), HistoryError> {
        let bytes = schema::encode(history)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.io_error(e))?;

        // Write next to the target and rename over it.
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(&bytes).map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        debug!("history saved");
        Ok(())
    }
}

/// Loads through the wrapped store and discards saves.
#[derive(Debug, Clone)]
pub struct ReadOnlyStore<S> {
    inner: S,
}

impl<S: HistoryStore> ReadOnlyStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: HistoryStore> HistoryStore for ReadOnlyStore<S> {
    fn load(&self) -> Result<History, HistoryError> {
        self.inner.load()
    }

    fn save(&self, history: &History) -> Result<(), HistoryError> {
        debug!(entries = history.len(), "read-only store, save skipped");
        Ok(())
    }
}

/// In-process store, used by tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<Vec<u8>>>,
    saves: Mutex<usize>,
    legacy_label: String,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            legacy_label: SEEN.to_string(),
            ..Self::default()
        }
    }

    /// Start from a raw document, as if it had been read from disk.
    pub fn with_document(document: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        *store.document.lock().unwrap_or_else(PoisonError::into_inner) = Some(document.into());
        store
    }

    pub fn with_legacy_label(mut self, label: impl Into<String>) -> Self {
        self.legacy_label = label.into();
        self
    }

    pub fn document(&self) -> Option<String> {
        self.document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Result<History, HistoryError> {
        let guard = self.document.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_deref() {
            None => Ok(History::new()),
            Some(bytes) => schema::decode(bytes, &self.legacy_label)
                .map(|decoded| decoded.history)
                .map_err(|e| HistoryError::Malformed {
                    path: PathBuf::from("<memory>"),
                    reason: e.to_string(),
                }),
        }
    }

    fn save(&self, history: &History) -> Result<(), HistoryError> {
        let bytes = schema::encode(history)?;
        *self.document.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes);
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}
