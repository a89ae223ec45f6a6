use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    /// The persisted document exists but cannot be understood. Callers start
    /// from an empty history and leave the file for the next save.
    #[error("malformed history at {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("history io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl HistoryError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}
