use thiserror::Error;

use crate::config::ConfigError;
use crate::history::HistoryError;
use crate::notify::NotifyError;
use crate::sources::SourceError;

/// Every failure the crate can report, one variant per concern.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

pub type Result<T, E = WatchError> = std::result::Result<T, E>;
