use std::time::Duration;

use thiserror::Error;

/// Why an alert was not delivered. The monitor leaves the entry out of
/// history on any of these, so the next run tries again.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("webhook answered {status}")]
    Http { status: reqwest::StatusCode },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("webhook request failed: {0}")]
    Request(String),
}

impl NotifyError {
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Http { status } => status.is_server_error(),
            Self::RateLimited { .. } => true,
            Self::Request(_) => true,
        }
    }

    /// Wait the server asked for, if it named one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Http { status },
            None => Self::Request(err.to_string()),
        }
    }
}
