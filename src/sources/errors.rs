use thiserror::Error;

/// Why a source could not deliver records. Every variant is treated by the
/// monitor as "source unavailable": the run sees zero records.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("connect timeout")]
    ConnectTimeout,

    #[error("request timeout")]
    RequestTimeout,

    #[error("http error {status}")]
    Http { status: reqwest::StatusCode },

    #[error("request failed: {0}")]
    Request(String),

    #[error("could not decode response: {0}")]
    Decode(String),
}

impl SourceError {
    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::RequestTimeout
            }
        } else if let Some(status) = err.status() {
            Self::Http { status }
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}
