pub mod backoff;
pub mod discord;
pub mod errors;

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use crate::alert::Alert;

pub use discord::DiscordWebhook;
pub use errors::NotifyError;

/// Delivers one alert. `Ok` means the alert is confirmed delivered.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, alert: &Alert) -> Result<(), NotifyError>;
}

/// Writes alerts to the log instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        info!(
            title = %alert.title_line,
            severity = alert.severity.tag(),
            body = %alert.body,
            "alert"
        );
        Ok(())
    }
}

/// Keeps every alert it is given. Alerts whose title contains one of the
/// `reject` fragments fail with a server error instead.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Alert>>,
    reject: Vec<String>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sent: Mutex::new(Vec::new()),
            reject: fragments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn sent(&self) -> Vec<Alert> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        if self
            .reject
            .iter()
            .any(|fragment| alert.title_line.contains(fragment.as_str()))
        {
            return Err(NotifyError::Http {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            });
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(alert.clone());
        }
        Ok(())
    }
}
