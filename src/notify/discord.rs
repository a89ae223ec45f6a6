use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, header::RETRY_AFTER};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::alert::{Alert, AlertMedia};
use crate::normalizer::ELLIPSIS;
use crate::normalizer::model::truncate_chars;
use crate::notify::backoff::backoff_delay;
use crate::notify::{Notifier, NotifyError};
use crate::sources::get_client;

const TITLE_LIMIT: usize = 256;
const DESCRIPTION_LIMIT: usize = 4096;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);
// Do not sleep for minutes on a misbehaving header.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    embeds: [Embed<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    title: String,
    description: String,
    color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<EmbedMedia<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail: Option<EmbedMedia<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedMedia<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct RateLimitBody {
    retry_after: f64,
}

/// Delivers alerts as a single Discord embed.
#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    url: String,
    max_attempts: u32,
    base_delay: Duration,
}

impl DiscordWebhook {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }

    pub fn with_retry(mut self, max_attempts: u32, base_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.base_delay = base_delay;
        self
    }

    fn payload(alert: &Alert) -> WebhookPayload<'_> {
        let (image, thumbnail) = match &alert.media {
            Some(AlertMedia::Image(url)) => (Some(EmbedMedia { url }), None),
            Some(AlertMedia::Thumbnail(url)) => (None, Some(EmbedMedia { url })),
            None => (None, None),
        };

        WebhookPayload {
            embeds: [Embed {
                title: truncate_chars(&alert.title_line, TITLE_LIMIT - ELLIPSIS.len()),
                description: truncate_chars(&alert.body, DESCRIPTION_LIMIT - ELLIPSIS.len()),
                color: alert.severity.color(),
                image,
                thumbnail,
            }],
        }
    }

    async fn post_once(&self, alert: &Alert) -> Result<(), NotifyError> {
        let response = get_client()
            .post(&self.url)
            .json(&Self::payload(alert))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let header_wait = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<f64>().ok());
            let body_wait = response
                .json::<RateLimitBody>()
                .await
                .ok()
                .map(|b| b.retry_after);
            let retry_after = body_wait
                .or(header_wait)
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(|secs| Duration::from_secs_f64(secs.min(MAX_RETRY_AFTER.as_secs_f64())));
            return Err(NotifyError::RateLimited { retry_after });
        }

        Err(NotifyError::Http { status })
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    #[instrument(skip_all, fields(title = %alert.title_line, severity = alert.severity.tag()))]
    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        let mut attempt = 0;
        loop {
            match self.post_once(alert).await {
                Ok(()) => {
                    debug!(attempt, "alert delivered");
                    return Ok(());
                }
                Err(e) if e.should_retry() && attempt + 1 < self.max_attempts => {
                    let wait = e
                        .retry_after()
                        .unwrap_or_else(|| backoff_delay(attempt, self.base_delay));
                    warn!(attempt, error = %e, wait_ms = wait.as_millis() as u64, "retrying webhook");
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
