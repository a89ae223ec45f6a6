//! Configuration handling.
//!
//! Two layers live here. [`Config`] is the process-level runtime
//! configuration read from environment variables (webhooks, state directory,
//! dispatch throttle) with development defaults. [`WatchConfig`] is the
//! per-monitor surface the core consumes: keyword sets, text budget, history
//! cap and link patterns. Both are plain values handed to components at
//! construction; nothing reads the environment after startup.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::normalizer::links::DEFAULT_LINK_PATTERNS;

pub const ENV_STATE_DIR: &str = "DECKWATCH_STATE_DIR";
pub const ENV_DISPATCH_DELAY_MS: &str = "DECKWATCH_DISPATCH_DELAY_MS";
pub const ENV_YOUTUBE_CHANNEL: &str = "DECKWATCH_YOUTUBE_CHANNEL";
pub const ENV_WEBHOOK_COMPAT: &str = "DISCORD_WEBHOOK";
pub const ENV_WEBHOOK_SALES: &str = "DISCORD_WEBHOOK_SALES";
pub const ENV_WEBHOOK_PRIVATE: &str = "WEBHOOK_PRIVATE";
pub const ENV_WEBHOOK_NEW_RELEASES: &str = "DISCORD_WEBHOOK_NEWSALES";
pub const ENV_WEBHOOK_VIDEO: &str = "DISCORD_WEBHOOK_NEWVIDEO";

const DEFAULT_STATE_DIR: &str = ".";
const DEFAULT_DISPATCH_DELAY_MS: u64 = 1000;
const DEFAULT_YOUTUBE_CHANNEL: &str = "UCcJeDBJiD3SlIvnKEplxX-Q";

pub const DEFAULT_TEXT_BUDGET: usize = 300;
pub const DEFAULT_HISTORY_CAP: usize = 500;

/// Errors that can occur while building a configuration. All of them are
/// fatal for the run that needed the value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting '{var}'")]
    Missing { var: &'static str },

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("unknown monitor '{0}'")]
    UnknownMonitor(String),
}

/// Runtime configuration shared by every monitor in a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    state_dir: PathBuf,
    dispatch_delay: Duration,
    youtube_channel: String,
    webhook_compat: Option<String>,
    webhook_sales: Option<String>,
    webhook_private: Option<String>,
    webhook_new_releases: Option<String>,
    webhook_video: Option<String>,
}

impl Config {
    /// Load from environment variables, falling back to development defaults.
    ///
    /// Webhooks have no default; a monitor that needs a missing one fails
    /// when it is built, not here, so a process running only some monitors
    /// does not need every secret.
    pub fn from_env() -> Result<Self, ConfigError> {
        let state_dir = env::var(ENV_STATE_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_DIR));

        let dispatch_delay = match env::var(ENV_DISPATCH_DELAY_MS) {
            Ok(raw) => {
                let ms = raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                    field: ENV_DISPATCH_DELAY_MS,
                    reason: e.to_string(),
                })?;
                Duration::from_millis(ms)
            }
            Err(_) => Duration::from_millis(DEFAULT_DISPATCH_DELAY_MS),
        };

        let youtube_channel =
            env::var(ENV_YOUTUBE_CHANNEL).unwrap_or_else(|_| DEFAULT_YOUTUBE_CHANNEL.to_string());

        let webhook_compat = non_empty_var(ENV_WEBHOOK_COMPAT);
        // The sales bot historically shared the main channel when it had
        // no dedicated webhook.
        let webhook_sales = non_empty_var(ENV_WEBHOOK_SALES).or_else(|| webhook_compat.clone());

        Ok(Self {
            state_dir,
            dispatch_delay,
            youtube_channel,
            webhook_compat,
            webhook_sales,
            webhook_private: non_empty_var(ENV_WEBHOOK_PRIVATE),
            webhook_new_releases: non_empty_var(ENV_WEBHOOK_NEW_RELEASES),
            webhook_video: non_empty_var(ENV_WEBHOOK_VIDEO),
        })
    }

    /// Development defaults: current directory, one second throttle, no
    /// webhooks.
    pub fn development() -> Self {
        Self {
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            dispatch_delay: Duration::from_millis(DEFAULT_DISPATCH_DELAY_MS),
            youtube_channel: DEFAULT_YOUTUBE_CHANNEL.to_string(),
            webhook_compat: None,
            webhook_sales: None,
            webhook_private: None,
            webhook_new_releases: None,
            webhook_video: None,
        }
    }

    /// Send every monitor to the same webhook.
    pub fn with_shared_webhook(mut self, url: impl Into<String>) -> Self {
        let url = Some(url.into());
        self.webhook_compat = url.clone();
        self.webhook_sales = url.clone();
        self.webhook_private = url.clone();
        self.webhook_new_releases = url.clone();
        self.webhook_video = url;
        self
    }

    pub fn with_dispatch_delay(mut self, delay: Duration) -> Self {
        self.dispatch_delay = delay;
        self
    }

    /// Directory holding the per-monitor history files.
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Pause between two notifications of the same run.
    pub fn dispatch_delay(&self) -> Duration {
        self.dispatch_delay
    }

    pub fn youtube_channel(&self) -> &str {
        &self.youtube_channel
    }

    pub fn webhook_compat(&self) -> Result<&str, ConfigError> {
        required(&self.webhook_compat, ENV_WEBHOOK_COMPAT)
    }

    pub fn webhook_sales(&self) -> Result<&str, ConfigError> {
        required(&self.webhook_sales, ENV_WEBHOOK_SALES)
    }

    pub fn webhook_private(&self) -> Result<&str, ConfigError> {
        required(&self.webhook_private, ENV_WEBHOOK_PRIVATE)
    }

    pub fn webhook_new_releases(&self) -> Result<&str, ConfigError> {
        required(&self.webhook_new_releases, ENV_WEBHOOK_NEW_RELEASES)
    }

    pub fn webhook_video(&self) -> Result<&str, ConfigError> {
        required(&self.webhook_video, ENV_WEBHOOK_VIDEO)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required<'a>(value: &'a Option<String>, var: &'static str) -> Result<&'a str, ConfigError> {
    value.as_deref().ok_or(ConfigError::Missing { var })
}

/// What one monitor watches for and how much it keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub include_keywords: Vec<String>,
    pub exclude_keywords: Vec<String>,
    /// Maximum characters of cleaned text before the ellipsis.
    pub text_budget: usize,
    /// Maximum identities kept in history; `None` keeps everything.
    pub history_cap: Option<usize>,
    /// URL fragments tried in order when picking the canonical link.
    pub link_patterns: Vec<String>,
}

impl WatchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.text_budget == 0 {
            return Err(ConfigError::InvalidValue {
                field: "text_budget",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.history_cap == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "history_cap",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_keywords<I, J, S, T>(mut self, include: I, exclude: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        self.include_keywords = include.into_iter().map(Into::into).collect();
        self.exclude_keywords = exclude.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_text_budget(mut self, budget: usize) -> Self {
        self.text_budget = budget;
        self
    }

    pub fn with_history_cap(mut self, cap: Option<usize>) -> Self {
        self.history_cap = cap;
        self
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            include_keywords: Vec::new(),
            exclude_keywords: Vec::new(),
            text_budget: DEFAULT_TEXT_BUDGET,
            history_cap: Some(DEFAULT_HISTORY_CAP),
            link_patterns: DEFAULT_LINK_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}
