use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::normalizer::MediaRef;
use crate::sources::{RawRecord, Source, SourceError, client};

pub const STEAM_API_BASE: &str = "https://api.steampowered.com";
pub const STEAM_STORE_BASE: &str = "https://store.steampowered.com";

#[derive(Debug, Deserialize)]
struct NewsResponse {
    appnews: AppNews,
}

#[derive(Debug, Deserialize)]
struct AppNews {
    #[serde(default)]
    newsitems: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    gid: String,
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    contents: String,
    #[serde(default)]
    date: i64,
}

/// Announcements of one Steam app through `ISteamNews/GetNewsForApp`.
#[derive(Debug, Clone)]
pub struct SteamNewsSource {
    app_id: u32,
    count: u32,
    api_base: String,
    store_base: String,
    media_hint: Option<MediaRef>,
}

impl SteamNewsSource {
    pub fn new(app_id: u32, count: u32) -> Self {
        Self {
            app_id,
            count,
            api_base: STEAM_API_BASE.to_string(),
            store_base: STEAM_STORE_BASE.to_string(),
            media_hint: None,
        }
    }

    /// Picture attached to every item whose body has none.
    pub fn with_media_hint(mut self, media: MediaRef) -> Self {
        self.media_hint = Some(media);
        self
    }

    /// Point at a different API host (tests use a mock server).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/ISteamNews/GetNewsForApp/v2/?appid={}&count={}&format=json",
            self.api_base.trim_end_matches('/'),
            self.app_id,
            self.count
        )
    }

    fn to_record(&self, item: NewsItem) -> RawRecord {
        let url = if item.url.trim().is_empty() {
            format!(
                "{}/news/app/{}/view/{}",
                self.store_base, self.app_id, item.gid
            )
        } else {
            item.url
        };

        let mut record = RawRecord::new(item.gid, item.title, item.contents, url);
        if let Some(ts) = DateTime::<Utc>::from_timestamp(item.date, 0).filter(|_| item.date > 0) {
            record = record.with_timestamp(ts);
        }
        if let Some(media) = &self.media_hint {
            record = record.with_media_hint(media.clone());
        }
        record
    }
}

#[async_trait]
impl Source for SteamNewsSource {
    fn name(&self) -> String {
        format!("steam-news:{}", self.app_id)
    }

    #[instrument(skip(self), fields(app_id = self.app_id))]
    async fn fetch(&self) -> Result<Vec<RawRecord>, SourceError> {
        let response = client::get(&self.endpoint(), None).await?;
        let body: NewsResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        debug!(items = body.appnews.newsitems.len(), "news items received");

        Ok(body
            .appnews
            .newsitems
            .into_iter()
            .map(|item| self.to_record(item))
            .collect())
    }
}
