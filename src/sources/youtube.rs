use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::normalizer::MediaRef;
use crate::sources::{RawRecord, Source, SourceError, client};

pub const YOUTUBE_FEED_BASE: &str = "https://www.youtube.com/feeds/videos.xml";
const VIDEO_ID_PREFIX: &str = "yt:video:";

/// Latest uploads of one channel, read from its public Atom feed.
#[derive(Debug, Clone)]
pub struct YouTubeFeedSource {
    channel_id: String,
    feed_base: String,
    limit: usize,
}

impl YouTubeFeedSource {
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            feed_base: YOUTUBE_FEED_BASE.to_string(),
            limit: 1,
        }
    }

    pub fn with_feed_base(mut self, base: impl Into<String>) -> Self {
        self.feed_base = base.into();
        self
    }

    /// Number of newest entries to report.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn feed_url(&self) -> String {
        format!("{}?channel_id={}", self.feed_base, self.channel_id)
    }

    pub fn parse_feed(&self, bytes: &[u8]) -> Result<Vec<RawRecord>, SourceError> {
        let feed = feed_rs::parser::parse(bytes).map_err(|e| SourceError::Decode(e.to_string()))?;
        let channel = feed
            .authors
            .first()
            .map(|a| a.name.clone())
            .or_else(|| feed.title.as_ref().map(|t| t.content.clone()));

        Ok(feed
            .entries
            .into_iter()
            .take(self.limit)
            .filter_map(|entry| {
                let video_id = entry
                    .id
                    .strip_prefix(VIDEO_ID_PREFIX)
                    .unwrap_or(&entry.id)
                    .to_string();
                if video_id.is_empty() {
                    return None;
                }

                let title = entry.title.map(|t| t.content).unwrap_or_default();
                let link = entry
                    .links
                    .first()
                    .map(|l| l.href.clone())
                    .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={video_id}"));
                let author = entry
                    .authors
                    .first()
                    .map(|a| a.name.clone())
                    .or_else(|| channel.clone());

                let mut record = RawRecord::new(video_id.clone(), title, "", link)
                    .with_media_hint(MediaRef::Video(video_id));
                if let Some(published) = entry.published.or(entry.updated) {
                    record = record.with_timestamp(published);
                }
                if let Some(author) = author {
                    record = record.with_detail("Channel", author);
                }
                Some(record)
            })
            .collect())
    }
}

#[async_trait]
impl Source for YouTubeFeedSource {
    fn name(&self) -> String {
        format!("youtube:{}", self.channel_id)
    }

    #[instrument(skip(self), fields(channel = %self.channel_id))]
    async fn fetch(&self) -> Result<Vec<RawRecord>, SourceError> {
        let bytes = client::get(&self.feed_url(), None)
            .await?
            .bytes()
            .await
            .map_err(SourceError::from_reqwest_error)?;
        let records = self.parse_feed(&bytes)?;
        debug!(entries = records.len(), "feed parsed");
        Ok(records)
    }
}
