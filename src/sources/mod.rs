pub mod client;
pub mod errors;
pub mod event_page;
pub mod merged;
pub mod steam_news;
pub mod store_search;
pub mod types;
pub mod youtube;

use async_trait::async_trait;

pub use client::get_client;
pub use errors::SourceError;
pub use event_page::EventPageScraper;
pub use merged::MergedSource;
pub use steam_news::SteamNewsSource;
pub use store_search::{DeckTier, SearchQuery, StoreSearchSource};
pub use types::{RawRecord, oldest_first};
pub use youtube::YouTubeFeedSource;

/// Produces the current batch of raw records for a monitor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Source: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> String;

    async fn fetch(&self) -> Result<Vec<RawRecord>, SourceError>;
}

/// Text recovered from an entry's public page when its body is too thin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSummary {
    pub text: String,
    pub youtube_id: Option<String>,
    pub store_link: Option<String>,
}

/// Second chance at a description for low-confidence entries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextFallback: Send + Sync {
    async fn describe(&self, record: &RawRecord) -> Option<PageSummary>;
}
