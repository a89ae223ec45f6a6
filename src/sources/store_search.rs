use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

use crate::normalizer::MediaRef;
use crate::sources::steam_news::STEAM_STORE_BASE;
use crate::sources::{RawRecord, Source, SourceError, client};

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("#search_resultsRows > a").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse(".title").unwrap());
static CAPSULE_IMG: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".search_capsule img").unwrap());
static REVIEW_SUMMARY: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".search_review_summary").unwrap());
static DISCOUNT_PRICE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".discount_final_price").unwrap());
static PLAIN_PRICE: Lazy<Selector> = Lazy::new(|| Selector::parse(".search_price").unwrap());

static REVIEW_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9][0-9,]*)\s*(?:개|user reviews)").unwrap());

pub const HEADER_IMAGE_BASE: &str = "https://cdn.cloudflare.steamstatic.com/steam/apps";
pub const FREE_PRICE: &str = "Free";

/// Steam Deck compatibility tiers as the store search filters them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckTier {
    Verified,
    Playable,
    Unsupported,
}

impl DeckTier {
    pub const ALL: [DeckTier; 3] = [DeckTier::Verified, DeckTier::Playable, DeckTier::Unsupported];

    /// Value of the `deck_compatibility` search parameter.
    pub fn code(self) -> u8 {
        match self {
            DeckTier::Verified => 3,
            DeckTier::Playable => 2,
            DeckTier::Unsupported => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeckTier::Verified => "Verified",
            DeckTier::Playable => "Playable",
            DeckTier::Unsupported => "Unsupported",
        }
    }
}

/// Sort order and filters of a store search listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub params: Vec<(String, String)>,
}

impl SearchQuery {
    /// Games, newest release first, Korean store.
    pub fn newest_games() -> Self {
        Self {
            params: vec![
                ("sort_by".into(), "Released_DESC".into()),
                ("category1".into(), "998".into()),
                ("l".into(), "koreana".into()),
                ("cc".into(), "kr".into()),
            ],
        }
    }

    /// Games, best sellers first, Korean store.
    pub fn top_sellers() -> Self {
        Self {
            params: vec![
                ("filter".into(), "topsellers".into()),
                ("category1".into(), "998".into()),
                ("l".into(), "koreana".into()),
                ("cc".into(), "kr".into()),
            ],
        }
    }

    pub fn with_deck_tier(mut self, tier: DeckTier) -> Self {
        self.params
            .push(("deck_compatibility".into(), tier.code().to_string()));
        self
    }

    pub fn to_url(&self, store_base: &str) -> Result<String, SourceError> {
        let mut url = url::Url::parse(&format!("{}/search/", store_base.trim_end_matches('/')))?;
        url.query_pairs_mut().extend_pairs(self.params.iter());
        Ok(url.to_string())
    }
}

/// Rows of a Steam store search result page.
#[derive(Debug, Clone)]
pub struct StoreSearchSource {
    query: SearchQuery,
    store_base: String,
    label: Option<String>,
    min_reviews: u64,
    limit: Option<usize>,
}

impl StoreSearchSource {
    pub fn new(query: SearchQuery) -> Self {
        Self {
            query,
            store_base: STEAM_STORE_BASE.to_string(),
            label: None,
            min_reviews: 0,
            limit: None,
        }
    }

    /// Listing filtered to one compatibility tier; every row carries the
    /// tier as its label.
    pub fn deck_tier(tier: DeckTier) -> Self {
        Self::new(SearchQuery::newest_games().with_deck_tier(tier)).with_label(tier.label())
    }

    pub fn with_store_base(mut self, base: impl Into<String>) -> Self {
        self.store_base = base.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Drop rows with fewer user reviews than this.
    pub fn with_min_reviews(mut self, min: u64) -> Self {
        self.min_reviews = min;
        self
    }

    /// Look at only the first `limit` rows of the page.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn parse_listing(&self, html: &str) -> Vec<RawRecord> {
        let document = Html::parse_document(html);
        let limit = self.limit.unwrap_or(usize::MAX);

        document
            .select(&ROW)
            .take(limit)
            .filter_map(|row| self.parse_row(row))
            .filter(|(_, reviews)| *reviews >= self.min_reviews)
            .map(|(record, _)| record)
            .collect()
    }

    fn parse_row(&self, row: ElementRef<'_>) -> Option<(RawRecord, u64)> {
        // Bundles list several ids; the first one names the product.
        let app_id = row
            .value()
            .attr("data-ds-appid")?
            .split(',')
            .next()?
            .trim()
            .to_string();
        if app_id.is_empty() {
            return None;
        }

        let title = row
            .select(&TITLE)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());
        let link = row.value().attr("href").unwrap_or_default().to_string();

        let image = capsule_image(row)
            .unwrap_or_else(|| format!("{HEADER_IMAGE_BASE}/{app_id}/header.jpg"));

        let (sentiment, reviews) = review_summary(row);
        let price = price(row);

        let mut record = RawRecord::new(app_id, title, "", link)
            .with_media_hint(MediaRef::Image(image))
            .with_detail("Price", price);
        if let Some(sentiment) = sentiment {
            record = record.with_detail("Reviews", format!("{sentiment} ({reviews})"));
        }
        if let Some(label) = &self.label {
            record = record.with_label(label.clone());
        }

        Some((record, reviews))
    }
}

fn capsule_image(row: ElementRef<'_>) -> Option<String> {
    let img = row.select(&CAPSULE_IMG).next()?;
    let from_srcset = img
        .value()
        .attr("srcset")
        .and_then(|srcset| srcset.split(',').next())
        .and_then(|first| first.split_whitespace().next())
        .map(str::to_string);
    from_srcset
        .or_else(|| img.value().attr("src").map(str::to_string))
        .filter(|url| !url.is_empty())
}

fn review_summary(row: ElementRef<'_>) -> (Option<String>, u64) {
    let Some(tooltip) = row
        .select(&REVIEW_SUMMARY)
        .next()
        .and_then(|el| el.value().attr("data-tooltip-html"))
    else {
        return (None, 0);
    };

    let sentiment = tooltip
        .split("<br>")
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let count = REVIEW_COUNT
        .captures(tooltip)
        .and_then(|caps| caps[1].replace(',', "").parse::<u64>().ok())
        .unwrap_or(0);

    (sentiment, count)
}

fn price(row: ElementRef<'_>) -> String {
    let text = row
        .select(&DISCOUNT_PRICE)
        .next()
        .or_else(|| row.select(&PLAIN_PRICE).next())
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    match text {
        Some(t) if t.contains("Free") || t.contains("무료") => FREE_PRICE.to_string(),
        Some(t) => t,
        None => "N/A".to_string(),
    }
}

#[async_trait]
impl Source for StoreSearchSource {
    fn name(&self) -> String {
        match &self.label {
            Some(label) => format!("store-search:{label}"),
            None => "store-search".to_string(),
        }
    }

    #[instrument(skip(self), fields(label = ?self.label))]
    async fn fetch(&self) -> Result<Vec<RawRecord>, SourceError> {
        let url = self.query.to_url(&self.store_base)?;
        let html = client::get_text(&url, None).await?;
        let records = self.parse_listing(&html);
        debug!(rows = records.len(), "store search parsed");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
    <html><body><div id="search_resultsRows">
      <a href="https://store.steampowered.com/app/620/Portal_2/" data-ds-appid="620">
        <div class="col search_capsule"><img src="https://cdn.example/620_sm.jpg"
             srcset="https://cdn.example/620_1x.jpg 1x, https://cdn.example/620_2x.jpg 2x"></div>
        <span class="title"> Portal 2 </span>
        <span class="search_review_summary positive"
              data-tooltip-html="매우 긍정적&lt;br&gt;이 게임의 사용자 평가 12,345개 중 98%가 긍정적입니다."></span>
        <div class="discount_final_price">₩ 10,500</div>
      </a>
      <a href="https://store.steampowered.com/app/999/Tiny/" data-ds-appid="999">
        <span class="title">Tiny Game</span>
        <span class="search_review_summary mixed"
              data-tooltip-html="Mixed&lt;br&gt;55% of the 12 user reviews for this game are positive."></span>
        <div class="search_price">Free to Play</div>
      </a>
      <a href="https://store.steampowered.com/sub/1/" data-ds-appid="400,620">
        <span class="title">Bundle</span>
        <div class="search_price">무료</div>
      </a>
      <a href="https://store.steampowered.com/app/none/">
        <span class="title">No id</span>
      </a>
    </div></body></html>
    "#;

    #[test]
    fn test_parses_rows() {
        let records = StoreSearchSource::deck_tier(DeckTier::Verified).parse_listing(LISTING);
        assert_eq!(records.len(), 3);

        let portal = &records[0];
        assert_eq!(portal.identity, "620");
        assert_eq!(portal.title, "Portal 2");
        assert_eq!(portal.label.as_deref(), Some("Verified"));
        assert_eq!(
            portal.media_hint,
            Some(MediaRef::Image("https://cdn.example/620_1x.jpg".to_string()))
        );
        assert_eq!(
            portal.details,
            vec![
                ("Price".to_string(), "₩ 10,500".to_string()),
                ("Reviews".to_string(), "매우 긍정적 (12345)".to_string()),
            ]
        );

        let tiny = &records[1];
        assert_eq!(
            tiny.media_hint,
            Some(MediaRef::Image(format!("{HEADER_IMAGE_BASE}/999/header.jpg")))
        );
        assert_eq!(tiny.details[0], ("Price".to_string(), FREE_PRICE.to_string()));

        assert_eq!(records[2].identity, "400");
        assert_eq!(records[2].details[0].1, FREE_PRICE);
    }

    #[test]
    fn test_min_reviews_filter() {
        let records = StoreSearchSource::new(SearchQuery::newest_games())
            .with_min_reviews(50)
            .parse_listing(LISTING);
        let ids: Vec<_> = records.iter().map(|r| r.identity.as_str()).collect();
        assert_eq!(ids, vec!["620"]);
    }

    #[test]
    fn test_limit_applies_to_rows() {
        let records = StoreSearchSource::new(SearchQuery::newest_games())
            .with_limit(1)
            .parse_listing(LISTING);
        assert_eq!(records.len(), 1);
        assert!(records[0].label.is_none());
    }

    #[test]
    fn test_query_url() {
        let url = SearchQuery::newest_games()
            .with_deck_tier(DeckTier::Playable)
            .to_url(STEAM_STORE_BASE)
            .unwrap();
        assert_eq!(
            url,
            "https://store.steampowered.com/search/?sort_by=Released_DESC&category1=998&l=koreana&cc=kr&deck_compatibility=2"
        );
    }

    #[test]
    fn test_top_sellers_url() {
        let url = SearchQuery::top_sellers()
            .with_deck_tier(DeckTier::Verified)
            .to_url(STEAM_STORE_BASE)
            .unwrap();
        assert_eq!(
            url,
            "https://store.steampowered.com/search/?filter=topsellers&category1=998&l=koreana&cc=kr&deck_compatibility=3"
        );
    }
}
