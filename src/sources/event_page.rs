use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

use crate::sources::{PageSummary, RawRecord, TextFallback, client};

// Korean store, past the age gate.
pub const AGE_GATE_COOKIES: &str =
    "Steam_Language=koreana; birthtime=946684801; lastagecheckage=1-0-2000";

pub const MAX_SUMMARY_LINES: usize = 10;

static BODY_CANDIDATES: Lazy<Vec<Selector>> = Lazy::new(|| {
    [".event_body", "#news_detail_body", ".clan_announcement_body"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});
static YOUTUBE_IFRAME: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"iframe[src*="youtube.com/embed/"]"#).unwrap());
static YOUTUBE_DATA: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-youtube-video-id]").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

static EMBED_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"youtube\.com/embed/([A-Za-z0-9_-]+)").unwrap());

/// Reads an announcement's event page when the API body says too little.
#[derive(Debug, Clone)]
pub struct EventPageScraper {
    link_patterns: Vec<String>,
    cookies: String,
}

impl EventPageScraper {
    pub fn new<I, S>(link_patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            link_patterns: link_patterns.into_iter().map(Into::into).collect(),
            cookies: AGE_GATE_COOKIES.to_string(),
        }
    }

    pub fn summarize(&self, html: &str) -> Option<PageSummary> {
        let document = Html::parse_document(html);

        let text = BODY_CANDIDATES
            .iter()
            .find_map(|selector| document.select(selector).next())
            .map(|body| {
                body.text()
                    .flat_map(str::lines)
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .take(MAX_SUMMARY_LINES)
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        let youtube_id = document
            .select(&YOUTUBE_IFRAME)
            .filter_map(|el| el.value().attr("src"))
            .find_map(|src| EMBED_ID.captures(src).map(|c| c[1].to_string()))
            .or_else(|| {
                document
                    .select(&YOUTUBE_DATA)
                    .filter_map(|el| el.value().attr("data-youtube-video-id"))
                    .map(str::trim)
                    .find(|id| !id.is_empty())
                    .map(str::to_string)
            });

        let store_link = document
            .select(&ANCHOR)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| self.link_patterns.iter().any(|p| href.contains(p.as_str())))
            .map(str::to_string);

        if text.is_empty() && youtube_id.is_none() && store_link.is_none() {
            return None;
        }

        Some(PageSummary {
            text,
            youtube_id,
            store_link,
        })
    }
}

#[async_trait]
impl TextFallback for EventPageScraper {
    #[instrument(skip_all, fields(identity = %record.identity, url = %record.url))]
    async fn describe(&self, record: &RawRecord) -> Option<PageSummary> {
        let html = match client::get_text(&record.url, Some(&self.cookies)).await {
            Ok(html) => html,
            Err(e) => {
                debug!(error = %e, "event page unavailable");
                return None;
            }
        };
        self.summarize(&html)
    }
}
