//! The monitors this crate ships with, registered by name.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::alert::{AlertStyle, MediaPlacement, Severity};
use crate::config::{Config, ConfigError, WatchConfig};
use crate::diff::DiffPolicy;
use crate::history::{HistoryStore, JsonFileStore, MemoryStore, ReadOnlyStore, SEEN};
use crate::monitor::Monitor;
use crate::normalizer::MediaRef;
use crate::notify::{DiscordWebhook, LogNotifier, Notifier};
use crate::sources::store_search::HEADER_IMAGE_BASE;
use crate::sources::{
    DeckTier, EventPageScraper, MergedSource, SearchQuery, Source, SteamNewsSource,
    StoreSearchSource, YouTubeFeedSource,
};

pub const DECK_COMPAT: &str = "deck-compat";
pub const SALES: &str = "sales";
pub const STEAMOS: &str = "steamos";
pub const NEW_RELEASES: &str = "new-releases";
pub const YOUTUBE: &str = "youtube";
pub const POPULATE: &str = "populate";

const STEAM_EVENTS_APP: u32 = 593110;
const STEAMOS_APP: u32 = 1675200;
const NEWS_COUNT: u32 = 10;
const MIN_REVIEWS: u64 = 50;
const NEW_RELEASES_ROWS: usize = 15;
const TOP_SELLER_ROWS: usize = 10;
const SALES_TEXT_BUDGET: usize = 200;
const SALES_HISTORY_CAP: usize = 50;

const SALES_KEYWORDS: [&str; 10] = [
    "Sale",
    "Fest",
    "Festival",
    "Edition",
    "세일",
    "축제",
    "페스티벌",
    "대전",
    "할인",
    "넥스트 페스트",
];
const SALES_EXCLUDE: [&str; 4] = ["Soundtrack", "OST", "Patch", "Hotfix"];
const STEAMOS_KEYWORDS: [&str; 5] = ["Preview", "SteamOS", "Client Update", "Beta", "Stable"];

const STEAM_LOGO: &str = "https://upload.wikimedia.org/wikipedia/commons/thumb/8/83/Steam_icon_logo.svg/2048px-Steam_icon_logo.svg.png";

/// Where built monitors send their alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delivery {
    #[default]
    Webhook,
    /// Log alerts instead of posting them and leave history files alone.
    /// No webhook is required.
    DryRun,
}

pub type PresetFactory =
    Box<dyn Fn(&Config, Delivery) -> Result<Monitor, ConfigError> + Send + Sync>;

/// Registry of monitor presets by name
#[derive(Default)]
pub struct PresetRegistry {
    presets: IndexMap<&'static str, PresetFactory>,
}

impl PresetRegistry {
    pub fn new() -> Self {
        Self {
            presets: IndexMap::new(),
        }
    }

    /// Registry holding every shipped monitor.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(DECK_COMPAT, Box::new(deck_compat));
        registry.register(SALES, Box::new(sales));
        registry.register(STEAMOS, Box::new(steamos));
        registry.register(NEW_RELEASES, Box::new(new_releases));
        registry.register(YOUTUBE, Box::new(youtube));
        registry.register(POPULATE, Box::new(populate));
        registry
    }

    pub fn register(&mut self, name: &'static str, factory: PresetFactory) {
        self.presets.insert(name, factory);
    }

    pub fn build(
        &self,
        name: &str,
        config: &Config,
        delivery: Delivery,
    ) -> Result<Monitor, ConfigError> {
        let factory = self
            .presets
            .get(name)
            .ok_or_else(|| ConfigError::UnknownMonitor(name.to_string()))?;
        factory(config, delivery)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.presets.keys().copied().collect()
    }
}

fn notifier<'a>(
    delivery: Delivery,
    webhook: impl FnOnce() -> Result<&'a str, ConfigError>,
) -> Result<Box<dyn Notifier>, ConfigError> {
    Ok(match delivery {
        Delivery::Webhook => Box::new(DiscordWebhook::new(webhook()?)),
        Delivery::DryRun => Box::new(LogNotifier),
    })
}

fn store(
    config: &Config,
    delivery: Delivery,
    file: &str,
    legacy_label: &str,
) -> Box<dyn HistoryStore> {
    let store =
        JsonFileStore::new(config.state_dir().join(file)).with_legacy_label(legacy_label);
    match delivery {
        Delivery::Webhook => Box::new(store),
        Delivery::DryRun => Box::new(ReadOnlyStore::new(store)),
    }
}

fn header_image(app_id: impl std::fmt::Display) -> String {
    format!("{HEADER_IMAGE_BASE}/{app_id}/header.jpg")
}

fn names<const N: usize>(pairs: [(&str, &str); N]) -> HashMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Shared look of the compatibility alerts: one color per tier.
fn deck_style(new_title: &str) -> AlertStyle {
    AlertStyle {
        new_title: new_title.to_string(),
        default_severity: Severity::Critical,
        label_severity: HashMap::from([
            (DeckTier::Verified.label().to_string(), Severity::Good),
            (DeckTier::Playable.label().to_string(), Severity::Caution),
            (DeckTier::Unsupported.label().to_string(), Severity::Critical),
        ]),
        label_names: names([
            ("Verified", "완벽 호환"),
            ("Playable", "플레이 가능"),
            ("Unsupported", "지원되지 않음"),
        ]),
        detail_names: names([("Price", "가격"), ("Reviews", "평가")]),
        transition_heading: "상태".to_string(),
        link_caption: "스팀 상점 페이지 바로가기".to_string(),
        placement: MediaPlacement::Image,
        ..AlertStyle::default()
    }
}

/// Steam Deck compatibility results across the three tiers.
fn deck_compat(config: &Config, delivery: Delivery) -> Result<Monitor, ConfigError> {
    let watch = WatchConfig::default().with_history_cap(None);
    watch.validate()?;

    let tiers: Vec<Box<dyn Source>> = DeckTier::ALL
        .into_iter()
        .map(|tier| {
            Box::new(StoreSearchSource::deck_tier(tier).with_min_reviews(MIN_REVIEWS))
                as Box<dyn Source>
        })
        .collect();

    let style = AlertStyle {
        changed_title: "🔄 스팀덱 등급 변경: {title}".to_string(),
        label_heading: Some("결과".to_string()),
        ..deck_style("{glyph} 스팀덱 신규 결과: {title}")
    };

    Ok(Monitor::new(
        DECK_COMPAT,
        &watch,
        Box::new(MergedSource::new(DECK_COMPAT, tiers)),
        notifier(delivery, || config.webhook_compat())?,
        store(config, delivery, "sent_games.json", DeckTier::Verified.label()),
    )
    .with_diff_policy(DiffPolicy::default())
    .with_alert_style(style)
    .with_dispatch_delay(config.dispatch_delay()))
}

/// Sale and festival announcements from the Steam events feed.
fn sales(config: &Config, delivery: Delivery) -> Result<Monitor, ConfigError> {
    let watch = WatchConfig::default()
        .with_keywords(SALES_KEYWORDS, SALES_EXCLUDE)
        .with_text_budget(SALES_TEXT_BUDGET)
        .with_history_cap(Some(SALES_HISTORY_CAP));
    watch.validate()?;

    let style = AlertStyle {
        new_title: "{glyph} {title}".to_string(),
        default_severity: Severity::Highlight,
        link_caption: "👉 축제 상점 페이지 바로가기".to_string(),
        placement: MediaPlacement::Image,
        placeholder: Some(STEAM_LOGO.to_string()),
        ..AlertStyle::default()
    };

    Ok(Monitor::new(
        SALES,
        &watch,
        Box::new(SteamNewsSource::new(STEAM_EVENTS_APP, NEWS_COUNT)),
        notifier(delivery, || config.webhook_sales())?,
        store(config, delivery, "sent_sales.json", SEEN),
    )
    .with_fallback(Box::new(EventPageScraper::new(watch.link_patterns.clone())))
    .with_alert_style(style)
    .with_dispatch_delay(config.dispatch_delay()))
}

/// SteamOS release and preview notes, sent to the private channel.
fn steamos(config: &Config, delivery: Delivery) -> Result<Monitor, ConfigError> {
    let watch = WatchConfig::default().with_keywords(STEAMOS_KEYWORDS, [] as [&str; 0]);
    watch.validate()?;

    let style = AlertStyle {
        default_severity: Severity::Info,
        title_severity: vec![
            ("Preview".to_string(), Severity::Preview),
            ("Beta".to_string(), Severity::Preview),
        ],
        severity_titles: HashMap::from([
            (Severity::Info, "{glyph} 스팀OS 정식 소식: {title}".to_string()),
            (Severity::Preview, "{glyph} 스팀OS 테스트/프리뷰: {title}".to_string()),
        ]),
        preamble: Some("새로운 업데이트 소식입니다.".to_string()),
        link_caption: "패치노트 확인하기".to_string(),
        placement: MediaPlacement::Image,
        ..AlertStyle::default()
    };

    let source = SteamNewsSource::new(STEAMOS_APP, NEWS_COUNT)
        .with_media_hint(MediaRef::Image(header_image(STEAMOS_APP)));

    Ok(Monitor::new(
        STEAMOS,
        &watch,
        Box::new(source),
        notifier(delivery, || config.webhook_private())?,
        store(config, delivery, "sent_steamos.json", SEEN),
    )
    .with_alert_style(style)
    .with_dispatch_delay(config.dispatch_delay()))
}

/// Newest game releases on the Korean store.
fn new_releases(config: &Config, delivery: Delivery) -> Result<Monitor, ConfigError> {
    let watch = WatchConfig::default();
    watch.validate()?;

    let style = AlertStyle {
        new_title: "🆕 스팀 신작 출시: {title}".to_string(),
        default_severity: Severity::Info,
        detail_names: names([("Price", "가격"), ("Reviews", "평가")]),
        link_caption: "상점 페이지 구경하기".to_string(),
        placement: MediaPlacement::Thumbnail,
        ..AlertStyle::default()
    };

    let source =
        StoreSearchSource::new(SearchQuery::newest_games()).with_limit(NEW_RELEASES_ROWS);

    Ok(Monitor::new(
        NEW_RELEASES,
        &watch,
        Box::new(source),
        notifier(delivery, || config.webhook_new_releases())?,
        store(config, delivery, "sent_new_releases.json", SEEN),
    )
    .with_alert_style(style)
    .with_dispatch_delay(config.dispatch_delay()))
}

/// Latest upload of the configured YouTube channel.
fn youtube(config: &Config, delivery: Delivery) -> Result<Monitor, ConfigError> {
    let watch = WatchConfig::default();
    watch.validate()?;

    let style = AlertStyle {
        new_title: "{glyph} 새 영상 업로드: {title}".to_string(),
        default_severity: Severity::Video,
        detail_names: names([("Channel", "채널")]),
        link_caption: "보러 가기".to_string(),
        placement: MediaPlacement::Image,
        ..AlertStyle::default()
    };

    Ok(Monitor::new(
        YOUTUBE,
        &watch,
        Box::new(YouTubeFeedSource::new(config.youtube_channel())),
        notifier(delivery, || config.webhook_video())?,
        store(config, delivery, "sent_videos.json", SEEN),
    )
    .with_alert_style(style)
    .with_dispatch_delay(config.dispatch_delay()))
}

/// One-shot post of the best sellers in the Verified and Playable tiers.
///
/// History starts empty and is never written, so every run posts the full
/// list again.
fn populate(config: &Config, delivery: Delivery) -> Result<Monitor, ConfigError> {
    let watch = WatchConfig::default().with_history_cap(None);
    watch.validate()?;

    let tiers: Vec<Box<dyn Source>> = [DeckTier::Verified, DeckTier::Playable]
        .into_iter()
        .map(|tier| {
            let source = StoreSearchSource::new(SearchQuery::top_sellers().with_deck_tier(tier))
                .with_label(tier.label())
                .with_limit(TOP_SELLER_ROWS);
            Box::new(source) as Box<dyn Source>
        })
        .collect();

    Ok(populate_monitor(
        &watch,
        Box::new(MergedSource::new(POPULATE, tiers)),
        notifier(delivery, || config.webhook_compat())?,
    )
    .with_dispatch_delay(config.dispatch_delay()))
}

fn populate_monitor(
    watch: &WatchConfig,
    source: Box<dyn Source>,
    notifier: Box<dyn Notifier>,
) -> Monitor {
    let style = AlertStyle {
        label_heading: Some("상태".to_string()),
        ..deck_style("{glyph} 인기 게임 스팀덱 현황: {title}")
    };

    Monitor::new(
        POPULATE,
        watch,
        source,
        notifier,
        Box::new(ReadOnlyStore::new(MemoryStore::new())),
    )
    .with_alert_style(style)
}
