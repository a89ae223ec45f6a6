use anyhow::Result;
use async_trait::async_trait;
use deckwatch::{
    Monitor,
    config::WatchConfig,
    history::{HistoryStore, JsonFileStore},
    notify::LogNotifier,
    sources::{RawRecord, Source, SourceError},
};

/// A fixed batch of announcements, newest first like the real feed.
struct CannedNews;

#[async_trait]
impl Source for CannedNews {
    fn name(&self) -> String {
        "canned-news".to_string()
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>, SourceError> {
        Ok(vec![
            RawRecord::new(
                "3",
                "Steam Next Fest: October Edition",
                "[p]Hundreds of demos.[/p][p][url=https://store.steampowered.com/sale/nextfest]Browse[/url][/p]\
                 [previewyoutube=abc123;full][/previewyoutube]",
                "https://store.steampowered.com/news/app/593110/view/3",
            ),
            RawRecord::new(
                "2",
                "Original Soundtrack Sale",
                "Music",
                "https://store.steampowered.com/news/app/593110/view/2",
            ),
            RawRecord::new(
                "1",
                "Autumn Sale",
                "[img]{STEAM_CLAN_IMAGE}/1/autumn.png[/img][p]Deals on thousands of games.[/p]",
                "https://store.steampowered.com/news/app/593110/view/1",
            ),
        ])
    }
}

/// Runs a sales-style monitor twice against canned data, logging alerts
/// instead of posting them. The second run shows that nothing repeats.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sent_sales.json");

    let watch = WatchConfig::default()
        .with_keywords(["sale", "fest"], ["soundtrack"])
        .with_text_budget(200)
        .with_history_cap(Some(50));

    let monitor = Monitor::new(
        "offline-sales",
        &watch,
        Box::new(CannedNews),
        Box::new(LogNotifier),
        Box::new(JsonFileStore::new(&path)),
    );

    let first = monitor.run().await?;
    println!("first run: {first:?}");

    let second = monitor.run().await?;
    println!("second run: {second:?}");

    let history = JsonFileStore::new(&path).load()?;
    println!("history: {:?}", history.labels());

    Ok(())
}
