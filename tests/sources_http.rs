mod helpers;

use deckwatch::normalizer::MediaRef;
use deckwatch::sources::{
    DeckTier, EventPageScraper, RawRecord, Source, SourceError, SteamNewsSource,
    StoreSearchSource, TextFallback, YouTubeFeedSource, event_page::AGE_GATE_COOKIES,
};
use helpers::{NewsItem, mount_news, news_body};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header_regex, method, path, query_param},
};

#[tokio::test]
async fn test_steam_news_success() {
    let mock_server = MockServer::start().await;
    mount_news(
        &mock_server,
        news_body(&[
            NewsItem {
                gid: "200",
                title: "Steam Next Fest",
                contents: "[p]Demos![/p]",
                date: 1_760_000_000,
            },
            NewsItem {
                gid: "100",
                title: "Autumn Sale",
                contents: "",
                date: 1_750_000_000,
            },
        ]),
    )
    .await;

    let source = SteamNewsSource::new(593110, 10).with_api_base(mock_server.uri());
    let records = source.fetch().await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].identity, "200");
    assert_eq!(records[0].raw_body, "[p]Demos![/p]");
    assert_eq!(records[1].timestamp.unwrap().timestamp(), 1_750_000_000);
}

#[tokio::test]
async fn test_steam_news_500_is_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(helpers::NEWS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let source = SteamNewsSource::new(593110, 10).with_api_base(mock_server.uri());
    match source.fetch().await {
        Err(SourceError::Http { status }) => assert_eq!(status.as_u16(), 500),
        other => panic!("Expected HTTP 500 error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_steam_news_garbage_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(helpers::NEWS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let source = SteamNewsSource::new(593110, 10).with_api_base(mock_server.uri());
    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, SourceError::Decode(_)));
}

#[tokio::test]
async fn test_store_search_listing() {
    let mock_server = MockServer::start().await;

    let listing = r#"<div id="search_resultsRows">
        <a href="https://store.steampowered.com/app/1145360/Hades/" data-ds-appid="1145360">
          <div class="search_capsule"><img src="https://cdn.example/hades.jpg"></div>
          <span class="title">Hades</span>
          <span class="search_review_summary" data-tooltip-html="압도적으로 긍정적&lt;br&gt;이 게임의 사용자 평가 250,000개 중 98%가 긍정적입니다."></span>
          <div class="discount_final_price">₩ 26,000</div>
        </a>
      </div>"#;

    Mock::given(method("GET"))
        .and(path("/search/"))
        .and(query_param("deck_compatibility", "3"))
        .and(query_param("sort_by", "Released_DESC"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing)
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let source = StoreSearchSource::deck_tier(DeckTier::Verified)
        .with_store_base(mock_server.uri())
        .with_min_reviews(50);
    let records = source.fetch().await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].identity, "1145360");
    assert_eq!(records[0].label.as_deref(), Some("Verified"));
    assert_eq!(
        records[0].media_hint,
        Some(MediaRef::Image("https://cdn.example/hades.jpg".to_string()))
    );
}

#[tokio::test]
async fn test_youtube_feed() {
    let mock_server = MockServer::start().await;

    let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Channel</title>
  <author><name>Channel</name></author>
  <id>yt:channel:UC1</id>
  <updated>2026-10-10T12:00:00+00:00</updated>
  <entry>
    <id>yt:video:VID00001</id>
    <title>First look</title>
    <link rel="alternate" href="https://www.youtube.com/watch?v=VID00001"/>
    <published>2026-10-10T12:00:00+00:00</published>
    <updated>2026-10-10T12:00:00+00:00</updated>
  </entry>
</feed>"#;

    Mock::given(method("GET"))
        .and(path("/feeds/videos.xml"))
        .and(query_param("channel_id", "UC1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed))
        .mount(&mock_server)
        .await;

    let source = YouTubeFeedSource::new("UC1")
        .with_feed_base(format!("{}/feeds/videos.xml", mock_server.uri()));
    let records = source.fetch().await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].identity, "VID00001");
    assert_eq!(
        records[0].media_hint,
        Some(MediaRef::Video("VID00001".to_string()))
    );
}

#[tokio::test]
async fn test_event_page_sends_age_gate_cookies() {
    let mock_server = MockServer::start().await;

    let page = r#"<html><body><div class="event_body">
        <p>Steam Next Fest</p><p>Play demos all week long.</p>
        <a href="https://store.steampowered.com/sale/nextfest">Go</a>
      </div></body></html>"#;

    Mock::given(method("GET"))
        .and(path("/news/app/593110/view/7"))
        .and(header_regex("cookie", "birthtime=946684801"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .expect(1)
        .mount(&mock_server)
        .await;

    let record = RawRecord::new(
        "7",
        "Steam Next Fest",
        "",
        format!("{}/news/app/593110/view/7", mock_server.uri()),
    );
    let summary = EventPageScraper::new(["/sale/"])
        .describe(&record)
        .await
        .unwrap();

    assert!(AGE_GATE_COOKIES.contains("Steam_Language=koreana"));
    assert!(summary.text.starts_with("Steam Next Fest\nPlay demos all week long."));
    assert_eq!(
        summary.store_link.as_deref(),
        Some("https://store.steampowered.com/sale/nextfest")
    );
}

#[tokio::test]
async fn test_event_page_missing_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let record = RawRecord::new("8", "t", "", format!("{}/gone", mock_server.uri()));
    assert!(EventPageScraper::new(["/sale/"]).describe(&record).await.is_none());
}
