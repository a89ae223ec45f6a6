#![allow(dead_code)]

use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const NEWS_PATH: &str = "/ISteamNews/GetNewsForApp/v2/";
pub const WEBHOOK_PATH: &str = "/api/webhooks/1/token";

/// One news item as the Steam API returns it.
pub struct NewsItem<'a> {
    pub gid: &'a str,
    pub title: &'a str,
    pub contents: &'a str,
    pub date: i64,
}

pub fn news_body(items: &[NewsItem<'_>]) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|item| {
            json!({
                "gid": item.gid,
                "title": item.title,
                "url": format!("https://store.steampowered.com/news/app/593110/view/{}", item.gid),
                "is_external_url": false,
                "author": "Steam",
                "contents": item.contents,
                "feedlabel": "Community Announcements",
                "date": item.date,
                "feedname": "steam_community_announcements",
                "appid": 593110
            })
        })
        .collect();

    json!({ "appnews": { "appid": 593110, "newsitems": items, "count": items.len() } })
}

pub async fn mount_news(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path(NEWS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub fn webhook_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), WEBHOOK_PATH)
}

/// Titles of every embed posted to the mock webhook, in order.
pub async fn posted_titles(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == WEBHOOK_PATH)
        .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
        .filter_map(|v| v["embeds"][0]["title"].as_str().map(str::to_string))
        .collect()
}
