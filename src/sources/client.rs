use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder, Response};
use std::time::Duration;
use tracing::instrument;

use crate::sources::errors::SourceError;

// Steam serves a stripped page to unknown agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0 Safari/537.36 deckwatch/0.1";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(10))
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .expect("Failed to build HTTP client")
});

pub fn get_client() -> &'static Client {
    &HTTP_CLIENT
}

/// GET `url` and fail on any non-success status.
#[instrument(skip_all, fields(url = %url))]
pub async fn get(url: &str, cookies: Option<&str>) -> Result<Response, SourceError> {
    let parsed = url::Url::parse(url)?;

    let mut request = HTTP_CLIENT.get(parsed);
    if let Some(cookies) = cookies {
        request = request.header(reqwest::header::COOKIE, cookies);
    }

    let response = request
        .send()
        .await
        .map_err(SourceError::from_reqwest_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Http { status });
    }

    Ok(response)
}

pub async fn get_text(url: &str, cookies: Option<&str>) -> Result<String, SourceError> {
    get(url, cookies)
        .await?
        .text()
        .await
        .map_err(SourceError::from_reqwest_error)
}
