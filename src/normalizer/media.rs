use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalizer::model::MediaRef;

pub const CLAN_IMAGE_CDN: &str = "https://clan.cloudflare.steamstatic.com/images";

static VIDEO_EMBED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[previewyoutube=([A-Za-z0-9_-]+)").unwrap());

static CLAN_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\{STEAM_CLAN_IMAGE\}([^\s\[\]"]+)"#).unwrap());

static IMAGE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)\[img\]\s*(.*?)\s*\[/img\]").unwrap());

static IMAGE_SRC_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\[img\s+src="([^"]+)"[^\]]*\]"#).unwrap());

/// One way of finding the media reference inside a markup body.
pub trait MediaExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, body: &str) -> Option<MediaRef>;
}

/// `[previewyoutube=<id>;full][/previewyoutube]`
pub struct VideoEmbedExtractor;

impl MediaExtractor for VideoEmbedExtractor {
    fn name(&self) -> &'static str {
        "video_embed"
    }

    fn extract(&self, body: &str) -> Option<MediaRef> {
        VIDEO_EMBED
            .captures(body)
            .map(|caps| MediaRef::Video(caps[1].to_string()))
    }
}

/// `{STEAM_CLAN_IMAGE}/<clan>/<file>` resolved against the clan CDN.
pub struct ClanImageExtractor {
    cdn_base: String,
}

impl ClanImageExtractor {
    pub fn new(cdn_base: impl Into<String>) -> Self {
        Self {
            cdn_base: cdn_base.into(),
        }
    }
}

impl Default for ClanImageExtractor {
    fn default() -> Self {
        Self::new(CLAN_IMAGE_CDN)
    }
}

impl MediaExtractor for ClanImageExtractor {
    fn name(&self) -> &'static str {
        "clan_image"
    }

    fn extract(&self, body: &str) -> Option<MediaRef> {
        let caps = CLAN_IMAGE.captures(body)?;
        let path = caps[1].trim_start_matches('/');
        let base = self.cdn_base.trim_end_matches('/');
        Some(MediaRef::Image(format!("{base}/{path}")))
    }
}

/// `[img]<url>[/img]`, or the `[img src="<url>"]` attribute form.
pub struct ImageTagExtractor;

impl MediaExtractor for ImageTagExtractor {
    fn name(&self) -> &'static str {
        "image_tag"
    }

    fn extract(&self, body: &str) -> Option<MediaRef> {
        IMAGE_TAG
            .captures(body)
            .or_else(|| IMAGE_SRC_ATTR.captures(body))
            .map(|caps| caps[1].trim().to_string())
            .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
            .map(MediaRef::Image)
    }
}

/// Strategies in priority order; the first hit wins.
pub fn default_chain() -> Vec<Box<dyn MediaExtractor>> {
    vec![
        Box::new(VideoEmbedExtractor),
        Box::new(ClanImageExtractor::default()),
        Box::new(ImageTagExtractor),
    ]
}

pub fn extract_first(chain: &[Box<dyn MediaExtractor>], body: &str) -> Option<MediaRef> {
    chain.iter().find_map(|extractor| {
        let found = extractor.extract(body);
        if found.is_some() {
            tracing::trace!(strategy = extractor.name(), "media reference found");
        }
        found
    })
}
