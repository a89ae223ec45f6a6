pub mod cleaner;
pub mod confidence;
pub mod links;
pub mod media;
pub mod model;

#[cfg(test)]
mod tests;

pub use links::LinkExtractor;
pub use media::MediaExtractor;
pub use model::{Confidence, MediaRef, NormalizedBody, NormalizedEntry, ELLIPSIS};

use crate::config::WatchConfig;
use crate::sources::RawRecord;

/// Turns bracket-markup bodies into display text plus media and link.
pub struct Normalizer {
    text_budget: usize,
    media_chain: Vec<Box<dyn MediaExtractor>>,
    links: LinkExtractor,
}

impl Normalizer {
    pub fn new(text_budget: usize, links: LinkExtractor) -> Self {
        Self {
            text_budget,
            media_chain: media::default_chain(),
            links,
        }
    }

    pub fn from_config(config: &WatchConfig) -> Self {
        Self::new(
            config.text_budget,
            LinkExtractor::new(config.link_patterns.iter().cloned()),
        )
    }

    pub fn normalize_body(&self, raw_body: &str) -> NormalizedBody {
        // 1. Media reference, first strategy that succeeds
        let media_ref = media::extract_first(&self.media_chain, raw_body);

        // 2. Canonical link, looked up on the raw body before tags go away
        let link = self.links.extract(raw_body);

        // 3. Clean text and judge whether it says anything
        let untruncated = cleaner::clean_markup(raw_body);
        let confidence = confidence::assess(&untruncated);

        NormalizedBody {
            clean_text: self.truncate(&untruncated),
            media_ref,
            link,
            confidence,
        }
    }

    /// Normalize a record. Body media wins over the source's media hint and
    /// an extracted link wins over the record's own URL.
    pub fn normalize(&self, record: &RawRecord) -> (NormalizedEntry, Confidence) {
        let body = self.normalize_body(&record.raw_body);

        let entry = NormalizedEntry {
            identity: record.identity.clone(),
            title: record.title.trim().to_string(),
            clean_text: body.clean_text,
            media_ref: body.media_ref.or_else(|| record.media_hint.clone()),
            canonical_link: body.link.unwrap_or_else(|| record.url.clone()),
            classification_label: record.label.clone(),
            details: record.details.clone(),
        };

        (entry, body.confidence)
    }

    /// Apply the text budget to text that came from somewhere else, such as
    /// a fallback description.
    pub fn truncate(&self, text: &str) -> String {
        model::truncate_chars(text, self.text_budget)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::from_config(&WatchConfig::default())
    }
}
