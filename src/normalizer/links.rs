use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static ABSOLUTE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s\[\]"'<>]+"#).unwrap());

/// Store pages worth linking to instead of the news post itself.
pub const DEFAULT_LINK_PATTERNS: [&str; 3] = ["/category/", "/sale/", "/fests/"];

/// Picks the canonical outbound link from a markup body. Patterns are tried
/// in order; for each, the first URL in the body containing it wins.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    patterns: Vec<String>,
}

impl LinkExtractor {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn extract(&self, body: &str) -> Option<String> {
        if self.patterns.is_empty() {
            return None;
        }

        let candidates: Vec<&str> = ABSOLUTE_URL
            .find_iter(body)
            .map(|m| trim_trailing_punctuation(m.as_str()))
            .filter(|candidate| Url::parse(candidate).is_ok())
            .collect();

        self.patterns.iter().find_map(|pattern| {
            candidates
                .iter()
                .find(|candidate| candidate.contains(pattern.as_str()))
                .map(|candidate| candidate.to_string())
        })
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_LINK_PATTERNS)
    }
}

fn trim_trailing_punctuation(url: &str) -> &str {
    url.trim_end_matches(['.', ',', ';', ':', '!', '?', ')'])
}
