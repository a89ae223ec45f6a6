use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static BLANK_LINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Pointer to the picture or video that illustrates an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaRef {
    /// YouTube video identifier.
    Video(String),
    /// Absolute image URL.
    Image(String),
}

impl MediaRef {
    /// Image URL suitable for an embed: the image itself, or the video's
    /// full-size YouTube thumbnail.
    pub fn preview_url(&self) -> String {
        match self {
            MediaRef::Video(id) => format!("https://img.youtube.com/vi/{id}/maxresdefault.jpg"),
            MediaRef::Image(url) => url.clone(),
        }
    }
}

/// Whether the cleaned text is worth showing on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    Normal,
    /// Text is empty or too short to describe the entry; callers may look
    /// for an alternate description.
    Low,
}

/// Result of normalizing one markup body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedBody {
    pub clean_text: String,
    pub media_ref: Option<MediaRef>,
    pub link: Option<String>,
    pub confidence: Confidence,
}

/// An entry that survived classification, ready for diffing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEntry {
    pub identity: String,
    pub title: String,
    pub clean_text: String,
    pub media_ref: Option<MediaRef>,
    pub canonical_link: String,
    pub classification_label: Option<String>,
    pub details: Vec<(String, String)>,
}

/// Trim every line, squeeze runs of spaces/tabs, and keep at most one blank
/// line between paragraphs.
pub fn normalize_whitespace(text: &str) -> String {
    let spaced = SPACE_RUN.replace_all(text, " ");
    let lines: Vec<&str> = spaced.lines().map(str::trim).collect();
    let joined = lines.join("\n");
    BLANK_LINE_RUN
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}

/// Cap `text` at `budget` characters, appending [`ELLIPSIS`] when cut.
pub fn truncate_chars(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

pub const ELLIPSIS: &str = "...";
