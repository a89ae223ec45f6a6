use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::diff::{DiffKind, DiffResult};

/// Visual weight of a notification, derived from the entry's label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Good,
    Caution,
    Critical,
    Info,
    Preview,
    Highlight,
    Video,
}

impl Severity {
    pub fn glyph(self) -> &'static str {
        match self {
            Severity::Good => "🟢",
            Severity::Caution => "🟡",
            Severity::Critical => "🔴",
            Severity::Info => "📢",
            Severity::Preview => "🧪",
            Severity::Highlight => "🎪",
            Severity::Video => "📺",
        }
    }

    /// Embed color as `0xRRGGBB`.
    pub fn color(self) -> u32 {
        match self {
            Severity::Good => 0x00ff00,
            Severity::Caution => 0xffff00,
            Severity::Critical => 0xff0000,
            Severity::Info => 0x00b0f4,
            Severity::Preview => 0xff00ff,
            Severity::Highlight => 0xffd700,
            Severity::Video => 0xff0000,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Severity::Good => "good",
            Severity::Caution => "caution",
            Severity::Critical => "critical",
            Severity::Info => "info",
            Severity::Preview => "preview",
            Severity::Highlight => "highlight",
            Severity::Video => "video",
        }
    }
}

/// How an alert's picture is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertMedia {
    /// Full-width image under the text.
    Image(String),
    /// Small picture in the corner.
    Thumbnail(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaPlacement {
    #[default]
    Image,
    Thumbnail,
}

/// Structured notification handed to a [`crate::notify::Notifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title_line: String,
    pub body: String,
    pub severity: Severity,
    pub media: Option<AlertMedia>,
}

/// Presentation rules for one monitor.
///
/// Title templates understand `{glyph}` and `{title}`.
#[derive(Debug, Clone)]
pub struct AlertStyle {
    pub new_title: String,
    /// Per-severity replacements for `new_title`.
    pub severity_titles: HashMap<Severity, String>,
    pub changed_title: String,
    pub default_severity: Severity,
    pub label_severity: HashMap<String, Severity>,
    /// Title substrings that force a severity, checked in order before the
    /// label mapping.
    pub title_severity: Vec<(String, Severity)>,
    pub label_names: HashMap<String, String>,
    /// Display names for detail keys.
    pub detail_names: HashMap<String, String>,
    /// Lead line for a labelled new entry, e.g. `Result`.
    pub label_heading: Option<String>,
    /// Lead line for a changed entry, e.g. `Status`.
    pub transition_heading: String,
    /// Text shown before the body, if any.
    pub preamble: Option<String>,
    pub link_caption: String,
    pub placement: MediaPlacement,
    /// Thumbnail used when the entry has no media at all.
    pub placeholder: Option<String>,
}

impl Default for AlertStyle {
    fn default() -> Self {
        Self {
            new_title: "{glyph} {title}".to_string(),
            severity_titles: HashMap::new(),
            changed_title: "🔄 {title}".to_string(),
            default_severity: Severity::Info,
            label_severity: HashMap::new(),
            title_severity: Vec::new(),
            label_names: HashMap::new(),
            detail_names: HashMap::new(),
            label_heading: None,
            transition_heading: "Status".to_string(),
            preamble: None,
            link_caption: "Open".to_string(),
            placement: MediaPlacement::Image,
            placeholder: None,
        }
    }
}

impl AlertStyle {
    fn severity_for(&self, title: &str, label: Option<&str>) -> Severity {
        if let Some((_, severity)) = self
            .title_severity
            .iter()
            .find(|(needle, _)| title.contains(needle.as_str()))
        {
            return *severity;
        }
        label
            .and_then(|l| self.label_severity.get(l))
            .copied()
            .unwrap_or(self.default_severity)
    }

    fn display_name<'a>(&'a self, label: &'a str) -> &'a str {
        self.label_names
            .get(label)
            .map(String::as_str)
            .unwrap_or(label)
    }

    fn render_title(template: &str, glyph: &str, title: &str) -> String {
        template.replace("{glyph}", glyph).replace("{title}", title)
    }
}

/// Builds notification payloads from diff results.
#[derive(Debug, Clone, Default)]
pub struct AlertBuilder {
    style: AlertStyle,
}

impl AlertBuilder {
    pub fn new(style: AlertStyle) -> Self {
        Self { style }
    }

    /// `None` for unchanged results; those never become notifications.
    pub fn build(&self, result: &DiffResult) -> Option<Alert> {
        let entry = &result.entry;
        let label = entry.classification_label.as_deref();
        let severity = self.style.severity_for(&entry.title, label);
        let glyph = severity.glyph();

        let title_line = match result.kind {
            DiffKind::New => {
                let template = self
                    .style
                    .severity_titles
                    .get(&severity)
                    .unwrap_or(&self.style.new_title);
                AlertStyle::render_title(template, glyph, &entry.title)
            }
            DiffKind::Changed => {
                AlertStyle::render_title(&self.style.changed_title, glyph, &entry.title)
            }
            DiffKind::Unchanged => return None,
        };

        let mut sections: Vec<String> = Vec::new();

        if let Some(preamble) = &self.style.preamble {
            sections.push(preamble.clone());
        }

        match (result.kind, label) {
            (DiffKind::Changed, Some(current)) => {
                let previous = result
                    .previous_label
                    .as_deref()
                    .map(|p| self.style.display_name(p))
                    .unwrap_or("?");
                sections.push(format!(
                    "{}: {} ➔ {} **{}**",
                    self.style.transition_heading,
                    previous,
                    glyph,
                    self.style.display_name(current)
                ));
            }
            (DiffKind::New, Some(current)) => {
                if let Some(heading) = &self.style.label_heading {
                    sections.push(format!(
                        "{}: **{}**",
                        heading,
                        self.style.display_name(current)
                    ));
                }
            }
            _ => {}
        }

        if !entry.clean_text.is_empty() {
            sections.push(entry.clean_text.clone());
        }

        let details: Vec<String> = entry
            .details
            .iter()
            .map(|(key, value)| {
                let key = self.style.detail_names.get(key).unwrap_or(key);
                format!("**{key}:** {value}")
            })
            .collect();
        if !details.is_empty() {
            sections.push(details.join("\n"));
        }

        sections.push(format!(
            "[{}]({})",
            self.style.link_caption, entry.canonical_link
        ));

        let media = match &entry.media_ref {
            Some(media) => {
                let url = media.preview_url();
                Some(match self.style.placement {
                    MediaPlacement::Image => AlertMedia::Image(url),
                    MediaPlacement::Thumbnail => AlertMedia::Thumbnail(url),
                })
            }
            None => self.style.placeholder.clone().map(AlertMedia::Thumbnail),
        };

        Some(Alert {
            title_line,
            body: sections.join("\n"),
            severity,
            media,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::{MediaRef, NormalizedEntry};

    fn tier_style() -> AlertStyle {
        AlertStyle {
            new_title: "{glyph} Deck result: {title}".to_string(),
            changed_title: "🔄 Deck rating changed: {title}".to_string(),
            label_severity: HashMap::from([
                ("Verified".to_string(), Severity::Good),
                ("Playable".to_string(), Severity::Caution),
                ("Unsupported".to_string(), Severity::Critical),
            ]),
            default_severity: Severity::Critical,
            label_heading: Some("Result".to_string()),
            link_caption: "Store page".to_string(),
            ..AlertStyle::default()
        }
    }

    fn result(kind: DiffKind, label: Option<&str>, previous: Option<&str>) -> DiffResult {
        DiffResult {
            entry: NormalizedEntry {
                identity: "42".to_string(),
                title: "Hades".to_string(),
                clean_text: String::new(),
                media_ref: Some(MediaRef::Image("https://cdn.example.com/h.jpg".to_string())),
                canonical_link: "https://store.steampowered.com/app/42".to_string(),
                classification_label: label.map(str::to_string),
                details: vec![("Price".to_string(), "Free".to_string())],
            },
            kind,
            previous_label: previous.map(str::to_string),
            notify: true,
        }
    }

    #[test]
    fn test_new_labelled_entry() {
        let alert = AlertBuilder::new(tier_style())
            .build(&result(DiffKind::New, Some("Verified"), None))
            .unwrap();

        assert_eq!(alert.title_line, "🟢 Deck result: Hades");
        assert_eq!(alert.severity, Severity::Good);
        assert_eq!(
            alert.body,
            "Result: **Verified**\n**Price:** Free\n[Store page](https://store.steampowered.com/app/42)"
        );
        assert_eq!(
            alert.media,
            Some(AlertMedia::Image("https://cdn.example.com/h.jpg".to_string()))
        );
    }

    #[test]
    fn test_changed_entry_has_transition_phrase() {
        let mut style = tier_style();
        style
            .label_names
            .insert("Playable".to_string(), "플레이 가능".to_string());
        let alert = AlertBuilder::new(style)
            .build(&result(DiffKind::Changed, Some("Verified"), Some("Playable")))
            .unwrap();

        assert_eq!(alert.title_line, "🔄 Deck rating changed: Hades");
        assert!(alert.body.starts_with("Status: 플레이 가능 ➔ 🟢 **Verified**"));
    }

    #[test]
    fn test_unchanged_builds_nothing() {
        let builder = AlertBuilder::new(tier_style());
        assert!(builder
            .build(&result(DiffKind::Unchanged, Some("Verified"), None))
            .is_none());
    }

    #[test]
    fn test_unmapped_label_uses_default_severity() {
        let alert = AlertBuilder::new(tier_style())
            .build(&result(DiffKind::New, Some("Mystery"), None))
            .unwrap();
        assert_eq!(alert.severity, Severity::Critical);
    }

    #[test]
    fn test_title_keyword_overrides_severity() {
        let style = AlertStyle {
            title_severity: vec![("Beta".to_string(), Severity::Preview)],
            ..AlertStyle::default()
        };
        let mut r = result(DiffKind::New, None, None);
        r.entry.title = "SteamOS 3.7 Beta".to_string();
        let alert = AlertBuilder::new(style).build(&r).unwrap();
        assert_eq!(alert.severity, Severity::Preview);
        assert_eq!(alert.title_line, "🧪 SteamOS 3.7 Beta");
    }

    #[test]
    fn test_severity_title_and_detail_names() {
        let style = AlertStyle {
            title_severity: vec![("Beta".to_string(), Severity::Preview)],
            severity_titles: HashMap::from([(
                Severity::Preview,
                "{glyph} Preview build: {title}".to_string(),
            )]),
            detail_names: HashMap::from([("Price".to_string(), "가격".to_string())]),
            ..AlertStyle::default()
        };
        let builder = AlertBuilder::new(style);

        let mut r = result(DiffKind::New, None, None);
        r.entry.title = "SteamOS 3.8 Beta".to_string();
        let alert = builder.build(&r).unwrap();
        assert_eq!(alert.title_line, "🧪 Preview build: SteamOS 3.8 Beta");
        assert!(alert.body.contains("**가격:** Free"));

        r.entry.title = "SteamOS 3.7 Stable".to_string();
        assert_eq!(builder.build(&r).unwrap().title_line, "📢 SteamOS 3.7 Stable");
    }

    #[test]
    fn test_video_media_becomes_youtube_thumbnail() {
        let mut r = result(DiffKind::New, None, None);
        r.entry.media_ref = Some(MediaRef::Video("abc123".to_string()));
        let alert = AlertBuilder::default().build(&r).unwrap();
        assert_eq!(
            alert.media,
            Some(AlertMedia::Image(
                "https://img.youtube.com/vi/abc123/maxresdefault.jpg".to_string()
            ))
        );
    }

    #[test]
    fn test_missing_media_uses_placeholder() {
        let style = AlertStyle {
            placeholder: Some("https://example.com/steam.png".to_string()),
            ..AlertStyle::default()
        };
        let mut r = result(DiffKind::New, None, None);
        r.entry.media_ref = None;
        let alert = AlertBuilder::new(style).build(&r).unwrap();
        assert_eq!(
            alert.media,
            Some(AlertMedia::Thumbnail("https://example.com/steam.png".to_string()))
        );
    }

    #[test]
    fn test_clean_text_precedes_link() {
        let mut r = result(DiffKind::New, None, None);
        r.entry.clean_text = "Big sale! details".to_string();
        r.entry.details.clear();
        let alert = AlertBuilder::default().build(&r).unwrap();
        assert_eq!(
            alert.body,
            "Big sale! details\n[Open](https://store.steampowered.com/app/42)"
        );
    }
}
