use crate::config::WatchConfig;
use crate::normalizer::{Confidence, ELLIPSIS, MediaRef, Normalizer};
use crate::sources::RawRecord;

const STEAM_SALE_BODY: &str = "[previewyoutube=abc123;full][/previewyoutube]Big sale! \
     [url=https://store.steampowered.com/sale/summer]details[/url]";

#[test]
fn test_sale_announcement() {
    let body = Normalizer::default().normalize_body(STEAM_SALE_BODY);

    assert_eq!(body.media_ref, Some(MediaRef::Video("abc123".to_string())));
    assert_eq!(
        body.link.as_deref(),
        Some("https://store.steampowered.com/sale/summer")
    );
    assert_eq!(body.clean_text, "Big sale! details");
    assert_eq!(body.confidence, Confidence::Normal);
}

#[test]
fn test_record_defaults_when_nothing_extracted() {
    let record = RawRecord::new(
        "5001",
        "  Patch notes  ",
        "Fixed a crash when loading saves.",
        "https://store.steampowered.com/news/app/593110/view/5001",
    );
    let (entry, confidence) = Normalizer::default().normalize(&record);

    assert_eq!(entry.title, "Patch notes");
    assert_eq!(entry.media_ref, None);
    assert_eq!(entry.canonical_link, record.url);
    assert_eq!(entry.clean_text, "Fixed a crash when loading saves.");
    assert_eq!(confidence, Confidence::Normal);
}

#[test]
fn test_media_hint_used_only_as_fallback() {
    let hint = MediaRef::Image("https://cdn.example.com/header.jpg".to_string());

    let plain = RawRecord::new("1", "Game", "No pictures here at all.", "https://x")
        .with_media_hint(hint.clone());
    let (entry, _) = Normalizer::default().normalize(&plain);
    assert_eq!(entry.media_ref, Some(hint.clone()));

    let with_video = RawRecord::new("2", "Game", STEAM_SALE_BODY, "https://x").with_media_hint(hint);
    let (entry, _) = Normalizer::default().normalize(&with_video);
    assert_eq!(entry.media_ref, Some(MediaRef::Video("abc123".to_string())));
}

#[test]
fn test_label_and_details_carried_through() {
    let record = RawRecord::new("42", "Hades", "", "https://store.steampowered.com/app/42")
        .with_label("Verified")
        .with_detail("Price", "Free");
    let (entry, confidence) = Normalizer::default().normalize(&record);

    assert_eq!(entry.classification_label.as_deref(), Some("Verified"));
    assert_eq!(entry.details, vec![("Price".to_string(), "Free".to_string())]);
    assert_eq!(confidence, Confidence::Low);
}

#[test]
fn test_long_body_is_truncated_with_marker() {
    let normalizer = Normalizer::from_config(&WatchConfig::default().with_text_budget(20));
    let body = format!("[p]{}[/p]", "word ".repeat(40));
    let result = normalizer.normalize_body(&body);

    assert_eq!(result.clean_text.chars().count(), 20 + ELLIPSIS.len());
    assert!(result.clean_text.ends_with(ELLIPSIS));
    assert!(result.clean_text.starts_with("word word word word"));
}

#[test]
fn test_markup_only_body_is_low_confidence() {
    let body = "[previewyoutube=xyz;full][/previewyoutube][img]https://x.example/a.png[/img]";
    let result = Normalizer::default().normalize_body(body);

    assert_eq!(result.clean_text, "");
    assert_eq!(result.confidence, Confidence::Low);
    assert_eq!(result.media_ref, Some(MediaRef::Video("xyz".to_string())));
}

#[test]
fn test_realistic_steam_event_body() {
    let body = "[img]{STEAM_CLAN_IMAGE}/4145017/f1e2d3.png[/img]\n\
        [h2]The Steam Next Fest is here![/h2]\n\n\n\n\
        [p]Play hundreds of demos.[/p]\n\
        [list]\n[*]Livestreams\n[*]Developer chats\n[/list]\n\
        [url=https://store.steampowered.com/fests/nextfest]Visit the Fest[/url]";
    let result = Normalizer::default().normalize_body(body);

    assert_eq!(
        result.media_ref,
        Some(MediaRef::Image(
            "https://clan.cloudflare.steamstatic.com/images/4145017/f1e2d3.png".to_string()
        ))
    );
    assert_eq!(
        result.link.as_deref(),
        Some("https://store.steampowered.com/fests/nextfest")
    );
    assert!(!result.clean_text.contains('['));
    assert!(!result.clean_text.contains("STEAM_CLAN_IMAGE"));
    assert!(result.clean_text.starts_with("The Steam Next Fest is here!"));
    assert!(result.clean_text.contains("• Livestreams\n• Developer chats"));
    assert!(result.clean_text.ends_with("Visit the Fest"));
    assert!(!result.clean_text.contains("\n\n\n"));
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use crate::normalizer::model::truncate_chars;
    use proptest::prelude::*;

    fn tagged_fragment() -> impl Strategy<Value = String> {
        let word = "[A-Za-z0-9 ,.!]{0,12}";
        prop_oneof![
            word.prop_map(|w| w),
            word.prop_map(|w| format!("[b]{w}[/b]")),
            word.prop_map(|w| format!("[p]{w}[/p]")),
            word.prop_map(|w| format!("[list][*]{w}[/list]")),
            word.prop_map(|w| format!("[url=https://store.steampowered.com/sale/x]{w}[/url]")),
            "[A-Za-z0-9_-]{1,11}".prop_map(|id| format!("[previewyoutube={id};full][/previewyoutube]")),
            "[a-z0-9]{1,8}".prop_map(|p| format!("{{STEAM_CLAN_IMAGE}}/1/{p}.png ")),
            "[a-z0-9]{1,8}".prop_map(|p| format!("[img]https://x.example/{p}.png[/img]")),
            Just("[br]".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn test_supported_tags_leave_no_brackets(parts in prop::collection::vec(tagged_fragment(), 0..12)) {
            let body = parts.concat();
            let result = Normalizer::default().normalize_body(&body);
            prop_assert!(!result.clean_text.contains('['));
            prop_assert!(!result.clean_text.contains(']'));
        }

        #[test]
        fn test_truncation_law(text in "\\PC{0,400}", budget in 1usize..200) {
            let out = truncate_chars(&text, budget);
            if text.chars().count() > budget {
                prop_assert_eq!(out.chars().count(), budget + ELLIPSIS.chars().count());
                let kept = out.strip_suffix(ELLIPSIS).unwrap();
                prop_assert!(text.starts_with(kept));
            } else {
                prop_assert_eq!(out, text);
            }
        }

        #[test]
        fn test_normalize_never_panics(body in ".*") {
            let _ = Normalizer::default().normalize_body(&body);
        }
    }
}
