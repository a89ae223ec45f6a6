use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalizer::model::normalize_whitespace;

// Only an opener directly followed by its closer; a lone opener is left to
// the generic tag strip so text after it survives.
static VIDEO_EMBED_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[previewyoutube=[^\]]*\]\s*\[/previewyoutube\]").unwrap()
});

static CLAN_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\{STEAM_CLAN_IMAGE\}[^\s\[\]"]*"#).unwrap());

static IMAGE_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)\[img(?:\s[^\]]*)?\].*?\[/img\]").unwrap());

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\[/?p\]|\[br\s*/?\]").unwrap());

static LIST_WRAPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\[/?o?list\]").unwrap());

static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\*\]").unwrap());

static LINK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)\[url=[^\]]*\](.*?)\[/url\]").unwrap());

static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\[\]]*\]").unwrap());

pub const BULLET_GLYPH: &str = "• ";

/// Turn a bracket-markup body into display text.
///
/// Embeds are removed before the generic tag strip so that their payloads
/// (video ids, image paths) do not leak into the text.
pub fn clean_markup(body: &str) -> String {
    let text = VIDEO_EMBED_PAIR.replace_all(body, "");
    let text = CLAN_IMAGE.replace_all(&text, "");
    let text = IMAGE_PAIR.replace_all(&text, "");
    let text = LINE_BREAK.replace_all(&text, "\n");
    let text = LIST_WRAPPER.replace_all(&text, "");
    let text = BULLET.replace_all(&text, BULLET_GLYPH);
    let text = LINK_TAG.replace_all(&text, "$1");
    let text = ANY_TAG.replace_all(&text, "");
    normalize_whitespace(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_video_embed_pair() {
        let body = "[previewyoutube=abc123;full][/previewyoutube]Big sale!";
        assert_eq!(clean_markup(body), "Big sale!");
    }

    #[test]
    fn test_unclosed_video_embed_keeps_following_text() {
        let body = "[previewyoutube=a;full]Important news here. [previewyoutube=b;full][/previewyoutube]Tail";
        assert_eq!(clean_markup(body), "Important news here. Tail");
    }

    #[test]
    fn test_removes_clan_image_and_path() {
        let body = "Before {STEAM_CLAN_IMAGE}/4145017/abc.png After";
        assert_eq!(clean_markup(body), "Before After");
    }

    #[test]
    fn test_removes_image_pairs_including_src_form() {
        let body = r#"A [img]https://x.example/a.png[/img] B [img src="{STEAM_CLAN_IMAGE}/1/b.png"][/img] C"#;
        assert_eq!(clean_markup(body), "A B C");
    }

    #[test]
    fn test_paragraphs_become_lines() {
        let body = "[p]First[/p][p]Second[/p][br]Third";
        assert_eq!(clean_markup(body), "First\n\nSecond\n\nThird");
    }

    #[test]
    fn test_lists_become_bullets() {
        let body = "[list][*]One[*]Two[/list]";
        assert_eq!(clean_markup(body), "• One• Two");
    }

    #[test]
    fn test_list_items_on_separate_lines() {
        let body = "[list]\n[*]One\n[*]Two\n[/list]";
        assert_eq!(clean_markup(body), "• One\n• Two");
    }

    #[test]
    fn test_link_unwrapped_to_text() {
        let body = "[url=https://store.steampowered.com/sale/summer]details[/url]";
        assert_eq!(clean_markup(body), "details");
    }

    #[test]
    fn test_unknown_tags_stripped() {
        let body = "[h1]Title[/h1] [b]bold[/b] [i]it[/i] [u]u[/u]";
        assert_eq!(clean_markup(body), "Title bold it u");
    }

    #[test]
    fn test_collapses_blank_lines() {
        let body = "a[br][br][br][br]b";
        assert_eq!(clean_markup(body), "a\n\nb");
    }
}
