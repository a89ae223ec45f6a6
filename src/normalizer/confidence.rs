use crate::normalizer::model::Confidence;

/// Below this many non-whitespace characters the text does not describe
/// anything on its own.
pub const MIN_MEANINGFUL_CHARS: usize = 10;

pub fn assess(clean_text: &str) -> Confidence {
    let meaningful = clean_text.chars().filter(|c| !c.is_whitespace()).count();
    if meaningful < MIN_MEANINGFUL_CHARS {
        Confidence::Low
    } else {
        Confidence::Normal
    }
}
