#![no_main]

use libfuzzer_sys::fuzz_target;

use deckwatch::normalizer::{Normalizer, model::truncate_chars};

fuzz_target!(|data: &[u8]| {
    // Convert raw bytes to string, handling invalid UTF-8 gracefully
    let body = String::from_utf8_lossy(data);

    // Normalization should never panic regardless of input
    let normalizer = Normalizer::default();
    let normalized = normalizer.normalize_body(&body);
    assert!(normalized.clean_text.chars().count() <= normalizer.text_budget() + 3);

    let _ = truncate_chars(&body, 7);
});
