use unicode_segmentation::UnicodeSegmentation;

use crate::limits::CharLimit;

/// Number of user-perceived characters (extended grapheme clusters).
/// An emoji, including ZWJ sequences and skin-tone variants, counts once.
pub fn logical_len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Returns the first `max` logical characters of `text`.
pub fn truncate_logical(text: &str, max: usize) -> &str {
    match text.grapheme_indices(true).nth(max) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}

/// Applies the hard length backstop. Text within the limit passes through
/// untouched.
pub fn enforce_limit(text: &str, limit: CharLimit) -> String {
    let received_length = logical_len(text);

    if received_length > limit.get() {
        tracing::warn!(
            "Generated text exceeded the character limit (requested {}, got {}), truncating",
            limit,
            received_length
        );
    }

    truncate_logical(text, limit.get()).to_string()
}
