/// Cleans a raw model reply before it is measured: surrounding whitespace is
/// trimmed and a wrapping markdown code fence, if any, is removed.
pub fn normalize_reply(raw: &str) -> String {
    let trimmed = raw.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed.to_string();
    };

    // Drop the language tag line, e.g. ```text
    let body = match body.split_once('\n') {
        Some((_, inner)) => inner,
        None => body,
    };
    body.trim().to_string()
}

/// Normalizes a user-supplied fragment: blank fragments are treated as absent.
pub fn normalize_fragment(fragment: Option<&str>) -> Option<String> {
    fragment
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
}
