/// Collapse whitespace runs to a single space and lower-case the result.
/// `char::is_whitespace` already covers U+00A0, U+202F and U+2007, which
/// listing sites use between digit groups and units.
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
