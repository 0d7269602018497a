/// Lower-case fragments of the interstitial pages served instead of content
/// when the fetch was flagged as automated.
const CHALLENGE_MARKERS: &[&str] = &["pardon our interruption", "hcaptcha"];

/// Did the site answer with an anti-automation challenge?
pub fn is_blocked(content: &str) -> bool {
    let content = content.to_lowercase();
    CHALLENGE_MARKERS.iter().any(|m| content.contains(m))
}
