use regex::Regex;

/// True when a free-text identifier is a placeholder rather than real data:
/// empty/whitespace-only, or nothing but lowercase hex digits (the signature
/// anonymization leaves behind, e.g. `ed268db7fcf834e4ac18222e7252815a`).
///
/// Matching against a placeholder would either waste a query or bind the row
/// to the wrong person, so strategies short-circuit on it.
pub fn is_placeholder_value(text: &str) -> bool {
    let hex = Regex::new(r"^[a-f0-9]+$").unwrap();
    text.trim().is_empty() || hex.is_match(text)
}
