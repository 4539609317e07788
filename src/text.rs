//! Display helpers for provider text, which arrives HTML-entity-encoded.

/// Decode HTML character references for display, covering the full HTML5
/// named set plus numeric references. Unknown references are kept as-is.
pub fn decode_entities(raw: &str) -> String {
    html_escape::decode_html_entities(raw).into_owned()
}
