use tracing::warn;

/// Trim an API key and drop every non-ASCII or control character.
///
/// Keys pasted from chat apps or documents often carry full-width spaces or
/// zero-width characters that break the `Authorization` header.
pub fn sanitize_api_key(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect();

    if cleaned.len() != raw.trim().len() {
        warn!(
            prefix = %cleaned.chars().take(5).collect::<String>(),
            "API key contained non-ASCII characters; they were stripped"
        );
    }
    cleaned
}
