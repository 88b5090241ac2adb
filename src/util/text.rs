// src/util/text.rs
use html_escape::decode_html_entities;
use regex::Regex;

/// Compact one-line preview of a field value for progress and report lines.
///
/// Anki field values are HTML, so this:
/// 1. Decodes HTML entities (e.g., &amp; → &)
/// 2. Removes all HTML tags
/// 3. Collapses whitespace runs into single spaces
/// 4. Truncates to `max_chars` characters with an ellipsis
///
/// # Examples
///
/// ```
/// use ankipush::util::text::preview;
///
/// let html = "<p>What is a Tree?</p>";
/// assert_eq!(preview(html, 50), "What is a Tree?");
/// ```
pub fn preview(text: &str, max_chars: usize) -> String {
    // Decode HTML entities first
    let decoded = decode_html_entities(text).to_string();

    // Replace tags with spaces so adjacent words don't fuse
    let tag_re = Regex::new(r"<[^>]+>").unwrap();
    let no_tags = tag_re.replace_all(&decoded, " ").into_owned();

    let collapsed = no_tags.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, max_chars)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}...", truncated)
}
