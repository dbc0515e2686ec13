// src/utils/html.rs

//! HTML to plain-text conversion for job descriptions.

use scraper::Html;

/// Extract the visible text of an HTML fragment, collapsing whitespace.
pub fn to_plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: Vec<&str> = fragment.root_element().text().collect();
    text.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Convert entity-escaped HTML (`&lt;p&gt;...`) to plain text.
///
/// The first parse decodes entities back into markup, the second strips it.
pub fn escaped_to_plain_text(escaped: &str) -> String {
    let decoded: String = Html::parse_fragment(escaped)
        .root_element()
        .text()
        .collect();
    to_plain_text(&decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_strips_tags() {
        assert_eq!(
            to_plain_text("<p>Build <strong>APIs</strong></p>\n<ul><li>Rust</li></ul>"),
            "Build APIs Rust"
        );
    }

    #[test]
    fn test_escaped_html() {
        assert_eq!(
            escaped_to_plain_text("&lt;p&gt;Join &amp;amp; grow&lt;/p&gt;"),
            "Join & grow"
        );
    }

    #[test]
    fn test_plain_input_is_unchanged() {
        assert_eq!(to_plain_text("just   text"), "just text");
    }
}
