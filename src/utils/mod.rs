//! Utility functions and helpers.

pub mod html;
pub mod http;
pub mod time;
pub mod url;

/// Lower-cased, whitespace-delimited tokens of a search query.
pub fn query_tokens(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|token| token.to_lowercase())
        .collect()
}

/// Whether any query token occurs in the lower-cased, space-joined fields.
pub fn matches_any_token(tokens: &[String], fields: &[&str]) -> bool {
    let haystack = fields.join(" ").to_lowercase();
    tokens.iter().any(|token| haystack.contains(token.as_str()))
}
