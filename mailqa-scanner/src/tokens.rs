// Personalization token extraction

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// `{{...}}`, shortest span, not crossing line breaks.
const TOKEN_PATTERN: &str = r"\{\{.*?\}\}";

static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TOKEN_PATTERN).expect("Failed to compile token regex"));

/// Every `{{...}}` placeholder in `text`, in order, duplicates included.
pub fn extract_tokens(text: &str) -> Vec<String> {
    TOKEN_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Distinct placeholders in order of first appearance.
pub fn unique_tokens(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    extract_tokens(text)
        .into_iter()
        .filter(|token| seen.insert(token.clone()))
        .collect()
}
