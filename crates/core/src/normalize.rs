//! Final cleanup of flattened article text.

use std::fmt;
use std::ops::Deref;

use regex::RegexBuilder;
use serde::Serialize;

/// Maximum length of [`PlainText`], in characters.
pub const MAX_CHARS: usize = 10_000;

/// Bounded article text.
///
/// At most [`MAX_CHARS`] characters, no surrounding whitespace, and never
/// starting with an echo of the article title. Only [`normalize`] builds one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PlainText(String);

impl PlainText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Length in characters.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl Deref for PlainText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PlainText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlainText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PlainText> for String {
    fn from(text: PlainText) -> Self {
        text.0
    }
}

/// Strips a leading copy of `title`, trims, and caps the result at
/// [`MAX_CHARS`] characters.
///
/// The title is matched literally and case-insensitively; characters such as
/// `(` or `*` in it have no special meaning. Truncation ignores word
/// boundaries, but whitespace left dangling at the cut is dropped.
///
/// # Example
///
/// ```rust
/// use readaloud_core::normalize;
///
/// let text = normalize("My Post", "My Post\n\nBody here");
/// assert_eq!(text.as_str(), "Body here");
/// ```
pub fn normalize(title: &str, flat_text: &str) -> PlainText {
    let without_title = strip_title(title, flat_text);
    let trimmed = without_title.trim();

    let text = match trimmed.char_indices().nth(MAX_CHARS) {
        Some((cut, _)) => {
            tracing::debug!(chars = trimmed.chars().count(), limit = MAX_CHARS, "truncating article text");
            trimmed[..cut].trim_end()
        }
        None => trimmed,
    };

    PlainText(text.to_string())
}

fn strip_title<'t>(title: &str, text: &'t str) -> &'t str {
    if title.is_empty() {
        return text;
    }

    let pattern = format!(r"^{}\s*", regex::escape(title));
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => match re.find(text) {
            Some(m) => &text[m.end()..],
            None => text,
        },
        Err(err) => {
            tracing::warn!(error = %err, "title pattern rejected, leaving text as is");
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("My Post", "My Post\n\nBody here", "Body here")]
    #[case("My Post", "MY POST Body here", "Body here")]
    #[case("My Post", "Body first. My Post later", "Body first. My Post later")]
    #[case("", "  Body  ", "Body")]
    #[case("C++ (2024)*", "c++ (2024)* body", "body")]
    #[case("a.b", "axb stays", "axb stays")]
    fn test_title_strip(#[case] title: &str, #[case] text: &str, #[case] expected: &str) {
        assert_eq!(normalize(title, text).as_str(), expected);
    }

    #[test]
    fn test_truncates_to_limit() {
        let text = "a".repeat(MAX_CHARS + 1);
        let result = normalize("", &text);

        assert_eq!(result.char_count(), MAX_CHARS);
        assert!(text.starts_with(result.as_str()));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let text = "é".repeat(MAX_CHARS + 5);
        let result = normalize("", &text);
        assert_eq!(result.char_count(), MAX_CHARS);
    }

    #[test]
    fn test_truncation_drops_trailing_whitespace() {
        let text = format!("{} b", "a".repeat(MAX_CHARS - 1));
        let result = normalize("", &text);

        assert_eq!(text.chars().count(), MAX_CHARS + 1);
        assert_eq!(result.char_count(), MAX_CHARS - 1);
        assert!(!result.ends_with(' '));
    }

    #[test]
    fn test_exact_limit_untouched() {
        let text = "b".repeat(MAX_CHARS);
        assert_eq!(normalize("", &text).as_str(), text);
    }

    #[test]
    fn test_title_only_gives_empty_text() {
        assert_eq!(normalize("Heading", "Heading\n\n").as_str(), "");
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&normalize("", "hello")).unwrap();
        assert_eq!(json, "\"hello\"");
    }
}
