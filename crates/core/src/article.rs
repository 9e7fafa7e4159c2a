//! The minimal article the readability pass hands to the text stage.

use serde::Serialize;

use crate::metadata::Metadata;

/// Title plus the cleaned HTML fragment of the article body.
///
/// A `ParsedArticle` always carries a non-empty `content_html`; extraction
/// that cannot produce one fails instead of returning an empty article.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedArticle {
    /// Article title, empty when the page has none.
    pub title: String,

    /// Cleaned HTML of the article body.
    pub content_html: String,

    pub byline: Option<String>,

    pub site_name: Option<String>,

    /// Value of the root `lang` attribute.
    pub language: Option<String>,

    /// Short description from the page's meta tags.
    pub excerpt: Option<String>,

    /// Score of the winning candidate.
    pub top_score: f64,
}

impl ParsedArticle {
    /// Assembles an article from page metadata and the extracted body.
    pub fn new(metadata: Metadata, content_html: String, top_score: f64) -> Self {
        Self {
            title: metadata.title.unwrap_or_default(),
            content_html,
            byline: metadata.byline,
            site_name: metadata.site_name,
            language: metadata.language,
            excerpt: metadata.excerpt,
            top_score,
        }
    }
}
