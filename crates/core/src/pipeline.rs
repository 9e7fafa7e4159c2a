//! The full fetch, build, extract, flatten and normalize chain.
//!
//! A [`Pipeline`] holds no per-request state; one instance can serve any
//! number of concurrent requests. The fetch is its only suspension point:
//! everything after it runs synchronously in [`Pipeline::process`], so the
//! document tree never lives across an `.await`.
//!
//! # Example
//!
//! ```rust
//! use readaloud_core::{FetchConfig, HtmlDomBuilder, HttpFetcher, Pipeline, RawDocument};
//! use url::Url;
//!
//! let html = r#"<html><head><title>Notes</title></head><body><article class="post">
//!     <h1>Notes</h1>
//!     <p>The first paragraph is long enough to count, with commas, clauses, and a few more words.</p>
//!     <p>The second paragraph adds more prose, more commas, and yet more words to the article body.</p>
//! </article></body></html>"#;
//!
//! let fetcher = HttpFetcher::new(FetchConfig::default()).unwrap();
//! let pipeline = Pipeline::new(fetcher, HtmlDomBuilder::default());
//! let raw = RawDocument::from_html(html, Url::parse("https://example.com/notes").unwrap());
//!
//! let extraction = pipeline.process(&raw).unwrap();
//! assert_eq!(extraction.title, "Notes");
//! assert!(extraction.text_content.starts_with("The first paragraph"));
//! assert!(!extraction.text_content.contains("Notes"));
//! ```

use serde::Serialize;

use crate::article::ParsedArticle;
use crate::fetch::{ExtractionRequest, FetchConfig, Fetcher, HttpFetcher, RawDocument};
use crate::formatters::text::{TextConfig, TextFormatter};
use crate::normalize::{PlainText, normalize};
use crate::parse::{DomBuilder, HtmlDomBuilder};
use crate::readability::Readability;
use crate::Result;

/// What the pipeline produces for one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub title: String,
    pub text_content: PlainText,
}

/// Fetcher and DOM builder plus the fixed extraction stages.
#[derive(Debug, Clone)]
pub struct Pipeline<F, B = HtmlDomBuilder> {
    fetcher: F,
    builder: B,
    readability: Readability,
    text: TextFormatter,
}

impl Pipeline<HttpFetcher, HtmlDomBuilder> {
    /// Production pipeline: `reqwest` fetcher and a DOM builder matching
    /// `readability`'s cleanup settings.
    pub fn http(fetch_config: FetchConfig, readability: Readability) -> Result<Self> {
        let builder = readability.dom_builder();
        Ok(Pipeline::new(HttpFetcher::new(fetch_config)?, builder).with_readability(readability))
    }
}

impl<F: Fetcher, B: DomBuilder> Pipeline<F, B> {
    pub fn new(fetcher: F, builder: B) -> Self {
        Self { fetcher, builder, readability: Readability::new(), text: TextFormatter::default() }
    }

    pub fn with_readability(mut self, readability: Readability) -> Self {
        self.readability = readability;
        self
    }

    pub fn with_text_config(mut self, config: TextConfig) -> Self {
        self.text = TextFormatter::new(config);
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetches the request's URL and runs the remaining stages on the body.
    pub async fn run(&self, request: &ExtractionRequest) -> Result<Extraction> {
        let raw = self.fetcher.fetch(request.url()).await?;
        self.process(&raw)
    }

    /// Runs everything after the fetch.
    pub fn process(&self, raw: &RawDocument) -> Result<Extraction> {
        let article = self.extract_article(raw)?;
        Ok(self.to_text(&article))
    }

    /// Builds the tree and isolates the article.
    pub fn extract_article(&self, raw: &RawDocument) -> Result<ParsedArticle> {
        let doc = self.builder.build(raw)?;
        self.readability.extract(&doc)
    }

    /// Flattens and normalizes an extracted article.
    pub fn to_text(&self, article: &ParsedArticle) -> Extraction {
        let flat = self.text.convert(&article.content_html);
        let text_content = normalize(&article.title, &flat);

        tracing::debug!(title = %article.title, chars = text_content.char_count(), "article flattened");

        Extraction { title: article.title.clone(), text_content }
    }
}
