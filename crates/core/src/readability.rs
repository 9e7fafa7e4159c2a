//! Article isolation on top of the cleaned DOM.
//!
//! [`Readability`] turns a parsed [`Document`] into a [`ParsedArticle`]: the
//! page title plus a minimal HTML fragment holding the article body.
//!
//! # Example
//!
//! ```rust
//! use readaloud_core::Readability;
//!
//! let html = r#"
//!     <html><head><title>Field Notes</title></head><body>
//!     <article class="post">
//!         <p>The first paragraph is long enough to count, with commas, clauses, and a few more words.</p>
//!         <p>The second paragraph adds more prose, more commas, and yet more words to the article body.</p>
//!     </article>
//!     </body></html>
//! "#;
//!
//! let article = Readability::new().parse(html).unwrap();
//! assert_eq!(article.title, "Field Notes");
//! assert!(article.content_html.contains("first paragraph"));
//! ```

use url::Url;

use crate::article::ParsedArticle;
use crate::extract::{ExtractConfig, extract_content};
use crate::parse::{Document, HtmlDomBuilder};
use crate::postprocess::PostProcessConfig;
use crate::preprocess::PreprocessConfig;
use crate::{ReadaloudError, Result};

/// Knobs for [`Readability`].
///
/// # Example
///
/// ```rust
/// use readaloud_core::ReadabilityConfig;
///
/// let config = ReadabilityConfig::builder()
///     .min_score(25.0)
///     .char_threshold(500)
///     .build();
/// assert_eq!(config.min_score, 25.0);
/// ```
#[derive(Debug, Clone)]
pub struct ReadabilityConfig {
    /// Score the winning block must reach; pages below it are not articles.
    pub min_score: f64,

    /// Paragraph-level blocks need a tenth of this many characters to count.
    pub char_threshold: usize,

    pub nb_top_candidates: usize,

    /// Look at no more than this many candidate blocks; 0 means no limit.
    pub max_elems_to_parse: usize,

    /// Unwrap navigation, comment and sidebar wrappers before scoring.
    pub remove_unlikely: bool,

    pub keep_classes: bool,

    /// Keep `<img>` tags in `content_html`. Flattened text never contains
    /// them either way.
    pub preserve_images: bool,
}

impl Default for ReadabilityConfig {
    fn default() -> Self {
        Self {
            min_score: 20.0,
            char_threshold: 500,
            nb_top_candidates: 5,
            max_elems_to_parse: 0,
            remove_unlikely: true,
            keep_classes: false,
            preserve_images: true,
        }
    }
}

impl ReadabilityConfig {
    pub fn builder() -> ReadabilityConfigBuilder {
        ReadabilityConfigBuilder::new()
    }

    fn extract_config(&self) -> ExtractConfig {
        ExtractConfig {
            min_score_threshold: self.min_score,
            max_top_candidates: self.nb_top_candidates,
            char_threshold: self.char_threshold,
            max_elements: self.max_elems_to_parse,
            sibling_threshold: 0.2,
            postprocess: PostProcessConfig {
                strip_images: !self.preserve_images,
                keep_classes: self.keep_classes,
                ..Default::default()
            },
        }
    }
}

/// Chained setters over [`ReadabilityConfig::default`].
pub struct ReadabilityConfigBuilder {
    config: ReadabilityConfig,
}

impl ReadabilityConfigBuilder {
    pub fn new() -> Self {
        Self { config: ReadabilityConfig::default() }
    }

    pub fn min_score(mut self, value: f64) -> Self {
        self.config.min_score = value;
        self
    }

    pub fn char_threshold(mut self, value: usize) -> Self {
        self.config.char_threshold = value;
        self
    }

    pub fn nb_top_candidates(mut self, value: usize) -> Self {
        self.config.nb_top_candidates = value;
        self
    }

    pub fn max_elems_to_parse(mut self, value: usize) -> Self {
        self.config.max_elems_to_parse = value;
        self
    }

    pub fn remove_unlikely(mut self, value: bool) -> Self {
        self.config.remove_unlikely = value;
        self
    }

    pub fn keep_classes(mut self, value: bool) -> Self {
        self.config.keep_classes = value;
        self
    }

    pub fn preserve_images(mut self, value: bool) -> Self {
        self.config.preserve_images = value;
        self
    }

    pub fn build(self) -> ReadabilityConfig {
        self.config
    }
}

impl Default for ReadabilityConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Finds the article in a document.
#[derive(Debug, Clone, Default)]
pub struct Readability {
    config: ReadabilityConfig,
}

impl Readability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ReadabilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReadabilityConfig {
        &self.config
    }

    /// A [`HtmlDomBuilder`] that cleans markup the way this config expects.
    pub fn dom_builder(&self) -> HtmlDomBuilder {
        HtmlDomBuilder { remove_unlikely: self.config.remove_unlikely }
    }

    /// Isolates the article in an already built document.
    ///
    /// # Errors
    ///
    /// Returns an extraction error ([`ReadaloudError::NoContent`],
    /// [`ReadaloudError::NotReadable`] or [`ReadaloudError::EmptyArticle`])
    /// when no article body can be found.
    pub fn extract(&self, doc: &Document) -> Result<ParsedArticle> {
        let extracted = extract_content(doc, &self.config.extract_config())?;
        let metadata = doc.extract_metadata();

        tracing::debug!(
            title = metadata.title.as_deref().unwrap_or_default(),
            score = extracted.top_score,
            elements = extracted.element_count,
            "article extracted"
        );

        Ok(ParsedArticle::new(metadata, extracted.content, extracted.top_score))
    }

    /// Cleans and parses `html`, then extracts the article.
    pub fn parse(&self, html: &str) -> Result<ParsedArticle> {
        let doc = Document::parse_with_config(html, &self.preprocess_config(None))?;
        self.extract(&doc)
    }

    /// Like [`Readability::parse`], resolving relative links against `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ReadaloudError::InvalidUrl`] if the URL is invalid.
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<ParsedArticle> {
        let base_url = Url::parse(url).map_err(|e| ReadaloudError::InvalidUrl(e.to_string()))?;
        let doc = Document::parse_with_config(html, &self.preprocess_config(Some(base_url)))?;
        self.extract(&doc)
    }

    fn preprocess_config(&self, base_url: Option<Url>) -> PreprocessConfig {
        PreprocessConfig { remove_unlikely: self.config.remove_unlikely, base_url, ..Default::default() }
    }
}

/// [`Readability::parse`] with default settings.
pub fn parse(html: &str) -> Result<ParsedArticle> {
    Readability::new().parse(html)
}

/// [`Readability::parse_with_url`] with default settings.
pub fn parse_with_url(html: &str, url: &str) -> Result<ParsedArticle> {
    Readability::new().parse_with_url(html, url)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GARDEN_HTML: &str = r##"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <title>Winter Pruning Notes</title>
            <meta name="author" content="Sam Okafor">
        </head>
        <body>
            <nav><a href="/">Home</a><a href="/archive">Archive</a></nav>
            <article class="main-content">
                <h1>Winter Pruning Notes</h1>
                <p>Apple trees are pruned while dormant, when the branches are bare, the sap is low, and the shape of the tree is easy to read.</p>
                <p>Start with anything dead, diseased, or crossing, then thin the crown so that light and air can reach the fruiting spurs next summer.</p>
                <p>Stone fruit is the exception, since cherries and plums are prone to silver leaf and should be cut in a dry spell after flowering.</p>
                <p><a href="/tools">Our favourite loppers</a></p>
            </article>
            <footer>Copyright 2024</footer>
        </body>
        </html>
    "##;

    #[test]
    fn test_readability_config_default() {
        let config = ReadabilityConfig::default();
        assert_eq!((config.min_score, config.char_threshold, config.nb_top_candidates), (20.0, 500, 5));
        assert_eq!(config.max_elems_to_parse, 0);
        assert!(config.remove_unlikely && config.preserve_images);
        assert!(!config.keep_classes);
    }

    #[test]
    fn test_builder_feeds_extract_config() {
        let config = ReadabilityConfig::builder()
            .min_score(12.5)
            .char_threshold(300)
            .nb_top_candidates(3)
            .max_elems_to_parse(250)
            .remove_unlikely(false)
            .keep_classes(true)
            .preserve_images(false)
            .build();

        assert_eq!((config.min_score, config.char_threshold, config.nb_top_candidates), (12.5, 300, 3));
        assert!(!config.remove_unlikely && config.keep_classes && !config.preserve_images);

        let extract = config.extract_config();
        assert_eq!(extract.max_elements, 250);
        assert!(extract.postprocess.strip_images);
    }

    #[test]
    fn test_dom_builder_follows_config() {
        let reader = Readability::with_config(ReadabilityConfig::builder().remove_unlikely(false).build());
        assert!(!reader.dom_builder().remove_unlikely);
        assert_eq!(reader.config().min_score, 20.0);
    }

    #[test]
    fn test_parse_article() {
        let article = Readability::new().parse(GARDEN_HTML).unwrap();

        assert_eq!(article.title, "Winter Pruning Notes");
        assert_eq!(article.byline.as_deref(), Some("Sam Okafor"));
        assert_eq!(article.language.as_deref(), Some("en"));
        assert!(article.content_html.contains("silver leaf"));
        assert!(!article.content_html.contains("Archive"));
        assert!(!article.content_html.contains("Copyright"));
        assert!(!article.content_html.contains("loppers"));
        assert!(article.top_score >= 20.0);
    }

    #[test]
    fn test_parse_with_url_resolves_links() {
        let html = GARDEN_HTML.replace(
            "<p>Stone fruit is the exception",
            r#"<p>Our <a href="/guides/plums">plum guide</a> covers why stone fruit is the exception"#,
        );
        let article = parse_with_url(&html, "https://garden.example.org/notes/pruning").unwrap();
        assert!(article.content_html.contains("https://garden.example.org/guides/plums"));
    }

    #[test]
    fn test_parse_with_invalid_url() {
        let result = Readability::new().parse_with_url(GARDEN_HTML, "not a url");
        assert!(matches!(result, Err(ReadaloudError::InvalidUrl(_))));
    }

    #[test]
    fn test_min_score_rejects() {
        let reader = Readability::with_config(ReadabilityConfig::builder().min_score(10_000.0).build());
        assert!(matches!(reader.parse(GARDEN_HTML), Err(ReadaloudError::NotReadable { .. })));
    }

    #[test]
    fn test_free_parse_uses_defaults() {
        let article = parse(GARDEN_HTML).unwrap();
        assert!(article.content_html.contains("fruiting spurs"));
    }
}
