//! HTML parsing and DOM navigation.
//!
//! [`Document`] wraps a `scraper` tree together with the URL it was loaded
//! from. Trees are built by a [`DomBuilder`]; the default [`HtmlDomBuilder`]
//! decodes the raw bytes, cleans the markup and parses it with the same
//! error-recovering HTML5 algorithm browsers use, so malformed pages still
//! yield a best-effort tree.
//!
//! # Example
//!
//! ```rust
//! use readaloud_core::parse::Document;
//!
//! let html = r#"<html><body><h1>Title</h1><p class="content">Paragraph</p></body></html>"#;
//! let doc = Document::parse(html).unwrap();
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs[0].text(), "Paragraph");
//! ```

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::fetch::RawDocument;
use crate::preprocess::{PreprocessConfig, preprocess_html};
use crate::{ReadaloudError, Result};

/// Share of U+FFFD replacement characters tolerated when decoding a body
/// that is not valid UTF-8.
const MAX_REPLACEMENT_RATIO: f64 = 0.05;

/// Characters for bytes 0x80..=0x9F in windows-1252. Pages labelled
/// ISO-8859-1 are decoded with this table too, as browsers do. The five
/// bytes the code page leaves undefined map to the matching C1 control.
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

/// A parsed HTML document anchored to its source URL.
pub struct Document {
    html: Html,
    base_url: Option<Url>,
}

impl Document {
    /// Parses HTML from a string without cleaning it first.
    ///
    /// Never fails on malformed markup; the parser recovers the way a browser
    /// would.
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html, base_url: None })
    }

    /// Parses HTML after cleaning it with an explicit preprocessing config.
    pub fn parse_with_config(html: &str, config: &PreprocessConfig) -> Result<Self> {
        let cleaned = preprocess_html(html, config);
        let html = Html::parse_document(&cleaned);

        Ok(Self { html, base_url: config.base_url.clone() })
    }

    /// Parses an HTML fragment, such as an extracted article body.
    pub fn parse_fragment(html: &str) -> Self {
        Self { html: Html::parse_fragment(html), base_url: None }
    }

    /// The base URL relative links were resolved against, if any.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Gives up the wrapper for in-place tree edits.
    pub(crate) fn into_html(self) -> Html {
        self.html
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`ReadaloudError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = compile_selector(selector)?;
        Ok(self.html.select(&sel).map(|element| Element { element }).collect())
    }

    /// Text of the `<title>` element, if present.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>())
    }

    /// `lang` attribute of the root element.
    pub fn language(&self) -> Option<String> {
        self.html
            .root_element()
            .value()
            .attr("lang")
            .map(|lang| lang.trim().to_string())
            .filter(|lang| !lang.is_empty())
    }

    /// All text in the document.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }
}

fn compile_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ReadaloudError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// A single element in a [`Document`].
#[derive(Clone, Copy, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// The wrapped `scraper` element.
    pub fn element_ref(&self) -> ElementRef<'a> {
        self.element
    }

    /// HTML inside this element, excluding its own tags.
    pub fn inner_html(&self) -> String {
        self.element.inner_html()
    }

    /// HTML including this element's own tags.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Lowercase tag name.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Closest ancestor that is an element.
    pub fn parent(&self) -> Option<Element<'a>> {
        self.element
            .ancestors()
            .find_map(ElementRef::wrap)
            .map(|element| Element { element })
    }

    /// Whether both handles point at the same node of the same tree.
    pub fn is_same(&self, other: &Element<'_>) -> bool {
        self.element == other.element
    }

    /// Child elements, in document order.
    pub fn children(self) -> impl Iterator<Item = Element<'a>> {
        self.element.children().filter_map(ElementRef::wrap).map(|element| Element { element })
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`ReadaloudError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = compile_selector(selector)?;
        Ok(self.element.select(&sel).map(|element| Element { element }).collect())
    }
}

/// Turns a [`RawDocument`] into a navigable [`Document`].
pub trait DomBuilder: Send + Sync {
    /// Builds the tree, resolving relative links against `raw.url`.
    fn build(&self, raw: &RawDocument) -> Result<Document>;
}

/// Default [`DomBuilder`]: decode, clean, parse.
#[derive(Debug, Clone)]
pub struct HtmlDomBuilder {
    /// Whether to unwrap chrome-looking wrappers before parsing.
    pub remove_unlikely: bool,
}

impl Default for HtmlDomBuilder {
    fn default() -> Self {
        Self { remove_unlikely: true }
    }
}

impl DomBuilder for HtmlDomBuilder {
    fn build(&self, raw: &RawDocument) -> Result<Document> {
        let html = decode_body(&raw.body, raw.charset.as_deref())?;

        let config = PreprocessConfig {
            base_url: Some(raw.url.clone()),
            remove_unlikely: self.remove_unlikely,
            ..Default::default()
        };

        let doc = Document::parse_with_config(&html, &config)?;
        tracing::debug!(url = %raw.url, chars = html.len(), "document tree built");
        Ok(doc)
    }
}

/// Decodes a response body into text.
///
/// Empty or whitespace-only bodies are rejected with
/// [`ReadaloudError::HtmlParseError`]; binary bodies (NUL bytes, or mostly
/// undecodable bytes) with [`ReadaloudError::InvalidEncoding`]. Bodies that
/// are almost UTF-8 are decoded lossily.
pub fn decode_body(body: &[u8], charset: Option<&str>) -> Result<String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ReadaloudError::HtmlParseError("document is empty".to_string()));
    }

    if body.contains(&0) {
        return Err(ReadaloudError::InvalidEncoding);
    }

    let body = body.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(body);

    match std::str::from_utf8(body) {
        Ok(text) => Ok(text.to_string()),
        Err(_) if charset.is_some_and(is_latin1_label) => Ok(body.iter().map(|&b| decode_cp1252(b)).collect()),
        Err(_) => {
            let text = String::from_utf8_lossy(body);
            let total = text.chars().count();
            let replaced = text.chars().filter(|&c| c == char::REPLACEMENT_CHARACTER).count();

            if total == 0 || replaced as f64 / total as f64 > MAX_REPLACEMENT_RATIO {
                Err(ReadaloudError::InvalidEncoding)
            } else {
                tracing::debug!(replaced, "decoded body lossily");
                Ok(text.into_owned())
            }
        }
    }
}

fn decode_cp1252(byte: u8) -> char {
    match byte {
        0x80..=0x9F => CP1252_HIGH[usize::from(byte - 0x80)],
        _ => char::from(byte),
    }
}

fn is_latin1_label(label: &str) -> bool {
    matches!(
        label,
        "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "latin-1" | "l1" | "ascii" | "us-ascii" | "windows-1252" | "cp1252"
    )
}
