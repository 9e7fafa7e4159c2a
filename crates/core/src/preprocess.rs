use std::sync::LazyLock;

use lol_html::html_content::Element;
use lol_html::{HtmlRewriter, Settings, doc_comments, element};
use regex::Regex;
use url::Url;

/// Class/id fragments of page chrome that rarely wraps the article.
static UNLIKELY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(-ad-|ai2html|banner|breadcrumbs?|combx|comment|community|cover-wrap|disqus|extra|foot|gdpr|header|legends|menu|related|remark|replies|rss|shoutbox|sidebar|skyscraper|social|sponsor|supplemental|ad-break|agegate|pagination|pager|popup|yom-remote)",
    )
    .unwrap()
});

/// Fragments that rescue an element matching [`UNLIKELY_RE`].
static MAYBE_CANDIDATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(and|article|body|column|content|main|shadow)").unwrap());

static HIDDEN_STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(display\s*:\s*none|visibility\s*:\s*hidden)").unwrap());

/// Tags that never carry readable prose.
const NON_CONTENT_TAGS: &[&str] = &["style", "noscript", "iframe", "svg", "canvas", "template", "object", "embed"];

/// Tags the unlikely-candidate pass must never unwrap.
const PROTECTED_TAGS: &[&str] = &["html", "body", "article", "main", "a"];

/// Which cleanup passes run before the tree is built.
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Remove scripts (JSON-LD metadata blocks are kept)
    pub remove_scripts: bool,
    /// Remove style, noscript, iframe, svg, canvas and other non-content tags
    pub remove_non_content: bool,
    /// Remove comments
    pub remove_comments: bool,
    /// Unwrap elements whose class/id marks them as page chrome
    pub remove_unlikely: bool,
    /// Remove elements hidden by inline style or the `hidden` attribute
    pub remove_hidden: bool,
    /// Relative `href`/`src` values are rewritten against this URL.
    pub base_url: Option<Url>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            remove_scripts: true,
            remove_non_content: true,
            remove_comments: true,
            remove_unlikely: true,
            remove_hidden: true,
            base_url: None,
        }
    }
}

/// Clean raw markup in a single streaming pass before it is parsed into a tree.
///
/// Malformed markup is tolerated: if the rewriter rejects the input the
/// original string is returned unchanged and the tree builder gets to recover
/// from it instead.
pub fn preprocess_html(html: &str, config: &PreprocessConfig) -> String {
    let mut handlers = Vec::new();

    if config.remove_scripts {
        handlers.push(element!("script", |el| {
            let is_json_ld = el
                .get_attribute("type")
                .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"));
            if !is_json_ld {
                el.remove();
            }
            Ok(())
        }));
    }

    if config.remove_non_content {
        for tag in NON_CONTENT_TAGS {
            handlers.push(element!(tag, |el| {
                el.remove();
                Ok(())
            }));
        }
    }

    if config.remove_hidden || config.remove_unlikely {
        let (remove_hidden, remove_unlikely) = (config.remove_hidden, config.remove_unlikely);
        handlers.push(element!("*", move |el| {
            if el.removed() {
                return Ok(());
            }
            if remove_hidden && is_hidden(el) {
                el.remove();
            } else if remove_unlikely && is_unlikely_candidate(el) {
                el.remove_and_keep_content();
            }
            Ok(())
        }));
    }

    if let Some(base_url) = &config.base_url {
        for selector in ["a[href]", "link[href]"] {
            handlers.push(element!(selector, move |el| {
                absolutize(el, "href", base_url);
                Ok(())
            }));
        }
        handlers.push(element!("img[src]", move |el| {
            absolutize(el, "src", base_url);
            Ok(())
        }));
    }

    let mut document_handlers = Vec::new();
    if config.remove_comments {
        document_handlers.push(doc_comments!(|c| {
            c.remove();
            Ok(())
        }));
    }

    if handlers.is_empty() && document_handlers.is_empty() {
        return html.to_string();
    }

    let mut output = Vec::with_capacity(html.len());
    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: handlers,
            document_content_handlers: document_handlers,
            ..Default::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    if let Err(err) = rewriter.write(html.as_bytes()) {
        tracing::debug!(error = %err, "preprocess rewrite failed, using raw markup");
        return html.to_string();
    }
    if let Err(err) = rewriter.end() {
        tracing::debug!(error = %err, "preprocess rewrite failed, using raw markup");
        return html.to_string();
    }

    if output.is_empty() { html.to_string() } else { String::from_utf8_lossy(&output).into_owned() }
}

fn is_hidden(el: &Element<'_, '_>) -> bool {
    if el.has_attribute("hidden") {
        return true;
    }
    el.get_attribute("style").is_some_and(|style| HIDDEN_STYLE_RE.is_match(&style))
}

fn is_unlikely_candidate(el: &Element<'_, '_>) -> bool {
    let tag = el.tag_name();
    if PROTECTED_TAGS.contains(&tag.as_str()) {
        return false;
    }

    let class = el.get_attribute("class").unwrap_or_default();
    let id = el.get_attribute("id").unwrap_or_default();
    let match_string = format!("{} {}", class, id);

    if match_string.trim().is_empty() {
        return false;
    }

    UNLIKELY_RE.is_match(&match_string) && !MAYBE_CANDIDATE_RE.is_match(&match_string)
}

fn absolutize(el: &mut Element<'_, '_>, attr: &str, base_url: &Url) {
    if let Some(value) = el.get_attribute(attr)
        && let Ok(absolute) = base_url.join(value.trim())
        && el.set_attribute(attr, absolute.as_str()).is_err()
    {
        tracing::trace!(attr, "could not rewrite attribute");
    }
}
