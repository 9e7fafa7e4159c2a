//! Cleanup of the extracted article fragment.
//!
//! Runs after the winning candidate is chosen, on its HTML alone. Removal of
//! whole elements happens on a parsed tree; the attribute and comment passes
//! are plain regex rewrites.

use std::sync::LazyLock;

use regex::Regex;

use crate::parse::Document;
use crate::scoring::{ScoreConfig, link_density};

static CONDITIONAL_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<!--\[if[^\]]*\]>.*?<!\[endif\]-->|<!--<!\[if[^\]]*\]>.*?<!\[endif\]-->"#).unwrap()
});

static IMG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"<img[^>]*>"#).unwrap());

static CLASS_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"\s+class=["'][^"']*["']"#).unwrap());

/// Containers dropped when they hold no text.
const EMPTY_CANDIDATE_TAGS: &[&str] = &[
    "div", "p", "span", "section", "article", "aside", "nav", "header", "footer",
];

/// Blocks checked for link density.
const LINK_DENSITY_TAGS: &[&str] = &["div", "p", "section", "article", "aside", "nav", "li"];

/// Elements that make a node worth keeping even without text.
const MEDIA_SELECTOR: &str = "img, picture, video, audio, iframe, object, embed, svg, canvas, hr";

/// Which cleanup passes run over the article fragment.
#[derive(Debug, Clone)]
pub struct PostProcessConfig {
    /// Drop containers left without text or media.
    pub remove_empty_nodes: bool,
    /// Drop blocks that are mostly links, such as inline "read next" lists.
    pub remove_high_link_density: bool,
    /// Link density above which a block counts as mostly links.
    pub max_link_density: f64,
    /// Drop `<!--[if IE]>` style blocks.
    pub remove_conditional_comments: bool,
    pub strip_images: bool,
    pub keep_classes: bool,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            remove_empty_nodes: true,
            remove_high_link_density: true,
            max_link_density: 0.5,
            remove_conditional_comments: true,
            strip_images: false,
            keep_classes: false,
        }
    }
}

/// Applies the enabled cleanup passes to an article fragment.
pub fn postprocess_html(html: &str, config: &PostProcessConfig) -> String {
    let mut processed = html.to_string();

    if config.remove_conditional_comments {
        processed = remove_conditional_comments(&processed);
    }

    if config.strip_images {
        processed = strip_images(&processed);
    }

    if config.remove_empty_nodes || config.remove_high_link_density {
        processed = prune_nodes(&processed, config);
    }

    if !config.keep_classes {
        processed = strip_classes(&processed);
    }

    processed
}

/// Removes `<!--[if ...]>...<![endif]-->` blocks along with their content.
fn remove_conditional_comments(html: &str) -> String {
    CONDITIONAL_COMMENT_RE.replace_all(html, "").to_string()
}

fn strip_images(html: &str) -> String {
    IMG_RE.replace_all(html, "").to_string()
}

fn strip_classes(html: &str) -> String {
    CLASS_ATTR_RE.replace_all(html, "").to_string()
}

/// Detach empty and link-dense blocks from the fragment tree.
///
/// A node is empty when it has no text besides whitespace and holds no
/// media. A block is link-dense when its link density is above
/// `max_link_density`.
fn prune_nodes(html: &str, config: &PostProcessConfig) -> String {
    let doc = Document::parse_fragment(html);
    let score_config = ScoreConfig::default();

    let doomed: Vec<_> = doc
        .select("*")
        .unwrap_or_default()
        .into_iter()
        .filter(|el| {
            let tag = el.tag_name();
            let empty = config.remove_empty_nodes
                && EMPTY_CANDIDATE_TAGS.contains(&tag.as_str())
                && el.text().trim().is_empty()
                && el.select(MEDIA_SELECTOR).unwrap_or_default().is_empty();
            let link_dense = config.remove_high_link_density
                && LINK_DENSITY_TAGS.contains(&tag.as_str())
                && link_density(el, &score_config) > config.max_link_density;
            empty || link_dense
        })
        .map(|el| el.element_ref().id())
        .collect();

    if doomed.is_empty() {
        return html.to_string();
    }
    tracing::trace!(removed = doomed.len(), "pruning fragment nodes");

    let mut tree = doc.into_html();
    for id in doomed {
        if let Some(mut node) = tree.tree.get_mut(id) {
            node.detach();
        }
    }

    tree.root_element().inner_html()
}
