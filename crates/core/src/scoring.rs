use std::sync::LazyLock;

use crate::parse::Element;
use regex::Regex;

/// Class/id fragments that suggest an element holds the article.
static POSITIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(article|body|content|entry|hentry|h-entry|main|page|pagination|post|text|blog|story)").unwrap()
});

/// Class/id fragments that suggest page chrome.
static NEGATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(-ad-|hidden|^hid$| hid$| hid |^hid |banner|combx|comment|com-|contact|footer|gdpr|masthead|media|meta|outbrain|promo|related|scroll|share|shoutbox|sidebar|skyscraper|sponsor|shopping|tags|widget)",
    )
    .unwrap()
});

/// Weights used when scoring candidate blocks.
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Weight added per positive class or id match
    pub positive_weight: f64,
    /// Weight added per negative class or id match
    pub negative_weight: f64,
    /// Maximum content density score from character count
    pub max_char_density_score: f64,
    /// Maximum content density score from comma count
    pub max_comma_density_score: f64,
    /// Characters per point for content density scoring
    pub chars_per_point: usize,
    /// Weight of fragment links (`href="#..."`) in link density
    pub hash_link_weight: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            positive_weight: 25.0,
            negative_weight: -25.0,
            max_char_density_score: 3.0,
            max_comma_density_score: 3.0,
            chars_per_point: 100,
            hash_link_weight: 0.3,
        }
    }
}

/// Score of one element, with the parts that made it up.
#[derive(Debug, Clone)]
pub struct ScoreResult {
    pub tag_name: String,
    /// Base score from tag type
    pub base_score: f64,
    /// Weight adjustment from class/ID patterns
    pub class_weight: f64,
    /// Score from text length and comma count
    pub content_density: f64,
    /// Link density (0.0 to 1.0)
    pub link_density: f64,
    pub final_score: f64,
}

/// Base score by tag: how likely this kind of element is to wrap the article.
pub fn base_tag_score(element: &Element<'_>) -> f64 {
    match element.tag_name().as_str() {
        "article" => 10.0,
        "section" => 8.0,
        "div" | "main" => 5.0,
        "td" | "blockquote" => 3.0,
        "pre" => 0.0,
        "form" => -3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" | "header" | "footer" | "nav" => -5.0,
        _ => 0.0,
    }
}

/// Class and id each contribute independently: a positive match adds
/// `positive_weight`, a negative match adds `negative_weight`.
pub fn class_id_weight(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    let mut weight = 0.0;

    for value in [element.attr("class"), element.attr("id")].into_iter().flatten() {
        if value.trim().is_empty() {
            continue;
        }
        if NEGATIVE_RE.is_match(value) {
            weight += config.negative_weight;
        }
        if POSITIVE_RE.is_match(value) {
            weight += config.positive_weight;
        }
    }

    weight
}

/// Points for text length (one per `chars_per_point`) and commas, each capped.
pub fn content_density_score(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    let text = element.text();
    let char_score = ((text.chars().count() / config.chars_per_point) as f64).min(config.max_char_density_score);
    let comma_count = text.chars().filter(|c| matches!(c, ',' | '，')).count();
    let comma_score = (comma_count as f64).min(config.max_comma_density_score);

    char_score + comma_score
}

/// Share of the element's text that sits inside links, from 0.0 to 1.0.
///
/// Links pointing at a fragment of the same page count at
/// `hash_link_weight` of their length.
pub fn link_density(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    let text_length = normalized_len(&element.text());

    if text_length == 0 {
        return 0.0;
    }

    let link_text_length: f64 = element
        .select("a")
        .unwrap_or_default()
        .iter()
        .map(|link| {
            let len = normalized_len(&link.text()) as f64;
            let is_hash = link.attr("href").is_some_and(|href| href.starts_with('#'));
            if is_hash { len * config.hash_link_weight } else { len }
        })
        .sum();

    (link_text_length / text_length as f64).min(1.0)
}

/// Character count with whitespace runs collapsed to one space.
pub(crate) fn normalized_len(text: &str) -> usize {
    let mut len = 0;
    for (i, word) in text.split_whitespace().enumerate() {
        len += word.chars().count() + usize::from(i > 0);
    }
    len
}

/// Heuristic for `<pre>` blocks that hold source code rather than prose.
fn looks_like_code(text: &str) -> bool {
    let len = text.chars().count();
    if len <= 50 {
        return false;
    }

    let len = len as f64;
    let comma_ratio = text.matches(',').count() as f64 / len;
    let space_ratio = text.matches(' ').count() as f64 / len;
    let special_ratio = text
        .chars()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
        .count() as f64
        / len;

    special_ratio > 0.15 && comma_ratio < 0.01 && space_ratio < 0.15
}

/// Score an element as an article candidate.
///
/// `(base + class weight + density + code penalty) * link penalty`, where the
/// link penalty is `1 - link_density`, halved for elements with a positive
/// class/id or more than 500 characters of text.
pub fn calculate_score(element: &Element<'_>, config: &ScoreConfig) -> ScoreResult {
    let tag_name = element.tag_name();

    let base_score = base_tag_score(element);
    let class_weight = class_id_weight(element, config);
    let content_density = content_density_score(element, config);
    let ld = link_density(element, config);

    let text = element.text();
    let code_penalty = if tag_name == "pre" && looks_like_code(&text) { -10.0 } else { 0.0 };

    let is_content_rich = text.chars().count() > 500;
    let link_penalty = if class_weight > 0.0 || is_content_rich { 1.0 - (ld * 0.5) } else { 1.0 - ld };

    let final_score = (base_score + class_weight + content_density + code_penalty) * link_penalty;

    ScoreResult { tag_name, base_score, class_weight, content_density, link_density: ld, final_score }
}
