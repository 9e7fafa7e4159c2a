//! Candidate scoring and selection of the article body.
//!
//! Every block that could wrap the article is scored, paragraph scores flow
//! up to their parent and grandparent, and the best container wins. Close
//! relatives of the winner that look like prose are pulled in with it.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::parse::{Document, Element};
use crate::postprocess::{PostProcessConfig, postprocess_html};
use crate::scoring::{ScoreConfig, ScoreResult, calculate_score, link_density, normalized_len};
use crate::{ReadaloudError, Result};

/// Tuning knobs for [`extract_content`].
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// The winner must score at least this much.
    pub min_score_threshold: f64,
    /// How many of the best candidates survive ranking.
    pub max_top_candidates: usize,
    /// Paragraph-level blocks shorter than a tenth of this are ignored.
    pub char_threshold: usize,
    /// Cap on scanned elements; 0 scans all of them.
    pub max_elements: usize,
    /// Fraction of the winning score a sibling needs to be kept.
    pub sibling_threshold: f64,
    pub postprocess: PostProcessConfig,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_score_threshold: 20.0,
            max_top_candidates: 5,
            char_threshold: 500,
            max_elements: 0,
            sibling_threshold: 0.2,
            postprocess: PostProcessConfig::default(),
        }
    }
}

/// An element together with its running score.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub element: Element<'a>,
    pub score_result: ScoreResult,
}

#[derive(Debug, Clone)]
pub struct ExtractedContent {
    /// Article body after cleanup.
    pub content: String,
    pub top_score: f64,
    /// The winner plus every sibling that joined it.
    pub element_count: usize,
}

impl<'a> Candidate<'a> {
    fn new(element: Element<'a>, score_result: ScoreResult) -> Self {
        Self { element, score_result }
    }

    fn score(&self) -> f64 {
        self.score_result.final_score
    }
}

/// Blocks that may wrap the article, as one selector so matches come back in
/// document order.
const CANDIDATE_SELECTOR: &str = "div, article, section, main, p, td, pre, blockquote";

/// Paragraph-level candidates; only these pass score up to their ancestors.
const PROPAGATING_TAGS: &[&str] = &["p", "pre", "td", "blockquote"];

/// Scores candidate blocks in document order, skipping paragraph-level ones
/// that are too short to matter. At most `max_elements` blocks are looked at
/// when it is non-zero.
fn identify_candidates<'a>(
    doc: &'a Document, config: &ExtractConfig, score_config: &ScoreConfig,
) -> Vec<Candidate<'a>> {
    let limit = if config.max_elements == 0 { usize::MAX } else { config.max_elements };
    let min_len = config.char_threshold / 10;

    doc.select(CANDIDATE_SELECTOR)
        .unwrap_or_default()
        .into_iter()
        .take(limit)
        .filter(|element| {
            matches!(element.tag_name().as_str(), "article" | "section" | "main")
                || element.text().chars().count() >= min_len
        })
        .map(|element| {
            let score_result = calculate_score(&element, score_config);
            Candidate::new(element, score_result)
        })
        .collect()
}

/// Propagate paragraph scores to their ancestors.
///
/// The parent gains `score / 2` and the grandparent `score / 3`, following
/// the actual tree. Ancestors that were not candidates yet are scored and
/// added; contributions from several children accumulate.
fn propagate_scores<'a>(candidates: &mut Vec<Candidate<'a>>, score_config: &ScoreConfig) {
    let mut index: HashMap<_, usize> = candidates
        .iter()
        .enumerate()
        .map(|(i, candidate)| (candidate.element.element_ref().id(), i))
        .collect();

    let sources: Vec<(Element<'a>, f64)> = candidates
        .iter()
        .filter(|candidate| PROPAGATING_TAGS.contains(&candidate.element.tag_name().as_str()))
        .map(|candidate| (candidate.element, candidate.score()))
        .collect();

    for (element, score) in sources {
        let mut ancestor = element.parent();
        for divider in [2.0, 3.0] {
            let Some(node) = ancestor else { break };

            let i = *index.entry(node.element_ref().id()).or_insert_with(|| {
                candidates.push(Candidate::new(node, calculate_score(&node, score_config)));
                candidates.len() - 1
            });
            candidates[i].score_result.final_score += score / divider;

            ancestor = node.parent();
        }
    }
}

/// Returns the best candidate, or an error when there is none or it scores
/// below the threshold. Expects `candidates` sorted best first.
///
/// A winner that misses the threshold is still taken when it reaches half of
/// it and carries at least `char_threshold / 2` characters of paragraph prose.
/// Unmarked `<main>` or `<div>` articles land here; menus and footers do not.
fn select_top_candidate<'a, 'b>(
    candidates: &'b [Candidate<'a>], config: &ExtractConfig, score_config: &ScoreConfig,
) -> Result<&'b Candidate<'a>> {
    let top_candidate = candidates.first().ok_or(ReadaloudError::NoContent)?;
    let score = top_candidate.score();

    if score < config.min_score_threshold {
        let prose = prose_len(&top_candidate.element, config, score_config);
        if score < config.min_score_threshold / 2.0 || prose < config.char_threshold / 2 {
            return Err(ReadaloudError::NotReadable { score, threshold: config.min_score_threshold });
        }
        tracing::debug!(score, prose, "accepting prose-rich candidate below min score");
    }

    Ok(top_candidate)
}

/// Characters of paragraph text in `element`, counting only paragraphs long
/// enough to be candidates and mostly free of links.
fn prose_len(element: &Element<'_>, config: &ExtractConfig, score_config: &ScoreConfig) -> usize {
    let paragraphs = if element.tag_name() == "p" { vec![*element] } else { element.select("p").unwrap_or_default() };

    paragraphs
        .iter()
        .filter(|p| link_density(p, score_config) < 0.25)
        .map(|p| normalized_len(&p.text()))
        .filter(|&len| len >= config.char_threshold / 10)
        .sum()
}

/// Children of the winner's parent that belong to the article too.
///
/// A sibling needs `sibling_threshold` of the winning score. Paragraphs must
/// also be longer than 80 characters and have a link density under 0.25.
/// A `<header>` beside the winner is kept when it has some text.
fn select_siblings<'a>(
    top_candidate: &Candidate<'a>, candidates: &[Candidate<'a>], config: &ExtractConfig, score_config: &ScoreConfig,
) -> Vec<Element<'a>> {
    let mut siblings = Vec::new();
    let Some(parent) = top_candidate.element.parent() else {
        return siblings;
    };
    let threshold = top_candidate.score() * config.sibling_threshold;

    for candidate in candidates {
        if candidate.element.is_same(&top_candidate.element) || candidate.score() < threshold {
            continue;
        }
        if !candidate.element.parent().is_some_and(|p| p.is_same(&parent)) {
            continue;
        }
        if candidate.element.tag_name() == "p" {
            let text_len = candidate.element.text().chars().count();
            if text_len <= 80 || link_density(&candidate.element, score_config) >= 0.25 {
                continue;
            }
        }
        siblings.push(candidate.element);
    }

    for header in parent.children().filter(|child| child.tag_name() == "header") {
        if header.is_same(&top_candidate.element) || header.text().trim().chars().count() < 10 {
            continue;
        }
        if !siblings.iter().any(|s| s.is_same(&header)) {
            siblings.push(header);
        }
    }

    siblings
}

/// Joins the top candidate and its siblings in document order.
fn assemble_content(top_candidate: &Candidate<'_>, siblings: &[Element<'_>]) -> String {
    let top = &top_candidate.element;
    let parent = match top.parent() {
        Some(parent) if !siblings.is_empty() => parent,
        _ => return top.outer_html(),
    };

    parent
        .children()
        .filter(|child| child.is_same(top) || siblings.iter().any(|s| s.is_same(child)))
        .map(|child| child.outer_html())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Finds the article body of `doc` and returns it as cleaned HTML.
///
/// # Errors
///
/// [`ReadaloudError::NoContent`] when nothing qualifies as a candidate,
/// [`ReadaloudError::NotReadable`] when the best candidate is below
/// `min_score_threshold` and [`ReadaloudError::EmptyArticle`] when no text
/// survives post-processing.
pub fn extract_content(doc: &Document, config: &ExtractConfig) -> Result<ExtractedContent> {
    let score_config = ScoreConfig::default();

    let mut candidates = identify_candidates(doc, config, &score_config);
    propagate_scores(&mut candidates, &score_config);

    candidates.sort_by(|a, b| compare_candidates(b, a));
    candidates.truncate(config.max_top_candidates.max(1));

    let top_candidate = select_top_candidate(&candidates, config, &score_config)?;
    tracing::debug!(
        tag = %top_candidate.element.tag_name(),
        score = top_candidate.score(),
        "top candidate selected"
    );

    let siblings = select_siblings(top_candidate, &candidates, config, &score_config);
    let content = postprocess_html(&assemble_content(top_candidate, &siblings), &config.postprocess);

    if Document::parse_fragment(&content).text_content().trim().is_empty() {
        return Err(ReadaloudError::EmptyArticle);
    }

    Ok(ExtractedContent { content, top_score: top_candidate.score(), element_count: 1 + siblings.len() })
}

fn compare_candidates(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    let score_order = a.score().partial_cmp(&b.score()).unwrap_or(Ordering::Equal);
    if score_order != Ordering::Equal {
        return score_order;
    }

    let tag_order = candidate_priority(&a.element.tag_name()).cmp(&candidate_priority(&b.element.tag_name()));
    if tag_order != Ordering::Equal {
        return tag_order;
    }

    let a_len = a.element.text().chars().count();
    let b_len = b.element.text().chars().count();
    a_len.cmp(&b_len)
}

fn candidate_priority(tag_name: &str) -> u8 {
    match tag_name {
        "article" | "main" | "section" => 3,
        "div" => 2,
        _ => 1,
    }
}
