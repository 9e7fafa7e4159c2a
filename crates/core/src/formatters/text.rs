//! HTML fragment to plain text.
//!
//! The flattener walks the fragment tree once and applies a fixed rule per
//! element: block elements start new lines, paragraphs and headings are set
//! apart by a blank line, links keep only their text and images are dropped.
//! Inline whitespace collapses to a single space the way a browser renders it.

use scraper::{ElementRef, Html, Node};

/// Elements whose content is never read aloud.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "title", "iframe", "svg", "canvas", "object", "embed",
    "button", "select", "input", "textarea",
];

/// Blocks set apart from their neighbours by one line break.
const BLOCK_TAGS: &[&str] = &[
    "div",
    "article",
    "section",
    "header",
    "footer",
    "main",
    "aside",
    "nav",
    "figure",
    "figcaption",
    "address",
    "details",
    "summary",
    "dl",
    "dt",
    "dd",
    "form",
    "fieldset",
    "center",
];

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Nesting depth below which elements lose their formatting and contribute
/// only their text. Keeps the recursive walk off the end of the stack.
const MAX_DEPTH: usize = 128;

const HR_WIDTH: usize = 40;

/// Per-element rules for plain text output
#[derive(Debug, Clone)]
pub struct TextConfig {
    /// Reflow lines at this width (`None` = no wrapping)
    pub word_wrap: Option<usize>,

    /// Uppercase `h2` to `h6` text
    pub uppercase_headings: bool,

    /// Uppercase `h1` text
    pub uppercase_h1: bool,

    /// Append ` [href]` after link text
    pub link_targets: bool,

    /// Drop images entirely; otherwise their `alt` text is kept
    pub skip_images: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self { word_wrap: None, uppercase_headings: true, uppercase_h1: false, link_targets: false, skip_images: true }
    }
}

/// Plain text formatter for converting HTML to readable plain text
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    config: TextConfig,
}

impl TextFormatter {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TextConfig {
        &self.config
    }

    /// Convert HTML content to plain text
    pub fn convert(&self, html: &str) -> String {
        flatten_with_config(html, &self.config)
    }
}

/// Flattens an HTML fragment with the default rules.
///
/// # Example
///
/// ```rust
/// use readaloud_core::flatten;
///
/// let text = flatten(r#"<h1>Intro</h1><p>Read <a href="https://example.com">this</a>.<img src="x.png"></p>"#);
/// assert_eq!(text, "Intro\n\nRead this.");
/// ```
pub fn flatten(html: &str) -> String {
    flatten_with_config(html, &TextConfig::default())
}

/// Flattens an HTML fragment with explicit rules.
pub fn flatten_with_config(html: &str, config: &TextConfig) -> String {
    let fragment = Html::parse_fragment(html);
    let mut flattener = Flattener::new(config);
    flattener.children(fragment.root_element());
    let text = flattener.finish();

    match config.word_wrap {
        Some(width) if width > 0 => wrap_text(&text, width),
        _ => text,
    }
}

/// Accumulates output for one level of nesting.
///
/// Block content is rendered by a fresh `Flattener` and then placed here as
/// a unit, which keeps prefixes (quotes, list markers) a matter of rewriting
/// the lines of a finished string.
struct Flattener<'c> {
    config: &'c TextConfig,
    out: String,
    /// Inline text not yet placed in `out`.
    line: String,
    pending_space: bool,
    /// Line breaks owed before the next piece of output.
    breaks: usize,
    /// Element nesting level of the walk, carried into nested renders.
    depth: usize,
}

impl<'c> Flattener<'c> {
    fn new(config: &'c TextConfig) -> Self {
        Self::at_depth(config, 0)
    }

    fn at_depth(config: &'c TextConfig, depth: usize) -> Self {
        Self { config, out: String::new(), line: String::new(), pending_space: false, breaks: 0, depth }
    }

    fn children(&mut self, el: ElementRef<'_>) {
        for child in el.children() {
            match child.value() {
                Node::Text(text) => self.text(&text.text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.depth += 1;
                        self.element(child);
                        self.depth -= 1;
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, el: ElementRef<'_>) {
        let tag = el.value().name();

        if self.depth > MAX_DEPTH {
            if !SKIPPED_TAGS.contains(&tag) {
                let text: String = el.text().collect();
                self.text(&text);
            }
            return;
        }

        match tag {
            t if SKIPPED_TAGS.contains(&t) => {}
            "img" => {
                if !self.config.skip_images
                    && let Some(alt) = el.value().attr("alt")
                {
                    self.text(alt);
                }
            }
            "br" => self.hard_break(),
            "a" => {
                self.children(el);
                if self.config.link_targets
                    && let Some(href) = el.value().attr("href").map(str::trim)
                    && !href.is_empty()
                    && !href.starts_with('#')
                {
                    self.text(&format!(" [{}]", href));
                }
            }
            t if HEADING_TAGS.contains(&t) => {
                let upper = if t == "h1" { self.config.uppercase_h1 } else { self.config.uppercase_headings };
                let text = self.render(el);
                let text = if upper { text.to_uppercase() } else { text };
                self.block(&text, 2);
            }
            "p" => {
                let text = self.render(el);
                self.block(&text, 2);
            }
            "blockquote" => {
                let text = self.render(el);
                self.block(&prefix_lines(&text, "> "), 2);
            }
            "pre" => {
                let raw: String = el.text().collect();
                self.block(raw.trim_matches('\n').trim_end(), 2);
            }
            "ul" | "ol" => {
                let nested = el.parent().and_then(ElementRef::wrap).is_some_and(|p| p.value().name() == "li");
                let list = self.list(el, tag == "ol");
                self.block(&list, if nested { 1 } else { 2 });
            }
            "li" => {
                let text = self.render(el);
                self.block(&prefix_item(&text, " * "), 1);
            }
            "table" => {
                let table = self.table(el);
                self.block(&table, 2);
            }
            "hr" => self.block(&"-".repeat(HR_WIDTH), 2),
            t if BLOCK_TAGS.contains(&t) => {
                let text = self.render(el);
                self.block(&text, 1);
            }
            _ => self.children(el),
        }
    }

    /// Renders an element's children on their own.
    fn render(&self, el: ElementRef<'_>) -> String {
        let mut inner = Flattener::at_depth(self.config, self.depth);
        inner.children(el);
        inner.finish()
    }

    fn text(&mut self, text: &str) {
        for c in text.chars() {
            if c.is_whitespace() {
                self.pending_space = true;
                continue;
            }
            if self.pending_space && !self.line.is_empty() && !self.line.ends_with('\n') {
                self.line.push(' ');
            }
            self.pending_space = false;
            self.line.push(c);
        }
    }

    fn hard_break(&mut self) {
        self.line.push('\n');
        self.pending_space = false;
    }

    /// Places a finished block, separated from what came before by at least
    /// `breaks` line breaks.
    fn block(&mut self, content: &str, breaks: usize) {
        self.flush_line();
        if content.trim().is_empty() {
            return;
        }
        self.emit(content, breaks);
        self.breaks = breaks;
    }

    fn flush_line(&mut self) {
        let line = std::mem::take(&mut self.line);
        self.pending_space = false;
        let line = line.trim_matches('\n');
        if !line.is_empty() {
            self.emit(line, 0);
            self.breaks = 0;
        }
    }

    fn emit(&mut self, content: &str, breaks: usize) {
        if !self.out.is_empty() {
            let breaks = self.breaks.max(breaks).max(1);
            self.out.extend(std::iter::repeat_n('\n', breaks));
        }
        self.out.push_str(content);
    }

    fn list(&self, el: ElementRef<'_>, ordered: bool) -> String {
        let start = el
            .value()
            .attr("start")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|_| ordered)
            .unwrap_or(1);

        el.children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "li")
            .enumerate()
            .map(|(i, item)| {
                let marker = if ordered { format!("{}. ", start + i) } else { " * ".to_string() };
                prefix_item(&self.render(item), &marker)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn table(&self, el: ElementRef<'_>) -> String {
        el.descendants()
            .filter_map(ElementRef::wrap)
            .filter(|row| row.value().name() == "tr")
            .map(|row| {
                row.children()
                    .filter_map(ElementRef::wrap)
                    .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                    .map(|cell| self.render(cell).split_whitespace().collect::<Vec<_>>().join(" "))
                    .collect::<Vec<_>>()
                    .join("   ")
            })
            .map(|row| row.trim_end().to_string())
            .filter(|row| !row.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn finish(mut self) -> String {
        self.flush_line();
        let text = self.out.lines().map(str::trim_end).collect::<Vec<_>>().join("\n");
        text.trim_matches('\n').to_string()
    }
}

/// Prefixes every line; empty lines get the prefix without trailing space.
fn prefix_lines(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| if line.is_empty() { prefix.trim_end().to_string() } else { format!("{}{}", prefix, line) })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Puts `marker` before the first line and indents the rest to match.
fn prefix_item(text: &str, marker: &str) -> String {
    let indent = " ".repeat(marker.chars().count());
    text.lines()
        .enumerate()
        .map(|(i, line)| match (i, line.is_empty()) {
            (0, _) => format!("{}{}", marker, line),
            (_, true) => String::new(),
            _ => format!("{}{}", indent, line),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap text to specified line width, keeping existing line breaks
fn wrap_text(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }

    text.lines()
        .map(|line| {
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.is_empty() { String::new() } else { wrap_words(&words, width) }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap a slice of words to specified width
fn wrap_words(words: &[&str], width: usize) -> String {
    let mut lines = Vec::new();
    let mut current_line = Vec::new();
    let mut current_length = 0;

    for &word in words {
        let word_len = word.chars().count();

        if current_length == 0 {
            current_line.push(word);
            current_length = word_len;
        } else if current_length + 1 + word_len <= width {
            current_length += 1 + word_len;
            current_line.push(word);
        } else {
            lines.push(current_line.join(" "));
            current_line = vec![word];
            current_length = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line.join(" "));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_paragraphs_separated_by_blank_line() {
        let html = r#"
            <p>First paragraph with some content.</p>
            <p>Second paragraph with more content.</p>
        "#;

        assert_eq!(flatten(html), "First paragraph with some content.\n\nSecond paragraph with more content.");
    }

    #[test]
    fn test_inline_tags_and_whitespace_collapse() {
        let html = "<p>Text   with <strong>bold</strong>\n and <em>italic</em>.</p>";
        assert_eq!(flatten(html), "Text with bold and italic.");
    }

    #[test]
    fn test_links_keep_text_only() {
        let html = r#"<img src="x.png">Caption <a href="http://x">click</a>"#;
        let text = flatten(html);

        assert_eq!(text, "Caption click");
        assert!(!text.contains("http://x"));
        assert!(!text.contains("x.png"));
    }

    #[test]
    fn test_link_targets_when_enabled() {
        let config = TextConfig { link_targets: true, ..Default::default() };
        let text = flatten_with_config(r##"<p><a href="http://x">click</a> <a href="#top">top</a></p>"##, &config);
        assert_eq!(text, "click [http://x] top");
    }

    #[test]
    fn test_image_alt_when_not_skipped() {
        let config = TextConfig { skip_images: false, ..Default::default() };
        assert_eq!(flatten_with_config(r#"<p>A <img src="c.png" alt="cat"> sat</p>"#, &config), "A cat sat");
    }

    #[test]
    fn test_h1_keeps_case_other_headings_uppercase() {
        let html = "<h1>Main Title</h1><h2>Section Two</h2><p>Body.</p>";
        assert_eq!(flatten(html), "Main Title\n\nSECTION TWO\n\nBody.");
    }

    #[test]
    fn test_divs_separated_by_single_newline() {
        let html = "<div>One</div><div>Two</div><p>Three</p>";
        assert_eq!(flatten(html), "One\nTwo\n\nThree");
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(flatten("<p>Line one<br>Line two<br/>  Line three</p>"), "Line one\nLine two\nLine three");
    }

    #[rstest]
    #[case("<ul><li>First</li><li>Second</li></ul>", " * First\n * Second")]
    #[case("<ol><li>First</li><li>Second</li></ol>", "1. First\n2. Second")]
    #[case(r#"<ol start="3"><li>Third</li><li>Fourth</li></ol>"#, "3. Third\n4. Fourth")]
    #[case("<ul><li>Outer<ul><li>Inner</li></ul></li></ul>", " * Outer\n    * Inner")]
    fn test_lists(#[case] html: &str, #[case] expected: &str) {
        assert_eq!(flatten(html), expected);
    }

    #[test]
    fn test_blockquote_prefix() {
        let html = "<p>Intro.</p><blockquote><p>Quoted one.</p><p>Quoted two.</p></blockquote>";
        assert_eq!(flatten(html), "Intro.\n\n> Quoted one.\n>\n> Quoted two.");
    }

    #[test]
    fn test_pre_keeps_whitespace() {
        let html = "<p>Code:</p><pre>fn main() {\n    println!(\"hi\");\n}\n</pre>";
        assert_eq!(flatten(html), "Code:\n\nfn main() {\n    println!(\"hi\");\n}");
    }

    #[test]
    fn test_table_rows() {
        let html = "<table><tr><th>Name</th><th>Age</th></tr><tr><td>Ada</td><td>36</td></tr></table>";
        assert_eq!(flatten(html), "Name   Age\nAda   36");
    }

    #[test]
    fn test_horizontal_rule() {
        let text = flatten("<p>Above</p><hr><p>Below</p>");
        assert_eq!(text, format!("Above\n\n{}\n\nBelow", "-".repeat(40)));
    }

    #[test]
    fn test_skips_non_content() {
        let html = "<p>Visible</p><script>var x = 1;</script><style>p{}</style>";
        assert_eq!(flatten(html), "Visible");
    }

    #[test]
    fn test_deeply_nested_inline_tags() {
        let depth = 20_000;
        let html = format!("<p>{}deep{}</p>", "<b>".repeat(depth), "</b>".repeat(depth));
        assert_eq!(flatten(&html), "deep");
    }

    #[test]
    fn test_formatting_kept_up_to_depth_limit() {
        let html = format!("{}<ul><li>one</li></ul>{}", "<div>".repeat(100), "</div>".repeat(100));
        assert_eq!(flatten(&html), " * one");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(flatten(""), "");
        assert_eq!(flatten("<div>  </div><p></p>"), "");
    }

    #[test]
    fn test_word_wrap() {
        let config = TextConfig { word_wrap: Some(20), ..Default::default() };
        let text = flatten_with_config(
            "<p>This is a long line that should be wrapped at a smaller width</p><p>Next</p>",
            &config,
        );

        assert!(text.lines().all(|line| line.chars().count() <= 20));
        assert!(text.ends_with("\n\nNext"));
    }

    #[test]
    fn test_wrap_text_with_zero_width() {
        let text = "This is a line";
        assert_eq!(wrap_text(text, 0), text);
    }

    #[test]
    fn test_text_formatter() {
        let html = r#"<p>Test content for formatter.</p>"#;
        let formatter = TextFormatter::new(TextConfig::default());
        assert_eq!(formatter.convert(html), flatten(html));
    }
}
