use serde::Serialize;

use crate::parse::Document;

/// Separators between a page title and the site name in `<title>`.
const TITLE_SEPARATORS: &[&str] = &[" | ", " - ", " – ", " — ", " :: ", " » ", " / "];

/// What the page says about itself, read next to the article body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub byline: Option<String>,
    pub excerpt: Option<String>,
    pub site_name: Option<String>,
    pub language: Option<String>,
}

impl Document {
    /// Article title: `og:title`, then `twitter:title`, then `<title>` minus
    /// a trailing site name, then the first `<h1>`.
    pub fn extract_title(&self) -> Option<String> {
        self.meta_content("og:title")
            .or_else(|| self.meta_content("twitter:title"))
            .or_else(|| {
                self.title()
                    .map(|t| collapse_whitespace(&t))
                    .filter(|t| !t.is_empty())
                    .map(|t| strip_site_suffix(&t))
            })
            .or_else(|| self.first_text("h1"))
    }

    /// Author line. Structured data wins over `<meta name="author">`, which
    /// wins over markup (`rel="author"`, then a short `.byline`-ish element).
    pub fn extract_byline(&self) -> Option<String> {
        self.extract_json_ld()
            .and_then(|ld| ld.get("author").and_then(author_from_json_ld))
            .or_else(|| self.meta_content("author"))
            .or_else(|| self.first_text("[rel=\"author\"]"))
            .or_else(|| self.first_text("[class*=\"byline\"]").filter(|text| text.chars().count() < 100))
    }

    pub fn extract_excerpt(&self) -> Option<String> {
        self.meta_content("og:description")
            .or_else(|| self.meta_content("description"))
            .or_else(|| self.json_ld_str(&["description"]))
    }

    pub fn extract_site_name(&self) -> Option<String> {
        self.meta_content("og:site_name").or_else(|| self.json_ld_str(&["publisher", "name"]))
    }

    pub fn extract_metadata(&self) -> Metadata {
        Metadata {
            title: self.extract_title(),
            byline: self.extract_byline(),
            excerpt: self.extract_excerpt(),
            site_name: self.extract_site_name(),
            language: self.language(),
        }
    }

    /// Non-empty `content` of `<meta name=key>` or `<meta property=key>`.
    fn meta_content(&self, key: &str) -> Option<String> {
        ["name", "property"].iter().find_map(|attr| {
            let elements = self.select(&format!("meta[{}=\"{}\"]", attr, key)).ok()?;
            let content = elements.first()?.attr("content")?.trim();
            (!content.is_empty()).then(|| content.to_string())
        })
    }

    /// Trimmed text of the first element matching `selector`, if non-empty.
    fn first_text(&self, selector: &str) -> Option<String> {
        let elements = self.select(selector).ok()?;
        let text = collapse_whitespace(&elements.first()?.text());
        if text.is_empty() { None } else { Some(text) }
    }

    /// First JSON-LD block that parses.
    fn extract_json_ld(&self) -> Option<serde_json::Value> {
        let elements = self.select("script[type=\"application/ld+json\"]").ok()?;
        elements
            .iter()
            .find_map(|el| serde_json::from_str::<serde_json::Value>(el.text().trim()).ok())
    }

    /// String found by walking `path` through the JSON-LD block.
    fn json_ld_str(&self, path: &[&str]) -> Option<String> {
        let ld = self.extract_json_ld()?;
        let value = path.iter().try_fold(&ld, |value, key| value.get(key))?;
        value.as_str().map(str::to_string)
    }
}

/// Author name from a JSON-LD `author` field: a string, an object with
/// `name`, or an array of either.
fn author_from_json_ld(author: &serde_json::Value) -> Option<String> {
    match author {
        serde_json::Value::String(name) => Some(name.clone()),
        serde_json::Value::Array(authors) => authors.first().and_then(author_from_json_ld),
        other => other.get("name").and_then(|name| name.as_str()).map(str::to_string),
    }
}

/// Drops a trailing " | Site" style suffix when at least three words remain.
fn strip_site_suffix(title: &str) -> String {
    let cut = TITLE_SEPARATORS
        .iter()
        .filter_map(|sep| title.rfind(sep))
        .max();

    if let Some(cut) = cut {
        let head = title[..cut].trim();
        if head.split_whitespace().count() >= 3 {
            return head.to_string();
        }
    }

    title.to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TRAVEL_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>Crossing the Alps by Rail | Slow Travel Weekly</title>
            <meta name="author" content="Priya Nair">
            <meta name="description" content="Six trains, two passes and one missed connection.">
            <meta property="og:title" content="Crossing the Alps by Rail">
            <meta property="og:site_name" content="Slow Travel Weekly">
            <script type="application/ld+json">
            {
                "@context": "https://schema.org",
                "@type": "BlogPosting",
                "headline": "Alps by Rail",
                "author": {"@type": "Person", "name": "Priya Nair-Holm"},
                "description": "A rail journey over the Gotthard and the Bernina.",
                "publisher": {"@type": "Organization", "name": "Slow Travel Media"}
            }
            </script>
        </head>
        <body>
            <h1>Over the Mountains</h1>
            <p>The first train left Zurich before dawn.</p>
        </body>
        </html>
    "#;

    fn doc(html: &str) -> Document {
        Document::parse(html).unwrap()
    }

    #[test]
    fn test_title_prefers_open_graph() {
        assert_eq!(doc(TRAVEL_HTML).extract_title().as_deref(), Some("Crossing the Alps by Rail"));
    }

    #[test]
    fn test_title_from_twitter_card() {
        let html = r#"<html><head><meta name="twitter:title" content="Card Title"><title>Page</title></head></html>"#;
        assert_eq!(doc(html).extract_title().as_deref(), Some("Card Title"));
    }

    #[rstest]
    #[case("Notes on Night Trains | Slow Travel", "Notes on Night Trains")]
    #[case("Notes on Night Trains - Slow Travel", "Notes on Night Trains")]
    #[case("Night Trains | Blog", "Night Trains | Blog")]
    #[case("Nothing to strip here", "Nothing to strip here")]
    #[case("Trains - Past and Present - Slow Travel", "Trains - Past and Present")]
    fn test_strip_site_suffix(#[case] title: &str, #[case] expected: &str) {
        assert_eq!(strip_site_suffix(title), expected);
    }

    #[test]
    fn test_title_falls_back_to_h1() {
        let html = "<html><body><h1>\n  Lonely   Heading \n</h1><p>Body</p></body></html>";
        assert_eq!(doc(html).extract_title().as_deref(), Some("Lonely Heading"));
    }

    #[test]
    fn test_title_missing() {
        assert_eq!(doc("<html><body><p>Untitled</p></body></html>").extract_title(), None);
    }

    #[test]
    fn test_byline_prefers_structured_data() {
        assert_eq!(doc(TRAVEL_HTML).extract_byline().as_deref(), Some("Priya Nair-Holm"));
    }

    #[rstest]
    #[case(r#"<html><head><meta name="author" content="Ines Duarte"></head></html>"#, "Ines Duarte")]
    #[case(r#"<html><body><a rel="author" href="/u/ines">Ines D.</a></body></html>"#, "Ines D.")]
    #[case(r#"<html><body><span class="post-byline">By Ines</span></body></html>"#, "By Ines")]
    #[case(r#"<html><head><script type="application/ld+json">{"author": "Plain Name"}</script></head></html>"#, "Plain Name")]
    #[case(r#"<html><head><script type="application/ld+json">{"author": [{"name": "Lead"}, {"name": "Second"}]}</script></head></html>"#, "Lead")]
    fn test_byline_sources(#[case] html: &str, #[case] expected: &str) {
        assert_eq!(doc(html).extract_byline().as_deref(), Some(expected));
    }

    #[test]
    fn test_excerpt_and_site_name() {
        let page = doc(TRAVEL_HTML);
        assert_eq!(page.extract_excerpt().as_deref(), Some("Six trains, two passes and one missed connection."));
        assert_eq!(page.extract_site_name().as_deref(), Some("Slow Travel Weekly"));
    }

    #[test]
    fn test_json_ld_fallbacks() {
        let html = r#"<html><head><script type="application/ld+json">{"description": "From data", "publisher": {"name": "Data Press"}}</script></head></html>"#;
        let page = doc(html);
        assert_eq!(page.extract_excerpt().as_deref(), Some("From data"));
        assert_eq!(page.extract_site_name().as_deref(), Some("Data Press"));
    }

    #[test]
    fn test_extract_metadata() {
        let metadata = doc(TRAVEL_HTML).extract_metadata();

        assert_eq!(metadata.title.as_deref(), Some("Crossing the Alps by Rail"));
        assert_eq!(metadata.byline.as_deref(), Some("Priya Nair-Holm"));
        assert_eq!(metadata.site_name.as_deref(), Some("Slow Travel Weekly"));
        assert_eq!(metadata.language.as_deref(), Some("en"));
        assert!(metadata.excerpt.is_some());
    }
}
