use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use readaloud_core::{
    Document, DomBuilder, ExtractConfig, HtmlDomBuilder, RawDocument, Readability, extract_content, flatten, normalize,
    parse, preprocess_html,
};
use url::Url;

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("../../tests/fixtures/{}", name)).unwrap()
}

/// The article fixture padded out with extra paragraphs.
fn long_article() -> String {
    let html = fixture("article.html");
    let extra = "<p>Another paragraph of filler prose, with commas, clauses, and enough words to be scored.</p>\n".repeat(400);
    html.replace("</article>", &format!("{}</article>", extra))
}

fn bench_build(c: &mut Criterion) {
    let small = fixture("article.html");
    let large = long_article();
    let url = Url::parse("https://blog.example.com/posts/ownership").unwrap();
    let builder = HtmlDomBuilder::default();

    let mut group = c.benchmark_group("build");

    for (name, html) in [("small", &small), ("large", &large)] {
        let raw = RawDocument::from_html(html.as_str(), url.clone());
        group.bench_with_input(BenchmarkId::new(name, html.len()), &raw, |b, raw| {
            b.iter(|| builder.build(black_box(raw)))
        });
    }

    group.finish();
}

fn bench_full_extraction(c: &mut Criterion) {
    let html = fixture("article.html");

    c.bench_function("full_extraction", |b| b.iter(|| parse(black_box(&html))));
}

fn bench_preprocess(c: &mut Criterion) {
    let html = long_article();
    let config = Default::default();

    c.bench_function("preprocess", |b| b.iter(|| preprocess_html(black_box(&html), &config)));
}

fn bench_scoring(c: &mut Criterion) {
    let html = long_article();
    let preprocessed = preprocess_html(&html, &Default::default());
    let doc = Document::parse(&preprocessed).unwrap();
    let config = ExtractConfig::default();

    c.bench_function("scoring_and_selection", |b| {
        b.iter(|| extract_content(black_box(&doc), black_box(&config)))
    });
}

fn bench_flatten_and_normalize(c: &mut Criterion) {
    let article = Readability::new().parse(&long_article()).unwrap();

    c.bench_function("flatten_and_normalize", |b| {
        b.iter(|| normalize(&article.title, &flatten(black_box(&article.content_html))))
    });
}

criterion_group!(
    benches,
    bench_build,
    bench_full_extraction,
    bench_preprocess,
    bench_scoring,
    bench_flatten_and_normalize
);
criterion_main!(benches);
