mod echo;

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use readaloud_core::{
    Extraction, ExtractionRequest, FetchConfig, Fetcher, InsightClient, ParsedArticle, Pipeline, RawDocument,
    Readability, ReadabilityConfig, fetch_file, fetch_stdin,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::echo::{
    format_size, print_article_details, print_banner, print_detail, print_info, print_step, print_success,
    print_timing_summary, print_warning,
};

pub(crate) const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for extracted content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    Html,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            _ => Err(format!("Invalid format: {}. Valid options: text, json, html", s)),
        }
    }
}

/// Extract the readable text of a web article
#[derive(Parser, Debug)]
#[command(name = "readaloud")]
#[command(author = "Readaloud Contributors")]
#[command(version)]
#[command(about = "Extract the readable text of a web article", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Treat INPUT as the article text itself and skip extraction ("-" reads it from stdin)
    #[arg(long)]
    text: bool,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (text, json, html)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    format: OutputFormat,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Minimum character threshold for content candidates
    #[arg(long, default_value = "500", value_name = "NUM")]
    char_threshold: usize,

    /// Minimum score the best candidate must reach
    #[arg(long, default_value = "20", value_name = "SCORE")]
    min_score: f64,

    /// Send the extracted text to this insight endpoint and output its reply
    #[arg(long, value_name = "URL")]
    insight_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Where the HTML comes from.
enum Input {
    Stdin,
    Url(ExtractionRequest),
    File(PathBuf),
}

impl Input {
    fn from_arg(arg: &str) -> anyhow::Result<Self> {
        if arg == "-" {
            Ok(Input::Stdin)
        } else if arg.starts_with("http://") || arg.starts_with("https://") {
            Ok(Input::Url(ExtractionRequest::new(arg).context("Invalid URL")?))
        } else {
            Ok(Input::File(PathBuf::from(arg)))
        }
    }

    fn describe(&self) -> String {
        match self {
            Input::Stdin => "Reading from stdin".to_string(),
            Input::Url(request) => format!("Fetching from {}", request.url().as_str().bright_white().underline()),
            Input::File(path) => format!("Reading from file {}", path.display().bright_white()),
        }
    }
}

/// Base URL for documents that did not come over the network.
fn local_url(path: Option<&Path>) -> anyhow::Result<Url> {
    match path {
        Some(path) => {
            let absolute = std::path::absolute(path).with_context(|| format!("Failed to resolve {}", path.display()))?;
            Url::from_file_path(&absolute).map_err(|_| anyhow!("Cannot express {} as a URL", absolute.display()))
        }
        None => Url::parse("file:///dev/stdin").context("Failed to build stdin URL"),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("readaloud=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let started = Instant::now();
    let mut timings: Vec<(&str, Duration)> = Vec::new();

    if args.verbose {
        init_logging();
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    if args.text {
        return run_text(&args, started).await;
    }

    let total = if args.insight_url.is_some() { 5 } else { 4 };
    let input = Input::from_arg(&args.input)?;

    let fetch_config = FetchConfig {
        timeout: args.timeout,
        user_agent: args.user_agent.clone().unwrap_or_else(|| FetchConfig::default().user_agent),
    };
    let readability = Readability::with_config(
        ReadabilityConfig::builder().min_score(args.min_score).char_threshold(args.char_threshold).build(),
    );
    let pipeline = Pipeline::http(fetch_config, readability).context("Failed to build HTTP client")?;

    if args.verbose {
        print_step(1, total, &input.describe());
    }

    let step = Instant::now();
    let raw = match &input {
        Input::Stdin => RawDocument::from_html(fetch_stdin().context("Failed to read from stdin")?, local_url(None)?),
        Input::File(path) => {
            let html = fetch_file(&path.to_string_lossy())
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            RawDocument::from_html(html, local_url(Some(path))?)
        }
        Input::Url(request) => pipeline.fetcher().fetch(request.url()).await.context("Failed to fetch URL")?,
    };
    timings.push(("Read", step.elapsed()));

    if args.verbose {
        print_detail("Size", &format_size(raw.body.len()));
        if let Some(status) = raw.status
            && !(200..300).contains(&status)
        {
            print_warning(&format!("Server answered with status {}", status));
        }
        eprintln!();
        print_step(2, total, "Extracting article");
    }

    let step = Instant::now();
    let article = pipeline.extract_article(&raw).context("Failed to extract article")?;
    timings.push(("Extract", step.elapsed()));

    if args.verbose {
        print_article_details(&article);
        eprintln!();
        print_step(3, total, "Flattening text");
    }

    let step = Instant::now();
    let extraction = pipeline.to_text(&article);
    timings.push(("Flatten", step.elapsed()));

    if args.verbose {
        print_detail("Characters", &extraction.text_content.char_count().to_string());
        eprintln!();
    }

    let insight = match &args.insight_url {
        Some(endpoint) => {
            if args.verbose {
                print_step(4, total, &format!("Requesting insight from {}", endpoint.bright_white()));
            }
            let step = Instant::now();
            let reply = request_insight(endpoint, args.timeout, extraction.text_content.as_str()).await?;
            timings.push(("Insight", step.elapsed()));
            Some(reply)
        }
        None => None,
    };

    let output = render(args.format, &extraction, &article, insight.as_deref())?;

    if args.verbose {
        print_step(total, total, "Writing output");
        print_detail("Format", &format!("{:?}", args.format));
        print_timing_summary(started.elapsed(), &timings);
    }

    write_output(args.output.as_deref(), &output)
}

/// Raw-text mode: the input already is the article, so only the insight
/// step remains.
async fn run_text(args: &Args, started: Instant) -> anyhow::Result<()> {
    let total = if args.insight_url.is_some() { 3 } else { 2 };
    let mut timings: Vec<(&str, Duration)> = Vec::new();

    if args.verbose {
        print_step(1, total, "Reading article text");
    }

    let raw = if args.input == "-" { fetch_stdin().context("Failed to read from stdin")? } else { args.input.clone() };
    let content = raw.trim();
    if content.is_empty() {
        bail!("Please enter blog text.");
    }

    if args.verbose {
        print_detail("Characters", &content.chars().count().to_string());
        eprintln!();
    }

    let insight = match &args.insight_url {
        Some(endpoint) => {
            if args.verbose {
                print_step(2, total, &format!("Requesting insight from {}", endpoint.bright_white()));
            }
            let step = Instant::now();
            let reply = request_insight(endpoint, args.timeout, content).await?;
            timings.push(("Insight", step.elapsed()));
            Some(reply)
        }
        None => None,
    };

    let output = match args.format {
        OutputFormat::Text => insight.unwrap_or_else(|| content.to_string()),
        OutputFormat::Json => {
            let mut value = json!({ "textContent": content });
            if let Some(reply) = insight {
                value["insight"] = json!(reply);
            }
            serde_json::to_string_pretty(&value).context("Failed to serialize text")?
        }
        OutputFormat::Html => bail!("HTML output needs an HTML input; drop --text or pick another format"),
    };

    if args.verbose {
        print_step(total, total, "Writing output");
        print_detail("Format", &format!("{:?}", args.format));
        print_timing_summary(started.elapsed(), &timings);
    }

    write_output(args.output.as_deref(), &output)
}

async fn request_insight(endpoint: &str, timeout: u64, text: &str) -> anyhow::Result<String> {
    let client = InsightClient::new(endpoint, timeout).context("Invalid insight URL")?;
    client.request(text).await.context("Insight request failed")
}

fn write_output(path: Option<&Path>, output: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}

fn render(
    format: OutputFormat, extraction: &Extraction, article: &ParsedArticle, insight: Option<&str>,
) -> anyhow::Result<String> {
    let output = match format {
        OutputFormat::Text => match insight {
            Some(reply) => reply.to_string(),
            None => extraction.text_content.to_string(),
        },
        OutputFormat::Json => {
            let mut value = serde_json::to_value(extraction).context("Failed to serialize extraction")?;
            if let Some(object) = value.as_object_mut() {
                object.insert("byline".to_string(), json!(article.byline));
                object.insert("siteName".to_string(), json!(article.site_name));
                object.insert("language".to_string(), json!(article.language));
                if let Some(reply) = insight {
                    object.insert("insight".to_string(), json!(reply));
                }
            }
            serde_json::to_string_pretty(&value).context("Failed to serialize extraction")?
        }
        OutputFormat::Html => {
            if insight.is_some() {
                print_warning("Insight replies are not included in HTML output");
            }
            article.content_html.clone()
        }
    };

    Ok(output)
}
