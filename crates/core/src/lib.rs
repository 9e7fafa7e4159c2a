pub mod article;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod formatters;
pub mod insight;
pub mod metadata;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod playback;
pub mod postprocess;
pub mod preprocess;
pub mod readability;
pub mod scoring;

pub use article::ParsedArticle;
pub use error::{ErrorKind, ReadaloudError, Result};
#[doc(hidden)]
pub use extract::{ExtractConfig, ExtractedContent, extract_content};
pub use fetch::{ExtractionRequest, FetchConfig, Fetcher, HttpFetcher, RawDocument};
pub use fetch::{fetch_file, fetch_stdin, fetch_url};
pub use formatters::{TextConfig, TextFormatter, flatten, flatten_with_config};
pub use insight::InsightClient;
pub use metadata::Metadata;
pub use normalize::{MAX_CHARS, PlainText, normalize};
pub use parse::{Document, DomBuilder, HtmlDomBuilder};
pub use pipeline::{Extraction, Pipeline};
pub use playback::{Playback, PlaybackAction, PlaybackError, PlaybackState, VoiceSettings};
#[doc(hidden)]
pub use postprocess::{PostProcessConfig, postprocess_html};
#[doc(hidden)]
pub use preprocess::{PreprocessConfig, preprocess_html};
pub use readability::{Readability, ReadabilityConfig, ReadabilityConfigBuilder, parse, parse_with_url};
#[doc(hidden)]
pub use scoring::{ScoreConfig, ScoreResult, calculate_score, link_density};
