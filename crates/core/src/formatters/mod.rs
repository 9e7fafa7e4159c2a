pub mod text;

pub use text::{TextConfig, TextFormatter, flatten, flatten_with_config};
