//! Crossword content sources and the retry policy around them.

pub mod retry;
pub mod source;

pub use retry::{RetryConfig, generate_with_retry};
pub use source::{CrosswordSource, FileCrosswordSource, HttpCrosswordSource, SourceError};

use std::sync::Arc;

use crate::config::CrosswordSourceConfig;

/// Build the configured source.
pub fn from_config(config: &CrosswordSourceConfig) -> Arc<dyn CrosswordSource> {
    match config {
        CrosswordSourceConfig::Http { url } => Arc::new(HttpCrosswordSource::new(url.clone())),
        CrosswordSourceConfig::File { path } => Arc::new(FileCrosswordSource::new(path.clone())),
    }
}
