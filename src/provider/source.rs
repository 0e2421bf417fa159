use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::crossword::PuzzleContent;

#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The source refused outright; retrying will not help.
    #[error("rejected: {0}")]
    Rejected(String),
}

impl SourceError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SourceError::Rejected(_))
    }
}

/// Produces fresh crossword content on demand.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrosswordSource: Send + Sync {
    async fn generate(&self) -> Result<PuzzleContent, SourceError>;
}

/// Fetches puzzle JSON from an HTTP endpoint.
pub struct HttpCrosswordSource {
    client: reqwest::Client,
    url: String,
}

impl HttpCrosswordSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl CrosswordSource for HttpCrosswordSource {
    async fn generate(&self) -> Result<PuzzleContent, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(SourceError::Rejected(format!("{} returned {status}", self.url)));
        }
        if !status.is_success() {
            return Err(SourceError::Request(format!("{} returned {status}", self.url)));
        }

        response
            .json::<PuzzleContent>()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))
    }
}

/// Reads puzzle JSON from a local file. Useful offline and in development.
pub struct FileCrosswordSource {
    path: PathBuf,
}

impl FileCrosswordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CrosswordSource for FileCrosswordSource {
    async fn generate(&self) -> Result<PuzzleContent, SourceError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError::Request(format!("{}: {e}", self.path.display())))?;

        serde_json::from_str(&raw).map_err(|e| SourceError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossword::puzzle::tests::sample_content;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_file_source_reads_content() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&sample_content()).unwrap()).unwrap();

        let source = FileCrosswordSource::new(file.path());
        assert_eq!(source.generate().await.unwrap(), sample_content());
    }

    #[tokio::test]
    async fn test_file_source_errors() {
        let missing = FileCrosswordSource::new("/nonexistent/crossword.json");
        assert!(matches!(missing.generate().await, Err(SourceError::Request(_))));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{\"grid\": 5}}").unwrap();
        let garbled = FileCrosswordSource::new(file.path());
        assert!(matches!(garbled.generate().await, Err(SourceError::InvalidResponse(_))));
    }

    #[test]
    fn test_rejected_is_not_retryable() {
        assert!(!SourceError::Rejected("401".into()).is_retryable());
        assert!(SourceError::Request("timeout".into()).is_retryable());
        assert!(SourceError::InvalidResponse("eof".into()).is_retryable());
    }
}
