use rand::Rng;
use std::time::Duration;

use super::source::{CrosswordSource, SourceError};
use crate::crossword::PuzzleContent;
use crate::error::GameError;

/// Backoff policy for crossword generation.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total tries, including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay before the second try; doubles on every further try.
    pub base_delay_ms: u64,
    /// Upper bound on a single delay.
    pub max_delay_ms: u64,
    /// Random spread (0.0-1.0) applied around each delay.
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            jitter_factor: 0.0,
        }
    }
}

impl RetryConfig {
    /// Delay after the given failed attempt (1-based), before jitter.
    pub fn base_delay(&self, attempt: u32) -> u64 {
        let exponential = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        exponential.min(self.max_delay_ms)
    }

    fn delay(&self, attempt: u32) -> u64 {
        let capped = self.base_delay(attempt);
        let jitter_range = (capped as f64 * self.jitter_factor.clamp(0.0, 1.0)) as i64;
        if jitter_range > 0 {
            let jitter = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
            (capped as i64 + jitter).max(0) as u64
        } else {
            capped
        }
    }
}

/// Ask the source for content until it returns something that passes
/// structural validation, backing off between tries.
///
/// Malformed content is retried like a transport failure. A rejected request
/// stops immediately. Giving up yields [`GameError::ContentUnavailable`].
pub async fn generate_with_retry(
    source: &dyn CrosswordSource,
    config: &RetryConfig,
) -> Result<PuzzleContent, GameError> {
    let max_attempts = config.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        let outcome = match source.generate().await {
            Ok(content) => match content.validate() {
                Ok(()) => Ok(content),
                Err(e) => Err(SourceError::InvalidResponse(e.to_string())),
            },
            Err(e) => Err(e),
        };

        match outcome {
            Ok(content) => {
                if attempt > 1 {
                    tracing::info!(attempt, "crossword generation succeeded after retry");
                }
                return Ok(content);
            }
            Err(e) if !e.is_retryable() => {
                tracing::error!(attempt, error = %e, "crossword generation failed with non-retryable error");
                return Err(GameError::ContentUnavailable(e.to_string()));
            }
            Err(e) => {
                if attempt < max_attempts {
                    let delay = config.delay(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay,
                        error = %e,
                        "crossword generation failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                last_error = e.to_string();
            }
        }
    }

    tracing::error!(
        attempts = max_attempts,
        error = %last_error,
        "crossword generation failed after all attempts"
    );
    Err(GameError::ContentUnavailable(format!(
        "gave up after {max_attempts} attempts: {last_error}"
    )))
}
