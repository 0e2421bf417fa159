//! Deterministic daily answer selection.
//!
//! The index into the answer pool comes from the first 32 bits of
//! `SHA-256("<YYYY-MM-DD>:<secret>")`. Every process sharing the secret picks
//! the same word for a date, while the sequence cannot be predicted without it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::vocabulary::Vocabulary;

pub const DEFAULT_SECRET: &str = "default-secret-change-in-production";

#[derive(Debug, Clone)]
pub struct DailySelector {
    vocabulary: Arc<Vocabulary>,
    secret: String,
}

impl DailySelector {
    pub fn new(vocabulary: Arc<Vocabulary>, secret: impl Into<String>) -> Self {
        Self {
            vocabulary,
            secret: secret.into(),
        }
    }

    pub fn daily_answer(&self, date: NaiveDate) -> &str {
        let answers = self.vocabulary.answers();
        let index = pool_index(date, &self.secret, answers.len());
        &answers[index]
    }
}

/// Map a date onto `0..pool_size`. `pool_size` must be non-zero.
pub fn pool_index(date: NaiveDate, secret: &str, pool_size: usize) -> usize {
    let input = format!("{}:{}", date.format("%Y-%m-%d"), secret);
    let digest = hex::encode(Sha256::digest(input.as_bytes()));
    // 8 hex chars always parse into a u32
    let head = u32::from_str_radix(&digest[..8], 16).unwrap_or(0);
    head as usize % pool_size
}

/// The stored Wordle answer for one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyChallenge {
    pub id: i64,
    pub date: NaiveDate,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl DailyChallenge {
    pub fn info(&self) -> ChallengeInfo {
        ChallengeInfo {
            challenge_id: self.id,
            date: self.date,
        }
    }
}

/// What clients may see of a challenge: never the word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeInfo {
    pub challenge_id: i64,
    pub date: NaiveDate,
}
