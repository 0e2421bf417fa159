//! Row shapes as stored in SQLite and their conversion into domain types.
//!
//! Structured columns (guesses, grids, clue maps) are JSON text.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::crossword::CrosswordPuzzle;
use crate::daily::DailyChallenge;
use crate::session::{CrosswordSession, WordleSession};

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("Failed to serialize column")
}

pub fn from_json<T: DeserializeOwned>(raw: &str, column: &str) -> Result<T> {
    serde_json::from_str(raw).with_context(|| format!("Corrupt {column} column"))
}

#[derive(Debug, sqlx::FromRow)]
pub struct ChallengeRow {
    pub id: i64,
    pub date: NaiveDate,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChallengeRow> for DailyChallenge {
    fn from(row: ChallengeRow) -> Self {
        Self {
            id: row.id,
            date: row.date,
            answer: row.answer,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct WordleSessionRow {
    pub id: i64,
    pub user_id: String,
    pub challenge_id: i64,
    pub puzzle_date: NaiveDate,
    pub guesses: String,
    pub guess_results: String,
    pub won: bool,
    pub attempts_used: i64,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub version: i64,
}

impl TryFrom<WordleSessionRow> for WordleSession {
    type Error = anyhow::Error;

    fn try_from(row: WordleSessionRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            challenge_id: row.challenge_id,
            puzzle_date: row.puzzle_date,
            guesses: from_json(&row.guesses, "guesses")?,
            guess_results: from_json(&row.guess_results, "guess_results")?,
            won: row.won,
            attempts_used: u32::try_from(row.attempts_used).context("Corrupt attempts_used column")?,
            completed_at: row.completed_at,
            created_at: row.created_at,
            version: row.version,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PuzzleRow {
    pub id: i64,
    pub date: NaiveDate,
    pub content: String,
    pub slots: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PuzzleRow> for CrosswordPuzzle {
    type Error = anyhow::Error;

    fn try_from(row: PuzzleRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            date: row.date,
            content: from_json(&row.content, "content")?,
            slots: from_json(&row.slots, "slots")?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct CrosswordSessionRow {
    pub id: i64,
    pub user_id: String,
    pub puzzle_id: i64,
    pub puzzle_date: NaiveDate,
    pub grid: String,
    pub completed: bool,
    pub completion_time_seconds: Option<i64>,
    pub completed_at: Option<DateTime<Utc>>,
    pub revealed_cells: String,
    pub hints_used: i64,
    pub revealed_all: bool,
    pub created_at: DateTime<Utc>,
    pub version: i64,
}

impl TryFrom<CrosswordSessionRow> for CrosswordSession {
    type Error = anyhow::Error;

    fn try_from(row: CrosswordSessionRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            puzzle_id: row.puzzle_id,
            puzzle_date: row.puzzle_date,
            grid: from_json(&row.grid, "grid")?,
            completed: row.completed,
            completion_time_seconds: row
                .completion_time_seconds
                .map(u32::try_from)
                .transpose()
                .context("Corrupt completion_time_seconds column")?,
            completed_at: row.completed_at,
            revealed_cells: from_json(&row.revealed_cells, "revealed_cells")?,
            hints_used: u32::try_from(row.hints_used).context("Corrupt hints_used column")?,
            revealed_all: row.revealed_all,
            created_at: row.created_at,
            version: row.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::evaluate;

    fn row(guesses: &str, results: &str) -> WordleSessionRow {
        WordleSessionRow {
            id: 3,
            user_id: "u".into(),
            challenge_id: 1,
            puzzle_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            guesses: guesses.into(),
            guess_results: results.into(),
            won: false,
            attempts_used: 1,
            completed_at: None,
            created_at: Utc::now(),
            version: 2,
        }
    }

    #[test]
    fn test_wordle_row_round_trips_results() {
        let results = to_json(&vec![evaluate("speed", "spade")]).unwrap();
        let session = WordleSession::try_from(row(r#"["speed"]"#, &results)).unwrap();
        assert_eq!(session.guesses, vec!["speed"]);
        assert_eq!(session.guess_results[0], evaluate("speed", "spade"));
        assert_eq!(session.version, 2);
    }

    #[test]
    fn test_corrupt_json_is_reported() {
        let err = WordleSession::try_from(row("not json", "[]")).unwrap_err();
        assert!(err.to_string().contains("guesses"));
    }
}
