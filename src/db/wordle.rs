use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use super::is_unique_violation;
use super::models::{ChallengeRow, WordleSessionRow, to_json};
use crate::daily::DailyChallenge;
use crate::error::{GameError, GameResult};
use crate::pagination::PageRequest;
use crate::session::WordleSession;

const SESSION_COLUMNS: &str = "id, user_id, challenge_id, puzzle_date, guesses, guess_results, \
     won, attempts_used, completed_at, created_at, version";

pub async fn get_challenge(pool: &SqlitePool, date: NaiveDate) -> Result<Option<DailyChallenge>> {
    let row: Option<ChallengeRow> = sqlx::query_as(
        "SELECT id, date, answer, created_at FROM wordle_daily_challenges WHERE date = ?",
    )
    .bind(date)
    .fetch_optional(pool)
    .await
    .context("Failed to fetch daily challenge")?;

    Ok(row.map(DailyChallenge::from))
}

pub async fn get_challenge_by_id(pool: &SqlitePool, id: i64) -> Result<Option<DailyChallenge>> {
    let row: Option<ChallengeRow> = sqlx::query_as(
        "SELECT id, date, answer, created_at FROM wordle_daily_challenges WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to fetch daily challenge")?;

    Ok(row.map(DailyChallenge::from))
}

/// Return the challenge for `date`, inserting `answer` if none exists yet.
///
/// When two callers race, the loser's insert hits the UNIQUE date constraint
/// and it reads back the winner's row.
pub async fn get_or_create_challenge(
    pool: &SqlitePool,
    date: NaiveDate,
    answer: &str,
    now: DateTime<Utc>,
) -> Result<DailyChallenge> {
    if let Some(existing) = get_challenge(pool, date).await? {
        return Ok(existing);
    }

    let inserted = sqlx::query(
        "INSERT INTO wordle_daily_challenges (date, answer, created_at) VALUES (?, ?, ?)",
    )
    .bind(date)
    .bind(answer)
    .bind(now)
    .execute(pool)
    .await;

    match inserted {
        Ok(result) => {
            tracing::info!(%date, "created daily wordle challenge");
            Ok(DailyChallenge {
                id: result.last_insert_rowid(),
                date,
                answer: answer.to_string(),
                created_at: now,
            })
        }
        Err(e) if is_unique_violation(&e) => {
            tracing::debug!(%date, "daily challenge created concurrently, re-reading");
            get_challenge(pool, date)
                .await?
                .context("Daily challenge vanished after unique violation")
        }
        Err(e) => Err(e).context("Failed to create daily challenge"),
    }
}

pub async fn insert_session(
    pool: &SqlitePool,
    user_id: &str,
    challenge: &DailyChallenge,
    now: DateTime<Utc>,
) -> Result<WordleSession> {
    let result = sqlx::query(
        r#"
        INSERT INTO wordle_sessions (user_id, challenge_id, puzzle_date, guesses, guess_results, created_at)
        VALUES (?, ?, ?, '[]', '[]', ?)
        "#,
    )
    .bind(user_id)
    .bind(challenge.id)
    .bind(challenge.date)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create wordle session")?;

    Ok(WordleSession {
        id: result.last_insert_rowid(),
        user_id: user_id.to_string(),
        challenge_id: challenge.id,
        puzzle_date: challenge.date,
        guesses: Vec::new(),
        guess_results: Vec::new(),
        won: false,
        attempts_used: 0,
        completed_at: None,
        created_at: now,
        version: 0,
    })
}

pub async fn get_session(pool: &SqlitePool, id: i64) -> Result<Option<WordleSession>> {
    let row: Option<WordleSessionRow> =
        sqlx::query_as(&format!("SELECT {SESSION_COLUMNS} FROM wordle_sessions WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("Failed to fetch wordle session")?;

    row.map(WordleSession::try_from).transpose()
}

/// Most recently started session of a user for a date.
pub async fn latest_session_for_date(
    pool: &SqlitePool,
    user_id: &str,
    date: NaiveDate,
) -> Result<Option<WordleSession>> {
    let row: Option<WordleSessionRow> = sqlx::query_as(&format!(
        "SELECT {SESSION_COLUMNS} FROM wordle_sessions
         WHERE user_id = ? AND puzzle_date = ?
         ORDER BY created_at DESC, id DESC
         LIMIT 1"
    ))
    .bind(user_id)
    .bind(date)
    .fetch_optional(pool)
    .await
    .context("Failed to fetch today's wordle session")?;

    row.map(WordleSession::try_from).transpose()
}

pub async fn has_completed(pool: &SqlitePool, user_id: &str, date: NaiveDate) -> Result<bool> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM wordle_sessions
         WHERE user_id = ? AND puzzle_date = ? AND completed_at IS NOT NULL",
    )
    .bind(user_id)
    .bind(date)
    .fetch_one(pool)
    .await
    .context("Failed to check completed wordle sessions")?;

    Ok(count > 0)
}

/// Write back a mutated session if nobody else has since. Returns `false`
/// when the stored version moved on; on success `session.version` is bumped.
///
/// Finishing a second session for the same user and date is refused with
/// [`GameError::AlreadyCompleted`] and nothing is written.
pub async fn save_session(pool: &SqlitePool, session: &mut WordleSession) -> GameResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE wordle_sessions
        SET guesses = ?, guess_results = ?, won = ?, attempts_used = ?, completed_at = ?,
            version = version + 1
        WHERE id = ? AND version = ?
        "#,
    )
    .bind(to_json(&session.guesses)?)
    .bind(to_json(&session.guess_results)?)
    .bind(session.won)
    .bind(i64::from(session.attempts_used))
    .bind(session.completed_at)
    .bind(session.id)
    .bind(session.version)
    .execute(pool)
    .await;

    let result = match result {
        Ok(result) => result,
        Err(e) if is_unique_violation(&e) => {
            tracing::warn!(
                session_id = session.id,
                user_id = %session.user_id,
                date = %session.puzzle_date,
                "refusing to finish a second wordle for the same day"
            );
            return Err(GameError::already_completed(format!(
                "wordle for {} on {}",
                session.user_id, session.puzzle_date
            )));
        }
        Err(e) => return Err(anyhow::Error::new(e).context("Failed to update wordle session").into()),
    };

    if result.rows_affected() == 1 {
        session.version += 1;
        Ok(true)
    } else {
        Ok(false)
    }
}

pub async fn completed_sessions(pool: &SqlitePool, user_id: &str) -> Result<Vec<WordleSession>> {
    let rows: Vec<WordleSessionRow> = sqlx::query_as(&format!(
        "SELECT {SESSION_COLUMNS} FROM wordle_sessions
         WHERE user_id = ? AND completed_at IS NOT NULL
         ORDER BY puzzle_date ASC, id ASC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to fetch completed wordle sessions")?;

    rows.into_iter().map(WordleSession::try_from).collect()
}

/// One page of completed sessions, newest puzzle first, plus the total.
pub async fn history(
    pool: &SqlitePool,
    user_id: &str,
    page: PageRequest,
) -> Result<(Vec<WordleSession>, u64)> {
    let (total,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM wordle_sessions WHERE user_id = ? AND completed_at IS NOT NULL",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .context("Failed to count wordle history")?;

    let rows: Vec<WordleSessionRow> = sqlx::query_as(&format!(
        "SELECT {SESSION_COLUMNS} FROM wordle_sessions
         WHERE user_id = ? AND completed_at IS NOT NULL
         ORDER BY puzzle_date DESC, id DESC
         LIMIT ? OFFSET ?"
    ))
    .bind(user_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await
    .context("Failed to fetch wordle history")?;

    let sessions = rows
        .into_iter()
        .map(WordleSession::try_from)
        .collect::<Result<Vec<_>>>()?;

    Ok((sessions, u64::try_from(total).unwrap_or(0)))
}
