use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use super::is_unique_violation;
use super::models::{CrosswordSessionRow, PuzzleRow, to_json};
use crate::crossword::{CrosswordPuzzle, PuzzleContent};
use crate::pagination::PageRequest;
use crate::session::CrosswordSession;

const SESSION_COLUMNS: &str = "id, user_id, puzzle_id, puzzle_date, grid, completed, \
     completion_time_seconds, completed_at, revealed_cells, hints_used, revealed_all, created_at, version";

pub async fn get_puzzle(pool: &SqlitePool, date: NaiveDate) -> Result<Option<CrosswordPuzzle>> {
    let row: Option<PuzzleRow> = sqlx::query_as(
        "SELECT id, date, content, slots, created_at FROM crossword_daily_puzzles WHERE date = ?",
    )
    .bind(date)
    .fetch_optional(pool)
    .await
    .context("Failed to fetch crossword puzzle")?;

    row.map(CrosswordPuzzle::try_from).transpose()
}

pub async fn get_puzzle_by_id(pool: &SqlitePool, id: i64) -> Result<Option<CrosswordPuzzle>> {
    let row: Option<PuzzleRow> = sqlx::query_as(
        "SELECT id, date, content, slots, created_at FROM crossword_daily_puzzles WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to fetch crossword puzzle")?;

    row.map(CrosswordPuzzle::try_from).transpose()
}

/// Store freshly generated content for `date`. If another writer got there
/// first, their puzzle is returned and `content` is dropped.
pub async fn insert_puzzle(
    pool: &SqlitePool,
    date: NaiveDate,
    content: PuzzleContent,
    now: DateTime<Utc>,
) -> Result<CrosswordPuzzle> {
    let slots = CrosswordPuzzle::layout(&content);

    let inserted = sqlx::query(
        "INSERT INTO crossword_daily_puzzles (date, content, slots, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(date)
    .bind(to_json(&content)?)
    .bind(to_json(&slots)?)
    .bind(now)
    .execute(pool)
    .await;

    match inserted {
        Ok(result) => {
            tracing::info!(%date, words = slots.len(), "stored daily crossword");
            Ok(CrosswordPuzzle {
                id: result.last_insert_rowid(),
                date,
                content,
                slots,
                created_at: now,
            })
        }
        Err(e) if is_unique_violation(&e) => {
            tracing::debug!(%date, "crossword stored concurrently, re-reading");
            get_puzzle(pool, date)
                .await?
                .context("Crossword vanished after unique violation")
        }
        Err(e) => Err(e).context("Failed to store crossword puzzle"),
    }
}

pub async fn insert_session(
    pool: &SqlitePool,
    user_id: &str,
    puzzle: &CrosswordPuzzle,
    now: DateTime<Utc>,
) -> Result<CrosswordSession> {
    let grid = puzzle.content.grid.blank();

    let result = sqlx::query(
        r#"
        INSERT INTO crossword_sessions (user_id, puzzle_id, puzzle_date, grid, revealed_cells, created_at)
        VALUES (?, ?, ?, ?, '[]', ?)
        "#,
    )
    .bind(user_id)
    .bind(puzzle.id)
    .bind(puzzle.date)
    .bind(to_json(&grid)?)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create crossword session")?;

    Ok(CrosswordSession {
        id: result.last_insert_rowid(),
        user_id: user_id.to_string(),
        puzzle_id: puzzle.id,
        puzzle_date: puzzle.date,
        grid,
        completed: false,
        completion_time_seconds: None,
        completed_at: None,
        revealed_cells: Vec::new(),
        hints_used: 0,
        revealed_all: false,
        created_at: now,
        version: 0,
    })
}

pub async fn get_session(pool: &SqlitePool, id: i64) -> Result<Option<CrosswordSession>> {
    let row: Option<CrosswordSessionRow> =
        sqlx::query_as(&format!("SELECT {SESSION_COLUMNS} FROM crossword_sessions WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("Failed to fetch crossword session")?;

    row.map(CrosswordSession::try_from).transpose()
}

pub async fn latest_session_for_date(
    pool: &SqlitePool,
    user_id: &str,
    date: NaiveDate,
) -> Result<Option<CrosswordSession>> {
    let row: Option<CrosswordSessionRow> = sqlx::query_as(&format!(
        "SELECT {SESSION_COLUMNS} FROM crossword_sessions
         WHERE user_id = ? AND puzzle_date = ?
         ORDER BY created_at DESC, id DESC
         LIMIT 1"
    ))
    .bind(user_id)
    .bind(date)
    .fetch_optional(pool)
    .await
    .context("Failed to fetch today's crossword session")?;

    row.map(CrosswordSession::try_from).transpose()
}

/// Versioned write-back, see [`crate::db::wordle::save_session`].
pub async fn save_session(pool: &SqlitePool, session: &mut CrosswordSession) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE crossword_sessions
        SET grid = ?, completed = ?, completion_time_seconds = ?, completed_at = ?,
            revealed_cells = ?, hints_used = ?, revealed_all = ?, version = version + 1
        WHERE id = ? AND version = ?
        "#,
    )
    .bind(to_json(&session.grid)?)
    .bind(session.completed)
    .bind(session.completion_time_seconds.map(i64::from))
    .bind(session.completed_at)
    .bind(to_json(&session.revealed_cells)?)
    .bind(i64::from(session.hints_used))
    .bind(session.revealed_all)
    .bind(session.id)
    .bind(session.version)
    .execute(pool)
    .await
    .context("Failed to update crossword session")?;

    if result.rows_affected() == 1 {
        session.version += 1;
        Ok(true)
    } else {
        Ok(false)
    }
}

pub async fn completed_sessions(pool: &SqlitePool, user_id: &str) -> Result<Vec<CrosswordSession>> {
    let rows: Vec<CrosswordSessionRow> = sqlx::query_as(&format!(
        "SELECT {SESSION_COLUMNS} FROM crossword_sessions
         WHERE user_id = ? AND completed = 1
         ORDER BY puzzle_date ASC, id ASC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to fetch completed crossword sessions")?;

    rows.into_iter().map(CrosswordSession::try_from).collect()
}

/// One page of all sessions (finished or not), newest puzzle first.
pub async fn history(
    pool: &SqlitePool,
    user_id: &str,
    page: PageRequest,
) -> Result<(Vec<CrosswordSession>, u64)> {
    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM crossword_sessions WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .context("Failed to count crossword history")?;

    let rows: Vec<CrosswordSessionRow> = sqlx::query_as(&format!(
        "SELECT {SESSION_COLUMNS} FROM crossword_sessions
         WHERE user_id = ?
         ORDER BY puzzle_date DESC, id DESC
         LIMIT ? OFFSET ?"
    ))
    .bind(user_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await
    .context("Failed to fetch crossword history")?;

    let sessions = rows
        .into_iter()
        .map(CrosswordSession::try_from)
        .collect::<Result<Vec<_>>>()?;

    Ok((sessions, u64::try_from(total).unwrap_or(0)))
}
