use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::sync::Arc;

use super::{MAX_WRITE_ATTEMPTS, ensure_owner};
use crate::clock::Clock;
use crate::crossword::{CellPos, CheckResult, CrosswordPuzzle, PlayerGrid, PuzzleInfo, RevealAll};
use crate::db;
use crate::error::{GameError, GameResult};
use crate::pagination::{PageRequest, Paginated};
use crate::provider::{CrosswordSource, RetryConfig, generate_with_retry};
use crate::session::CrosswordSession;
use crate::stats::{CrosswordRecord, CrosswordStats};

pub struct CrosswordService {
    pool: SqlitePool,
    source: Arc<dyn CrosswordSource>,
    retry: RetryConfig,
    clock: Arc<dyn Clock>,
}

impl CrosswordService {
    pub fn new(
        pool: SqlitePool,
        source: Arc<dyn CrosswordSource>,
        retry: RetryConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pool,
            source,
            retry,
            clock,
        }
    }

    fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// The puzzle for `date` (default today), generated and stored on first
    /// request.
    pub async fn get_or_create_puzzle(&self, date: Option<NaiveDate>) -> GameResult<CrosswordPuzzle> {
        let date = date.unwrap_or_else(|| self.today());
        if let Some(puzzle) = db::crossword::get_puzzle(&self.pool, date).await? {
            return Ok(puzzle);
        }

        tracing::info!(%date, "generating crossword");
        let content = generate_with_retry(self.source.as_ref(), &self.retry).await?;
        Ok(db::crossword::insert_puzzle(&self.pool, date, content, self.clock.now()).await?)
    }

    /// Clues and grid shape for players; letters masked.
    pub async fn puzzle_info(&self, date: Option<NaiveDate>) -> GameResult<PuzzleInfo> {
        Ok(self.get_or_create_puzzle(date).await?.info())
    }

    async fn puzzle_by_id(&self, id: i64) -> GameResult<CrosswordPuzzle> {
        db::crossword::get_puzzle_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| GameError::not_found(format!("crossword puzzle {id}")))
    }

    /// A new session with a blank grid. Crosswords may be replayed freely.
    pub async fn start_session(&self, user_id: &str, date: Option<NaiveDate>) -> GameResult<CrosswordSession> {
        let puzzle = self.get_or_create_puzzle(date).await?;
        let session = db::crossword::insert_session(&self.pool, user_id, &puzzle, self.clock.now()).await?;
        tracing::info!(session_id = session.id, user_id, date = %puzzle.date, "crossword session started");
        Ok(session)
    }

    pub async fn todays_session(
        &self,
        user_id: &str,
        date: Option<NaiveDate>,
    ) -> GameResult<Option<CrosswordSession>> {
        let date = date.unwrap_or_else(|| self.today());
        Ok(db::crossword::latest_session_for_date(&self.pool, user_id, date).await?)
    }

    pub async fn get_session(&self, user_id: &str, session_id: i64) -> GameResult<CrosswordSession> {
        let what = format!("crossword session {session_id}");
        let session = db::crossword::get_session(&self.pool, session_id)
            .await?
            .ok_or_else(|| GameError::not_found(&what))?;
        ensure_owner(&session.user_id, user_id, &what)?;
        Ok(session)
    }

    /// Load, apply `op`, and write back under the version check, re-reading
    /// on conflict.
    async fn mutate<T>(
        &self,
        user_id: &str,
        session_id: i64,
        op: impl Fn(&mut CrosswordSession, &CrosswordPuzzle) -> GameResult<T>,
    ) -> GameResult<(T, CrosswordSession)> {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let mut session = self.get_session(user_id, session_id).await?;
            let puzzle = self.puzzle_by_id(session.puzzle_id).await?;

            let value = op(&mut session, &puzzle)?;

            if db::crossword::save_session(&self.pool, &mut session).await? {
                return Ok((value, session));
            }
            tracing::warn!(session_id, attempt, "crossword session changed underneath, retrying");
        }

        Err(GameError::Conflict(format!("crossword session {session_id}")))
    }

    pub async fn update_grid(
        &self,
        user_id: &str,
        session_id: i64,
        grid: PlayerGrid,
    ) -> GameResult<CrosswordSession> {
        let ((), session) = self
            .mutate(user_id, session_id, |s, p| s.update_grid(grid.clone(), p))
            .await?;
        tracing::debug!(session_id, user_id, "crossword grid updated");
        Ok(session)
    }

    /// Per-word correctness of the saved grid. Free, read-only, and allowed
    /// after completion.
    pub async fn check_answers(&self, user_id: &str, session_id: i64) -> GameResult<CheckResult> {
        let session = self.get_session(user_id, session_id).await?;
        let puzzle = self.puzzle_by_id(session.puzzle_id).await?;
        Ok(session.check_answers(&puzzle))
    }

    pub async fn reveal_cell(&self, user_id: &str, session_id: i64, pos: CellPos) -> GameResult<char> {
        let (letter, session) = self.mutate(user_id, session_id, |s, p| s.reveal_cell(pos, p)).await?;
        tracing::info!(session_id, user_id, %pos, hints_used = session.hints_used, "cell revealed");
        Ok(letter)
    }

    pub async fn check_cell(
        &self,
        user_id: &str,
        session_id: i64,
        pos: CellPos,
        letter: &str,
    ) -> GameResult<bool> {
        let (correct, session) = self
            .mutate(user_id, session_id, |s, p| s.check_cell(pos, letter, p))
            .await?;
        tracing::info!(session_id, user_id, %pos, correct, hints_used = session.hints_used, "cell checked");
        Ok(correct)
    }

    pub async fn reveal_all(&self, user_id: &str, session_id: i64) -> GameResult<RevealAll> {
        let (revealed, _) = self.mutate(user_id, session_id, |s, p| s.reveal_all(p)).await?;
        tracing::info!(session_id, user_id, "crossword fully revealed");
        Ok(revealed)
    }

    pub async fn complete(
        &self,
        user_id: &str,
        session_id: i64,
        completion_time_seconds: i64,
    ) -> GameResult<CrosswordSession> {
        let now = self.clock.now();
        let ((), session) = self
            .mutate(user_id, session_id, |s, _| s.complete(completion_time_seconds, now))
            .await?;
        tracing::info!(session_id, user_id, completion_time_seconds, "crossword completed");
        Ok(session)
    }

    pub async fn stats(&self, user_id: &str) -> GameResult<CrosswordStats> {
        let sessions = db::crossword::completed_sessions(&self.pool, user_id).await?;
        let records: Vec<CrosswordRecord> = sessions.iter().map(CrosswordRecord::from).collect();
        Ok(CrosswordStats::from_records(&records, self.today()))
    }

    /// All sessions, finished or not, newest puzzle first.
    pub async fn history(
        &self,
        user_id: &str,
        page: u32,
        page_size: u32,
    ) -> GameResult<Paginated<CrosswordSession>> {
        let request = PageRequest::new(page, page_size)?;
        let (sessions, total) = db::crossword::history(&self.pool, user_id, request).await?;
        Ok(Paginated::new(sessions, total, request))
    }
}
