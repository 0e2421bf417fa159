use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;

use super::{MAX_WRITE_ATTEMPTS, ensure_owner};
use crate::clock::Clock;
use crate::daily::{ChallengeInfo, DailyChallenge, DailySelector};
use crate::db;
use crate::error::{GameError, GameResult};
use crate::feedback::LetterResult;
use crate::pagination::{PageRequest, Paginated};
use crate::session::{GuessOutcome, MAX_ATTEMPTS, WordleSession};
use crate::stats::{WordleRecord, WordleStats};
use crate::vocabulary::Vocabulary;

/// A session as shown to its owner. The answer appears once the game is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordleSessionView {
    pub session_id: i64,
    pub date: NaiveDate,
    pub guesses: Vec<String>,
    pub guess_results: Vec<Vec<LetterResult>>,
    pub attempts_used: u32,
    pub max_attempts: u32,
    pub completed: bool,
    pub won: Option<bool>,
    pub answer: Option<String>,
}

impl WordleSessionView {
    fn new(session: &WordleSession, answer: &str) -> Self {
        let completed = session.is_completed();
        Self {
            session_id: session.id,
            date: session.puzzle_date,
            guesses: session.guesses.clone(),
            guess_results: session.results(answer),
            attempts_used: session.attempts_used,
            max_attempts: MAX_ATTEMPTS,
            completed,
            won: completed.then_some(session.won),
            answer: completed.then(|| answer.to_string()),
        }
    }
}

pub struct WordleService {
    pool: SqlitePool,
    vocabulary: Arc<Vocabulary>,
    selector: DailySelector,
    clock: Arc<dyn Clock>,
}

impl WordleService {
    pub fn new(
        pool: SqlitePool,
        vocabulary: Arc<Vocabulary>,
        secret: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let selector = DailySelector::new(Arc::clone(&vocabulary), secret);
        Self {
            pool,
            vocabulary,
            selector,
            clock,
        }
    }

    fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// The stored challenge for a date, created from the daily selection on
    /// first use.
    async fn challenge_for(&self, date: NaiveDate) -> GameResult<DailyChallenge> {
        let answer = self.selector.daily_answer(date);
        Ok(db::wordle::get_or_create_challenge(&self.pool, date, answer, self.clock.now()).await?)
    }

    async fn challenge_by_id(&self, id: i64) -> GameResult<DailyChallenge> {
        db::wordle::get_challenge_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| GameError::not_found(format!("wordle challenge {id}")))
    }

    /// Challenge id and date for `date` (default today), without the word.
    pub async fn daily_challenge(&self, date: Option<NaiveDate>) -> GameResult<ChallengeInfo> {
        let date = date.unwrap_or_else(|| self.today());
        Ok(self.challenge_for(date).await?.info())
    }

    /// The daily answer itself. For operators, never for players.
    pub async fn daily_word(&self, date: Option<NaiveDate>) -> GameResult<String> {
        let date = date.unwrap_or_else(|| self.today());
        Ok(self.challenge_for(date).await?.answer)
    }

    /// False once the user has finished today's puzzle.
    pub async fn can_play_today(&self, user_id: &str) -> GameResult<bool> {
        let done = db::wordle::has_completed(&self.pool, user_id, self.today()).await?;
        Ok(!done)
    }

    /// Begin a session on `date` (default today). Each day's puzzle can be
    /// finished once; an unfinished session for the day is handed back
    /// instead of opening another.
    pub async fn start_session(
        &self,
        user_id: &str,
        date: Option<NaiveDate>,
    ) -> GameResult<WordleSessionView> {
        let date = date.unwrap_or_else(|| self.today());
        if db::wordle::has_completed(&self.pool, user_id, date).await? {
            return Err(GameError::already_completed(format!("wordle for {user_id} on {date}")));
        }

        match db::wordle::latest_session_for_date(&self.pool, user_id, date).await? {
            Some(session) if !session.is_completed() => {
                let challenge = self.challenge_by_id(session.challenge_id).await?;
                tracing::debug!(session_id = session.id, user_id, %date, "resuming wordle session");
                return Ok(WordleSessionView::new(&session, &challenge.answer));
            }
            _ => {}
        }

        let challenge = self.challenge_for(date).await?;
        let session = db::wordle::insert_session(&self.pool, user_id, &challenge, self.clock.now()).await?;
        tracing::info!(session_id = session.id, user_id, %date, "wordle session started");

        Ok(WordleSessionView::new(&session, &challenge.answer))
    }

    /// Most recent session of the user for `date` (default today).
    pub async fn todays_session(
        &self,
        user_id: &str,
        date: Option<NaiveDate>,
    ) -> GameResult<Option<WordleSessionView>> {
        let date = date.unwrap_or_else(|| self.today());
        let Some(session) = db::wordle::latest_session_for_date(&self.pool, user_id, date).await? else {
            return Ok(None);
        };
        let challenge = self.challenge_by_id(session.challenge_id).await?;
        Ok(Some(WordleSessionView::new(&session, &challenge.answer)))
    }

    pub async fn get_session(&self, user_id: &str, session_id: i64) -> GameResult<WordleSessionView> {
        let session = self.load_owned(user_id, session_id).await?;
        let challenge = self.challenge_by_id(session.challenge_id).await?;
        Ok(WordleSessionView::new(&session, &challenge.answer))
    }

    async fn load_owned(&self, user_id: &str, session_id: i64) -> GameResult<WordleSession> {
        let what = format!("wordle session {session_id}");
        let session = db::wordle::get_session(&self.pool, session_id)
            .await?
            .ok_or_else(|| GameError::not_found(&what))?;
        ensure_owner(&session.user_id, user_id, &what)?;
        Ok(session)
    }

    pub async fn submit_guess(
        &self,
        user_id: &str,
        session_id: i64,
        guess: &str,
    ) -> GameResult<GuessOutcome> {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let mut session = self.load_owned(user_id, session_id).await?;
            let challenge = self.challenge_by_id(session.challenge_id).await?;

            let outcome = session.submit_guess(guess, &challenge.answer, &self.vocabulary, self.clock.now())?;

            if db::wordle::save_session(&self.pool, &mut session).await? {
                tracing::info!(
                    session_id,
                    user_id,
                    attempt = outcome.attempts_used,
                    game_over = outcome.game_over,
                    "guess recorded"
                );
                return Ok(outcome);
            }
            tracing::warn!(session_id, attempt, "wordle session changed underneath, retrying");
        }

        Err(GameError::Conflict(format!("wordle session {session_id}")))
    }

    pub async fn stats(&self, user_id: &str) -> GameResult<WordleStats> {
        let sessions = db::wordle::completed_sessions(&self.pool, user_id).await?;
        let records: Vec<WordleRecord> = sessions.iter().map(WordleRecord::from).collect();
        Ok(WordleStats::from_records(&records, self.today()))
    }

    /// Finished games, newest puzzle first.
    pub async fn history(
        &self,
        user_id: &str,
        page: u32,
        page_size: u32,
    ) -> GameResult<Paginated<WordleSessionView>> {
        let request = PageRequest::new(page, page_size)?;
        let (sessions, total) = db::wordle::history(&self.pool, user_id, request).await?;

        let mut items = Vec::with_capacity(sessions.len());
        for session in &sessions {
            let challenge = self.challenge_by_id(session.challenge_id).await?;
            items.push(WordleSessionView::new(session, &challenge.answer));
        }
        Ok(Paginated::new(items, total, request))
    }
}
