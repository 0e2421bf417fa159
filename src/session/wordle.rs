use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::SessionState;
use crate::error::GameError;
use crate::feedback::{LetterResult, evaluate, is_solved};
use crate::vocabulary::Vocabulary;

pub const MAX_ATTEMPTS: u32 = 6;

/// One user's play of one daily Wordle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordleSession {
    pub id: i64,
    pub user_id: String,
    pub challenge_id: i64,
    pub puzzle_date: NaiveDate,
    pub guesses: Vec<String>,
    pub guess_results: Vec<Vec<LetterResult>>,
    pub won: bool,
    pub attempts_used: u32,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub version: i64,
}

/// Response to an accepted guess. `answer` is only disclosed once the game is
/// over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuessOutcome {
    pub guess: String,
    pub result: Vec<LetterResult>,
    pub is_correct: bool,
    pub attempts_used: u32,
    pub game_over: bool,
    pub won: Option<bool>,
    pub answer: Option<String>,
}

impl WordleSession {
    pub fn state(&self) -> SessionState {
        if self.completed_at.is_some() {
            SessionState::Completed
        } else {
            SessionState::Active
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state() == SessionState::Completed
    }

    /// Score a guess and advance the session.
    ///
    /// Nothing is mutated unless the session is active and the guess passes
    /// validation, so a rejected guess never consumes an attempt.
    pub fn submit_guess(
        &mut self,
        guess: &str,
        answer: &str,
        vocabulary: &Vocabulary,
        now: DateTime<Utc>,
    ) -> Result<GuessOutcome, GameError> {
        if self.is_completed() {
            return Err(GameError::already_completed(format!("wordle session {}", self.id)));
        }

        let guess = validate_guess(guess, answer.len(), vocabulary)?;
        let result = evaluate(&guess, answer);
        let is_correct = is_solved(&result);

        self.guesses.push(guess.clone());
        self.guess_results.push(result.clone());
        self.attempts_used += 1;

        let won = if is_correct {
            Some(true)
        } else if self.attempts_used >= MAX_ATTEMPTS {
            Some(false)
        } else {
            None
        };

        if let Some(won) = won {
            self.won = won;
            self.completed_at = Some(now);
        }

        Ok(GuessOutcome {
            guess,
            result,
            is_correct,
            attempts_used: self.attempts_used,
            game_over: won.is_some(),
            won,
            answer: won.map(|_| answer.to_lowercase()),
        })
    }

    /// Feedback for every guess so far, recomputed from the answer when the
    /// stored copy is missing or stale.
    pub fn results(&self, answer: &str) -> Vec<Vec<LetterResult>> {
        if self.guess_results.len() == self.guesses.len() {
            return self.guess_results.clone();
        }
        self.guesses.iter().map(|g| evaluate(g, answer)).collect()
    }
}

/// Normalize a guess and check it is a dictionary word of the answer's length.
pub fn validate_guess(
    guess: &str,
    answer_len: usize,
    vocabulary: &Vocabulary,
) -> Result<String, GameError> {
    let guess = guess.trim().to_lowercase();

    if guess.chars().count() != answer_len {
        return Err(GameError::validation(format!(
            "guess must be {answer_len} letters"
        )));
    }
    if !guess.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(GameError::validation("guess must contain only letters"));
    }
    if !vocabulary.is_valid_word(&guess) {
        return Err(GameError::validation(format!("{guess:?} is not in the word list")));
    }

    Ok(guess)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::LetterStatus;

    fn vocab() -> Vocabulary {
        Vocabulary::new(
            ["spade", "crane"],
            ["speed", "slate", "about", "house", "world", "magic", "stone", "raise"],
        )
        .unwrap()
    }

    fn session() -> WordleSession {
        let created = DateTime::parse_from_rfc3339("2024-01-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        WordleSession {
            id: 1,
            user_id: "user_1".into(),
            challenge_id: 1,
            puzzle_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            guesses: Vec::new(),
            guess_results: Vec::new(),
            won: false,
            attempts_used: 0,
            completed_at: None,
            created_at: created,
            version: 0,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_win_on_attempt_k() {
        let vocab = vocab();
        let mut s = session();
        s.submit_guess("speed", "spade", &vocab, now()).unwrap();
        s.submit_guess("slate", "spade", &vocab, now()).unwrap();
        let outcome = s.submit_guess("SPADE", "spade", &vocab, now()).unwrap();

        assert!(outcome.is_correct);
        assert!(outcome.game_over);
        assert_eq!(outcome.won, Some(true));
        assert_eq!(outcome.attempts_used, 3);
        assert_eq!(outcome.answer.as_deref(), Some("spade"));
        assert!(s.won);
        assert_eq!(s.attempts_used, 3);
        assert!(s.is_completed());
    }

    #[test]
    fn test_loss_after_six_misses() {
        let vocab = vocab();
        let mut s = session();
        let misses = ["speed", "slate", "about", "house", "world", "magic"];
        for (i, guess) in misses.iter().enumerate() {
            let outcome = s.submit_guess(guess, "spade", &vocab, now()).unwrap();
            assert_eq!(outcome.game_over, i == misses.len() - 1);
            if !outcome.game_over {
                assert_eq!(outcome.answer, None);
                assert_eq!(outcome.won, None);
            }
        }

        assert!(s.is_completed());
        assert!(!s.won);
        assert_eq!(s.attempts_used, MAX_ATTEMPTS);
    }

    #[test]
    fn test_completed_session_rejects_guesses_unchanged() {
        let vocab = vocab();
        let mut s = session();
        s.submit_guess("spade", "spade", &vocab, now()).unwrap();
        let before = s.clone();

        let err = s.submit_guess("crane", "spade", &vocab, now()).unwrap_err();
        assert!(err.is_already_completed());
        assert_eq!(s, before);
    }

    #[test]
    fn test_invalid_guesses_do_not_consume_attempts() {
        let vocab = vocab();
        let mut s = session();

        for bad in ["spad", "spades", "sp4de", "zzzzz", ""] {
            let err = s.submit_guess(bad, "spade", &vocab, now()).unwrap_err();
            assert!(err.is_validation(), "{bad}");
        }
        assert_eq!(s.attempts_used, 0);
        assert!(s.guesses.is_empty());
        assert!(s.guess_results.is_empty());
    }

    #[test]
    fn test_guess_results_are_stored() {
        let vocab = vocab();
        let mut s = session();
        s.submit_guess("speed", "spade", &vocab, now()).unwrap();
        assert_eq!(s.guess_results.len(), 1);
        assert_eq!(s.guess_results[0][3].status, LetterStatus::Absent);
    }

    #[test]
    fn test_results_recomputed_when_missing() {
        let mut s = session();
        s.guesses = vec!["speed".into(), "crane".into()];
        let results = s.results("spade");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], evaluate("speed", "spade"));
    }

    #[test]
    fn test_validate_guess_normalizes() {
        assert_eq!(validate_guess(" Crane ", 5, &vocab()).unwrap(), "crane");
    }
}
