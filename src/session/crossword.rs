use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::SessionState;
use crate::crossword::{
    CellPos, CheckResult, CrosswordPuzzle, Entry, PlayerGrid, RevealAll, check_grid,
};
use crate::error::GameError;

/// One user's play of one daily crossword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrosswordSession {
    pub id: i64,
    pub user_id: String,
    pub puzzle_id: i64,
    pub puzzle_date: NaiveDate,
    pub grid: PlayerGrid,
    pub completed: bool,
    pub completion_time_seconds: Option<u32>,
    pub completed_at: Option<DateTime<Utc>>,
    pub revealed_cells: Vec<CellPos>,
    pub hints_used: u32,
    pub revealed_all: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub version: i64,
}

impl CrosswordSession {
    pub fn state(&self) -> SessionState {
        if self.completed {
            SessionState::Completed
        } else {
            SessionState::Active
        }
    }

    fn ensure_active(&self) -> Result<(), GameError> {
        match self.state() {
            SessionState::Active => Ok(()),
            SessionState::Completed => Err(GameError::already_completed(format!(
                "crossword session {}",
                self.id
            ))),
        }
    }

    /// Replace the player's grid.
    pub fn update_grid(&mut self, grid: PlayerGrid, puzzle: &CrosswordPuzzle) -> Result<(), GameError> {
        self.ensure_active()?;
        grid.ensure_fits(&puzzle.content.grid)?;
        self.grid = grid;
        Ok(())
    }

    /// Fill one cell with its answer. Only the first reveal of a cell costs a
    /// hint.
    pub fn reveal_cell(&mut self, pos: CellPos, puzzle: &CrosswordPuzzle) -> Result<char, GameError> {
        self.ensure_active()?;
        let letter = puzzle.content.grid.letter_at(pos)?;

        if !self.revealed_cells.contains(&pos) {
            self.revealed_cells.push(pos);
            self.hints_used += 1;
        }
        self.grid.set(pos, Entry::Letter(letter));

        Ok(letter)
    }

    /// Test one letter against the answer without writing it. Every check
    /// costs a hint.
    pub fn check_cell(
        &mut self,
        pos: CellPos,
        letter: &str,
        puzzle: &CrosswordPuzzle,
    ) -> Result<bool, GameError> {
        self.ensure_active()?;
        let expected = puzzle.content.grid.letter_at(pos)?;
        let guess = match Entry::from_letter(letter)? {
            Entry::Letter(c) => c,
            _ => return Err(GameError::validation("letter is required")),
        };

        self.hints_used += 1;
        Ok(guess == expected)
    }

    /// Fill the whole grid. Counts as a single hint.
    pub fn reveal_all(&mut self, puzzle: &CrosswordPuzzle) -> Result<RevealAll, GameError> {
        self.ensure_active()?;
        self.revealed_all = true;
        self.hints_used += 1;
        self.grid = puzzle.content.grid.solved();
        Ok(puzzle.reveal_all())
    }

    /// Close the session with the client-reported solve time.
    pub fn complete(&mut self, completion_time_seconds: i64, now: DateTime<Utc>) -> Result<(), GameError> {
        self.ensure_active()?;
        let seconds = u32::try_from(completion_time_seconds)
            .ok()
            .filter(|s| *s > 0)
            .ok_or_else(|| GameError::validation("completion time must be a positive number of seconds"))?;

        self.completed = true;
        self.completion_time_seconds = Some(seconds);
        self.completed_at = Some(now);
        Ok(())
    }

    /// Read-only answer check; free and available after completion.
    pub fn check_answers(&self, puzzle: &CrosswordPuzzle) -> CheckResult {
        check_grid(
            &self.grid,
            &puzzle.content.grid,
            &puzzle.slots,
            &puzzle.content.answers_across,
            &puzzle.content.answers_down,
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::crossword::puzzle::tests::sample_content;

    pub(crate) fn puzzle() -> CrosswordPuzzle {
        let content = sample_content();
        CrosswordPuzzle {
            id: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            slots: CrosswordPuzzle::layout(&content),
            content,
            created_at: Utc::now(),
        }
    }

    fn session(puzzle: &CrosswordPuzzle) -> CrosswordSession {
        CrosswordSession {
            id: 1,
            user_id: "user_1".into(),
            puzzle_id: puzzle.id,
            puzzle_date: puzzle.date,
            grid: puzzle.content.grid.blank(),
            completed: false,
            completion_time_seconds: None,
            completed_at: None,
            revealed_cells: Vec::new(),
            hints_used: 0,
            revealed_all: false,
            created_at: Utc::now(),
            version: 0,
        }
    }

    #[test]
    fn test_reveal_cell_is_idempotent_for_hints() {
        let p = puzzle();
        let mut s = session(&p);
        let pos = CellPos::new(2, 4);

        assert_eq!(s.reveal_cell(pos, &p).unwrap(), 'D');
        assert_eq!(s.reveal_cell(pos, &p).unwrap(), 'D');
        assert_eq!(s.hints_used, 1);
        assert_eq!(s.revealed_cells, vec![pos]);
        assert!(s.grid.holds(pos, 'D'));
    }

    #[test]
    fn test_reveal_black_cell_is_validation_error() {
        let p = puzzle();
        let mut s = session(&p);
        let err = s.reveal_cell(CellPos::new(0, 3), &p).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(s.hints_used, 0);

        assert!(s.reveal_cell(CellPos::new(7, 0), &p).unwrap_err().is_validation());
    }

    #[test]
    fn test_check_cell_always_costs_a_hint() {
        let p = puzzle();
        let mut s = session(&p);
        let pos = CellPos::new(0, 0);

        assert!(s.check_cell(pos, "a", &p).unwrap());
        assert!(!s.check_cell(pos, "B", &p).unwrap());
        assert_eq!(s.hints_used, 2);
        assert_eq!(s.grid.get(pos), Some(Entry::Empty));

        assert!(s.check_cell(pos, "ab", &p).unwrap_err().is_validation());
        assert!(s.check_cell(CellPos::new(0, 4), "a", &p).unwrap_err().is_validation());
        assert_eq!(s.hints_used, 2);
    }

    #[test]
    fn test_reveal_all_fills_grid_and_counts_once() {
        let p = puzzle();
        let mut s = session(&p);
        let revealed = s.reveal_all(&p).unwrap();

        assert!(s.revealed_all);
        assert_eq!(s.hints_used, 1);
        assert_eq!(revealed.complete_grid, p.content.grid);
        assert_eq!(revealed.answers_down["5"], "NRES");
        assert!(s.check_answers(&p).all_correct);
    }

    #[test]
    fn test_update_grid_checks_shape() {
        let p = puzzle();
        let mut s = session(&p);
        assert!(s.update_grid(p.content.grid.solved(), &p).is_ok());
        assert!(s.check_answers(&p).all_correct);

        let tiny = PlayerGrid::try_from(vec![vec!["A".to_string()]]).unwrap();
        assert!(s.update_grid(tiny, &p).unwrap_err().is_validation());
    }

    #[test]
    fn test_complete_requires_positive_time() {
        let p = puzzle();
        let mut s = session(&p);
        assert!(s.complete(0, Utc::now()).unwrap_err().is_validation());
        assert!(s.complete(-5, Utc::now()).unwrap_err().is_validation());
        assert!(!s.completed);

        s.complete(95, Utc::now()).unwrap();
        assert!(s.completed);
        assert_eq!(s.completion_time_seconds, Some(95));
    }

    #[test]
    fn test_completed_session_rejects_every_mutation() {
        let p = puzzle();
        let mut s = session(&p);
        s.complete(60, Utc::now()).unwrap();
        let before = s.clone();

        let pos = CellPos::new(0, 0);
        assert!(s.update_grid(p.content.grid.solved(), &p).unwrap_err().is_already_completed());
        assert!(s.reveal_cell(pos, &p).unwrap_err().is_already_completed());
        assert!(s.check_cell(pos, "A", &p).unwrap_err().is_already_completed());
        assert!(s.reveal_all(&p).unwrap_err().is_already_completed());
        assert!(s.complete(10, Utc::now()).unwrap_err().is_already_completed());
        assert_eq!(s, before);

        // Checking answers is read-only and still allowed.
        assert!(!s.check_answers(&p).all_correct);
    }
}
