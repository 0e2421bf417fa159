use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::grid::SolutionGrid;
use super::layout::{WordSlot, number_slots};
use crate::error::GameError;

pub const MAX_GRID_SIZE: usize = 5;
pub const MIN_WORDS_PER_DIRECTION: usize = 3;

/// Clue number → text (or answer), keyed the way the content provider numbers
/// them.
pub type ClueMap = BTreeMap<String, String>;

/// Puzzle content as produced by a crossword source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleContent {
    pub grid: SolutionGrid,
    pub clues_across: ClueMap,
    pub clues_down: ClueMap,
    pub answers_across: ClueMap,
    pub answers_down: ClueMap,
}

impl PuzzleContent {
    /// Structural checks applied to generated content before it is stored.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.grid.height() > MAX_GRID_SIZE || self.grid.width() > MAX_GRID_SIZE {
            return Err(GameError::validation(format!(
                "grid is {}x{}, exceeds {MAX_GRID_SIZE}x{MAX_GRID_SIZE} maximum",
                self.grid.height(),
                self.grid.width()
            )));
        }

        for (label, answers, clues) in [
            ("across", &self.answers_across, &self.clues_across),
            ("down", &self.answers_down, &self.clues_down),
        ] {
            if answers.len() < MIN_WORDS_PER_DIRECTION {
                return Err(GameError::validation(format!(
                    "must have at least {MIN_WORDS_PER_DIRECTION} words {label}, got {}",
                    answers.len()
                )));
            }
            for (num, answer) in answers {
                if !clues.contains_key(num) {
                    return Err(GameError::validation(format!(
                        "answer {label} {num} has no corresponding clue"
                    )));
                }
                if answer.trim().is_empty() {
                    return Err(GameError::validation(format!(
                        "answer {label} {num} must be a non-empty string"
                    )));
                }
            }
        }

        Ok(())
    }
}

/// A stored daily crossword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrosswordPuzzle {
    pub id: i64,
    pub date: NaiveDate,
    pub content: PuzzleContent,
    pub slots: Vec<WordSlot>,
    pub created_at: DateTime<Utc>,
}

impl CrosswordPuzzle {
    /// Word positions for freshly generated content.
    pub fn layout(content: &PuzzleContent) -> Vec<WordSlot> {
        number_slots(&content.grid)
    }

    /// Client view: grid shape with letters hidden, plus clues.
    pub fn info(&self) -> PuzzleInfo {
        PuzzleInfo {
            puzzle_id: self.id,
            date: self.date,
            grid: self.content.grid.masked(),
            clues_across: self.content.clues_across.clone(),
            clues_down: self.content.clues_down.clone(),
        }
    }

    pub fn reveal_all(&self) -> RevealAll {
        RevealAll {
            complete_grid: self.content.grid.clone(),
            answers_across: self.content.answers_across.clone(),
            answers_down: self.content.answers_down.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleInfo {
    pub puzzle_id: i64,
    pub date: NaiveDate,
    pub grid: Vec<Vec<String>>,
    pub clues_across: ClueMap,
    pub clues_down: ClueMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealAll {
    pub complete_grid: SolutionGrid,
    pub answers_across: ClueMap,
    pub answers_down: ClueMap,
}
