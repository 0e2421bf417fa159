//! Word-slot discovery and clue numbering.

use serde::{Deserialize, Serialize};

use super::grid::{CellPos, SolutionGrid};

/// Shortest run of open cells that counts as a word.
pub const MIN_WORD_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Across,
    Down,
}

/// Where one answer lives in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSlot {
    pub number: u32,
    pub direction: Direction,
    pub row: usize,
    pub col: usize,
    pub length: usize,
}

impl WordSlot {
    pub fn cells(&self) -> impl Iterator<Item = CellPos> + '_ {
        (0..self.length).map(move |i| match self.direction {
            Direction::Across => CellPos::new(self.row, self.col + i),
            Direction::Down => CellPos::new(self.row + i, self.col),
        })
    }

    /// The slot's word as spelled by the solution.
    pub fn text(&self, grid: &SolutionGrid) -> String {
        self.cells()
            .filter_map(|pos| grid.letter_at(pos).ok())
            .collect()
    }
}

/// Scan the grid for maximal runs of at least [`MIN_WORD_LEN`] open cells and
/// number them in reading order. A cell gets the next number the first time
/// it starts an across or a down run; a cell that starts both shares one
/// number.
pub fn number_slots(grid: &SolutionGrid) -> Vec<WordSlot> {
    let mut slots = Vec::new();
    let mut next = 1;

    for row in 0..grid.height() {
        for col in 0..grid.width() {
            let pos = CellPos::new(row, col);
            if !grid.is_open(pos) {
                continue;
            }

            let across = starts_run(grid, pos, Direction::Across);
            let down = starts_run(grid, pos, Direction::Down);
            if across.is_none() && down.is_none() {
                continue;
            }

            for (direction, length) in [(Direction::Across, across), (Direction::Down, down)] {
                if let Some(length) = length {
                    slots.push(WordSlot {
                        number: next,
                        direction,
                        row,
                        col,
                        length,
                    });
                }
            }
            next += 1;
        }
    }

    slots
}

/// Length of the run starting at `pos`, if `pos` begins a long enough run.
fn starts_run(grid: &SolutionGrid, pos: CellPos, direction: Direction) -> Option<usize> {
    let before = match direction {
        Direction::Across => pos.col.checked_sub(1).map(|c| CellPos::new(pos.row, c)),
        Direction::Down => pos.row.checked_sub(1).map(|r| CellPos::new(r, pos.col)),
    };
    if before.is_some_and(|p| grid.is_open(p)) {
        return None;
    }

    let length = (0..)
        .map(|i| match direction {
            Direction::Across => CellPos::new(pos.row, pos.col + i),
            Direction::Down => CellPos::new(pos.row + i, pos.col),
        })
        .take_while(|p| grid.is_open(*p))
        .count();

    (length >= MIN_WORD_LEN).then_some(length)
}

pub fn find_slot(slots: &[WordSlot], number: u32, direction: Direction) -> Option<&WordSlot> {
    slots
        .iter()
        .find(|s| s.number == number && s.direction == direction)
}
