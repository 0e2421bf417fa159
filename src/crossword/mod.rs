//! Crossword grids, word layout and answer checking.

pub mod checker;
pub mod grid;
pub mod layout;
pub mod puzzle;

pub use checker::{CheckResult, check_grid};
pub use grid::{Cell, CellPos, Entry, PlayerGrid, SolutionGrid};
pub use layout::{Direction, WordSlot, number_slots};
pub use puzzle::{ClueMap, CrosswordPuzzle, PuzzleContent, PuzzleInfo, RevealAll};
