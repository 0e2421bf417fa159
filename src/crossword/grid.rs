//! Typed crossword grids.
//!
//! On the wire a grid is a list of rows of one-character strings, with `"."`
//! for a block and `""` for an unfilled player cell. Inside the crate those
//! sentinels are parsed once into [`Cell`] and [`Entry`].

use serde::{Deserialize, Serialize};

use crate::error::GameError;

const BLOCK: &str = ".";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for CellPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A solution cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Block,
    Letter(char),
}

/// A player cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Block,
    Empty,
    Letter(char),
}

impl Entry {
    /// Build a player entry from a single typed letter.
    pub fn from_letter(letter: &str) -> Result<Self, GameError> {
        match parse_letter(letter) {
            Some(c) => Ok(Entry::Letter(c)),
            None => Err(GameError::validation(format!(
                "{letter:?} is not a single letter"
            ))),
        }
    }
}

fn parse_letter(raw: &str) -> Option<char> {
    let mut chars = raw.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_uppercase()),
        _ => None,
    }
}

/// The answer grid of a puzzle. Always rectangular and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<String>>", into = "Vec<Vec<String>>")]
pub struct SolutionGrid {
    rows: Vec<Vec<Cell>>,
}

impl SolutionGrid {
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn get(&self, pos: CellPos) -> Option<Cell> {
        self.rows.get(pos.row).and_then(|r| r.get(pos.col)).copied()
    }

    pub fn is_open(&self, pos: CellPos) -> bool {
        matches!(self.get(pos), Some(Cell::Letter(_)))
    }

    /// Solution letter of an open cell; out-of-range and blocked cells are
    /// input errors.
    pub fn letter_at(&self, pos: CellPos) -> Result<char, GameError> {
        match self.get(pos) {
            Some(Cell::Letter(c)) => Ok(c),
            Some(Cell::Block) => Err(GameError::validation(format!("cell {pos} is a black cell"))),
            None => Err(GameError::validation(format!("cell {pos} is out of bounds"))),
        }
    }

    /// Open cells in reading order.
    pub fn open_cells(&self) -> impl Iterator<Item = (CellPos, char)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter().enumerate().filter_map(move |(c, cell)| match cell {
                Cell::Letter(l) => Some((CellPos::new(r, c), *l)),
                Cell::Block => None,
            })
        })
    }

    /// Player grid with the same blocks and every open cell empty.
    pub fn blank(&self) -> PlayerGrid {
        self.map_entries(|_| Entry::Empty)
    }

    /// Player grid holding the full solution.
    pub fn solved(&self) -> PlayerGrid {
        self.map_entries(Entry::Letter)
    }

    /// Wire form with letters hidden, for clients that must not see answers.
    pub fn masked(&self) -> Vec<Vec<String>> {
        self.blank().into()
    }

    fn map_entries(&self, f: impl Fn(char) -> Entry) -> PlayerGrid {
        PlayerGrid {
            rows: self
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| match cell {
                            Cell::Block => Entry::Block,
                            Cell::Letter(c) => f(*c),
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

impl TryFrom<Vec<Vec<String>>> for SolutionGrid {
    type Error = String;

    fn try_from(raw: Vec<Vec<String>>) -> Result<Self, Self::Error> {
        if raw.is_empty() || raw[0].is_empty() {
            return Err("grid must be non-empty".into());
        }
        let width = raw[0].len();

        let mut rows = Vec::with_capacity(raw.len());
        for (r, raw_row) in raw.into_iter().enumerate() {
            if raw_row.len() != width {
                return Err(format!("grid row {r} has {} cells, expected {width}", raw_row.len()));
            }
            let row = raw_row
                .iter()
                .enumerate()
                .map(|(c, s)| {
                    if s == BLOCK {
                        Ok(Cell::Block)
                    } else {
                        parse_letter(s)
                            .filter(|_| s.len() == 1)
                            .map(Cell::Letter)
                            .ok_or_else(|| format!("grid cell [{r}][{c}] must be A-Z or '.', got {s:?}"))
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }
        Ok(Self { rows })
    }
}

impl From<SolutionGrid> for Vec<Vec<String>> {
    fn from(grid: SolutionGrid) -> Self {
        grid.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Cell::Block => BLOCK.to_string(),
                        Cell::Letter(c) => c.to_string(),
                    })
                    .collect()
            })
            .collect()
    }
}

/// A player's work-in-progress grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<String>>", into = "Vec<Vec<String>>")]
pub struct PlayerGrid {
    rows: Vec<Vec<Entry>>,
}

impl PlayerGrid {
    pub fn get(&self, pos: CellPos) -> Option<Entry> {
        self.rows.get(pos.row).and_then(|r| r.get(pos.col)).copied()
    }

    pub fn set(&mut self, pos: CellPos, entry: Entry) {
        if let Some(cell) = self.rows.get_mut(pos.row).and_then(|r| r.get_mut(pos.col)) {
            *cell = entry;
        }
    }

    /// Whether the player's letter at `pos` equals `expected`.
    pub fn holds(&self, pos: CellPos, expected: char) -> bool {
        matches!(self.get(pos), Some(Entry::Letter(c)) if c.eq_ignore_ascii_case(&expected))
    }

    /// Reject grids whose dimensions or blocks differ from the solution.
    pub fn ensure_fits(&self, solution: &SolutionGrid) -> Result<(), GameError> {
        if self.rows.len() != solution.height()
            || self.rows.iter().any(|row| row.len() != solution.width())
        {
            return Err(GameError::validation(format!(
                "grid must be {}x{}",
                solution.height(),
                solution.width()
            )));
        }

        for (r, row) in self.rows.iter().enumerate() {
            for (c, entry) in row.iter().enumerate() {
                let pos = CellPos::new(r, c);
                let blocked = !solution.is_open(pos);
                if blocked != (*entry == Entry::Block) {
                    return Err(GameError::validation(format!(
                        "black cells do not line up with the puzzle at {pos}"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl TryFrom<Vec<Vec<String>>> for PlayerGrid {
    type Error = String;

    fn try_from(raw: Vec<Vec<String>>) -> Result<Self, Self::Error> {
        let rows = raw
            .iter()
            .enumerate()
            .map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(|(c, s)| {
                        if s == BLOCK {
                            Ok(Entry::Block)
                        } else if s.trim().is_empty() {
                            Ok(Entry::Empty)
                        } else {
                            parse_letter(s)
                                .map(Entry::Letter)
                                .ok_or_else(|| format!("grid cell [{r}][{c}] must be a letter, '' or '.', got {s:?}"))
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }
}

impl From<PlayerGrid> for Vec<Vec<String>> {
    fn from(grid: PlayerGrid) -> Self {
        grid.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|entry| match entry {
                        Entry::Block => BLOCK.to_string(),
                        Entry::Empty => String::new(),
                        Entry::Letter(c) => c.to_string(),
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn raw(rows: &[&str]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.chars().map(|c| c.to_string()).collect())
            .collect()
    }

    /// The 5x5 sample grid used across crossword tests.
    pub(crate) fn sample_solution() -> SolutionGrid {
        SolutionGrid::try_from(raw(&["AHA..", "SWAN.", "BOARD", "ONKEY", "AGES."])).unwrap()
    }

    #[test]
    fn test_parse_solution_grid() {
        let grid = sample_solution();
        assert_eq!(grid.height(), 5);
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.get(CellPos::new(0, 3)), Some(Cell::Block));
        assert_eq!(grid.get(CellPos::new(2, 4)), Some(Cell::Letter('D')));
        assert_eq!(grid.get(CellPos::new(5, 0)), None);
    }

    #[test]
    fn test_solution_letters_are_uppercased() {
        let grid = SolutionGrid::try_from(raw(&["abc", "d.e"])).unwrap();
        assert_eq!(grid.letter_at(CellPos::new(0, 0)).unwrap(), 'A');
    }

    #[test]
    fn test_rejects_bad_solution_grids() {
        assert!(SolutionGrid::try_from(Vec::new()).is_err());
        assert!(SolutionGrid::try_from(raw(&["ABC", "AB"])).is_err());
        assert!(SolutionGrid::try_from(raw(&["AB1"])).is_err());
        assert!(SolutionGrid::try_from(vec![vec!["AB".to_string()]]).is_err());
        assert!(SolutionGrid::try_from(vec![vec!["".to_string()]]).is_err());
    }

    #[test]
    fn test_letter_at_rejects_blocks_and_out_of_range() {
        let grid = sample_solution();
        assert!(grid.letter_at(CellPos::new(0, 4)).unwrap_err().is_validation());
        assert!(grid.letter_at(CellPos::new(9, 9)).unwrap_err().is_validation());
    }

    #[test]
    fn test_json_round_trip_keeps_sentinels() {
        let grid = sample_solution();
        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(json[0][3], ".");
        assert_eq!(json[2][4], "D");

        let blank = grid.blank();
        let json = serde_json::to_value(&blank).unwrap();
        assert_eq!(json[0][0], "");
        assert_eq!(json[0][3], ".");
        let back: PlayerGrid = serde_json::from_value(json).unwrap();
        assert_eq!(back, blank);
    }

    #[test]
    fn test_masked_hides_letters() {
        let masked = sample_solution().masked();
        assert!(masked.iter().flatten().all(|c| c.is_empty() || c == "."));
    }

    #[test]
    fn test_player_grid_shape_checks() {
        let solution = sample_solution();
        assert!(solution.blank().ensure_fits(&solution).is_ok());

        let wrong_size: PlayerGrid = PlayerGrid::try_from(raw(&["AHA", "SWA"])).unwrap();
        assert!(wrong_size.ensure_fits(&solution).is_err());

        // Letter typed into a black cell
        let mut rows = raw(&["AHA..", "SWAN.", "BOARD", "ONKEY", "AGES."]);
        rows[0][3] = "X".into();
        let shifted = PlayerGrid::try_from(rows).unwrap();
        assert!(shifted.ensure_fits(&solution).unwrap_err().is_validation());
    }

    #[test]
    fn test_player_entries() {
        let mut grid = sample_solution().blank();
        let pos = CellPos::new(1, 1);
        assert_eq!(grid.get(pos), Some(Entry::Empty));
        grid.set(pos, Entry::from_letter("w").unwrap());
        assert!(grid.holds(pos, 'W'));
        assert!(Entry::from_letter("ww").is_err());
        assert!(Entry::from_letter("7").is_err());
    }
}
