use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::grid::{PlayerGrid, SolutionGrid};
use super::layout::{Direction, WordSlot, find_slot};
use super::puzzle::ClueMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub correct_across: BTreeMap<String, bool>,
    pub correct_down: BTreeMap<String, bool>,
    pub all_correct: bool,
}

/// Compare a player grid with the solution.
///
/// Black cells are skipped. A word is correct when every cell of its slot
/// matches. Answer numbers with no matching slot (content numbered
/// differently from the scan) are only marked correct when the whole grid is.
pub fn check_grid(
    user: &PlayerGrid,
    solution: &SolutionGrid,
    slots: &[WordSlot],
    answers_across: &ClueMap,
    answers_down: &ClueMap,
) -> CheckResult {
    let all_correct = solution
        .open_cells()
        .all(|(pos, expected)| user.holds(pos, expected));

    let word_correct = |slot: &WordSlot| {
        slot.cells().all(|pos| match solution.letter_at(pos) {
            Ok(expected) => user.holds(pos, expected),
            Err(_) => false,
        })
    };

    let judge = |answers: &ClueMap, direction: Direction| -> BTreeMap<String, bool> {
        answers
            .keys()
            .map(|num| {
                let slot = num
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .and_then(|n| find_slot(slots, n, direction));
                let correct = match slot {
                    Some(slot) => word_correct(slot),
                    None => all_correct,
                };
                (num.clone(), correct)
            })
            .collect()
    };

    CheckResult {
        correct_across: judge(answers_across, Direction::Across),
        correct_down: judge(answers_down, Direction::Down),
        all_correct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossword::grid::{CellPos, Entry};
    use crate::crossword::layout::number_slots;
    use crate::crossword::puzzle::tests::sample_content;

    fn check(user: &PlayerGrid) -> CheckResult {
        let content = sample_content();
        let slots = number_slots(&content.grid);
        check_grid(
            user,
            &content.grid,
            &slots,
            &content.answers_across,
            &content.answers_down,
        )
    }

    #[test]
    fn test_solved_grid_is_all_correct() {
        let result = check(&sample_content().grid.solved());
        assert!(result.all_correct);
        assert!(result.correct_across.values().all(|&v| v));
        assert!(result.correct_down.values().all(|&v| v));
    }

    #[test]
    fn test_blank_grid_is_all_wrong() {
        let result = check(&sample_content().grid.blank());
        assert!(!result.all_correct);
        assert!(result.correct_across.values().all(|&v| !v));
        assert!(result.correct_down.values().all(|&v| !v));
    }

    #[test]
    fn test_single_wrong_cell_only_fails_its_words() {
        let mut user = sample_content().grid.solved();
        // (2, 4) is the D of BOARD; column 4 has no down word.
        user.set(CellPos::new(2, 4), Entry::Letter('X'));

        let result = check(&user);
        assert!(!result.all_correct);
        assert_eq!(result.correct_across["6"], false);
        assert_eq!(result.correct_across["1"], true);
        assert_eq!(result.correct_across["7"], true);
        assert!(result.correct_down.values().all(|&v| v));
    }

    #[test]
    fn test_crossing_cell_fails_both_words() {
        let mut user = sample_content().grid.solved();
        // (1, 3) is the N shared by SWAN (4 across) and NRES (5 down).
        user.set(CellPos::new(1, 3), Entry::Empty);

        let result = check(&user);
        assert_eq!(result.correct_across["4"], false);
        assert_eq!(result.correct_down["5"], false);
        assert_eq!(result.correct_down["1"], true);
    }

    #[test]
    fn test_lowercase_entries_count() {
        let json = serde_json::json!([
            ["a","h","a",".","."],
            ["s","w","a","n","."],
            ["b","o","a","r","d"],
            ["o","n","k","e","y"],
            ["a","g","e","s","."]
        ]);
        let user: PlayerGrid = serde_json::from_value(json).unwrap();
        assert!(check(&user).all_correct);
    }

    #[test]
    fn test_unmatched_numbers_fall_back_to_whole_grid() {
        let content = sample_content();
        let slots = number_slots(&content.grid);
        let mut across = content.answers_across.clone();
        across.insert("9".into(), "DY".into());

        let mut user = content.grid.solved();
        user.set(CellPos::new(0, 0), Entry::Letter('Z'));
        let result = check_grid(&user, &content.grid, &slots, &across, &content.answers_down);
        assert_eq!(result.correct_across["9"], false);

        let result = check_grid(
            &content.grid.solved(),
            &content.grid,
            &slots,
            &across,
            &content.answers_down,
        );
        assert_eq!(result.correct_across["9"], true);
    }
}
