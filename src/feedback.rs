use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-letter verdict for a Wordle guess.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterStatus {
    Correct,
    Present,
    Absent,
}

impl LetterStatus {
    /// Single-character rendering used by the terminal front end.
    pub fn symbol(self) -> char {
        match self {
            LetterStatus::Correct => 'G',
            LetterStatus::Present => 'Y',
            LetterStatus::Absent => '.',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterResult {
    pub letter: char,
    pub status: LetterStatus,
}

/// Score `guess` against `answer`.
///
/// Exact matches are marked first and consume their answer letter, so a
/// repeated guess letter is only marked present while unconsumed copies
/// remain. Both words are lowercased; callers are expected to have checked
/// that the lengths agree.
pub fn evaluate(guess: &str, answer: &str) -> Vec<LetterResult> {
    let g: Vec<char> = guess.chars().map(|c| c.to_ascii_lowercase()).collect();
    let a: Vec<char> = answer.chars().map(|c| c.to_ascii_lowercase()).collect();
    debug_assert_eq!(g.len(), a.len());

    let mut statuses: Vec<Option<LetterStatus>> = vec![None; g.len()];
    let mut remaining: HashMap<char, usize> = HashMap::new();

    // Exact pass
    for (i, (&gc, &ac)) in g.iter().zip(&a).enumerate() {
        if gc == ac {
            statuses[i] = Some(LetterStatus::Correct);
        } else {
            *remaining.entry(ac).or_insert(0) += 1;
        }
    }

    // Misplaced pass
    for (i, &gc) in g.iter().enumerate() {
        if statuses[i].is_some() {
            continue;
        }
        let status = match remaining.get_mut(&gc) {
            Some(count) if *count > 0 => {
                *count -= 1;
                LetterStatus::Present
            }
            _ => LetterStatus::Absent,
        };
        statuses[i] = Some(status);
    }

    g.into_iter()
        .zip(statuses)
        .map(|(letter, status)| LetterResult {
            letter,
            status: status.unwrap_or(LetterStatus::Absent),
        })
        .collect()
}

pub fn is_solved(results: &[LetterResult]) -> bool {
    !results.is_empty() && results.iter().all(|r| r.status == LetterStatus::Correct)
}

/// Render a scored guess as `WORD  GY.G.` for terminal output.
pub fn render(results: &[LetterResult]) -> String {
    let word: String = results.iter().map(|r| r.letter.to_ascii_uppercase()).collect();
    let marks: String = results.iter().map(|r| r.status.symbol()).collect();
    format!("{word}  {marks}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(guess: &str, answer: &str) -> Vec<LetterStatus> {
        evaluate(guess, answer).into_iter().map(|r| r.status).collect()
    }

    fn pattern(p: &str) -> Vec<LetterStatus> {
        p.chars()
            .map(|c| match c {
                'G' => LetterStatus::Correct,
                'Y' => LetterStatus::Present,
                '.' => LetterStatus::Absent,
                _ => panic!("bad pattern char {c}"),
            })
            .collect()
    }

    #[test]
    fn test_duplicate_guess_letters_are_not_overcounted() {
        assert_eq!(statuses("speed", "spade"), pattern("GGY.Y"));
    }

    #[test]
    fn test_identical_words_are_all_correct() {
        for word in ["about", "crane", "eerie", "mamma"] {
            let results = evaluate(word, word);
            assert!(is_solved(&results), "{word}");
        }
    }

    #[test]
    fn test_mixed_feedback() {
        assert_eq!(statuses("about", "abort"), pattern("GGG.G"));
        assert_eq!(statuses("crane", "slate"), pattern("..G.G"));
        assert_eq!(statuses("trace", "crate"), pattern("YGGYG"));
    }

    #[test]
    fn test_exact_match_takes_priority_over_earlier_misplaced_copy() {
        // Both answer 'l's are matched exactly, so the leading 'l' has
        // nothing left to claim.
        assert_eq!(statuses("lolly", "golly"), pattern(".GGGG"));
        assert_eq!(statuses("allee", "apple"), pattern("GY..G"));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(statuses("SPEED", "spade"), statuses("speed", "SPADE"));
        assert!(evaluate("CrAnE", "crane").iter().all(|r| r.letter.is_ascii_lowercase()));
    }

    #[test]
    fn test_marks_never_exceed_answer_letter_counts() {
        let words = ["speed", "spade", "eerie", "geese", "lolly", "abbey", "babes", "mamma", "amass"];
        for guess in words {
            for answer in words {
                let results = evaluate(guess, answer);
                for r in &results {
                    let marked = results
                        .iter()
                        .filter(|x| x.letter == r.letter && x.status != LetterStatus::Absent)
                        .count();
                    let available = answer.chars().filter(|&c| c == r.letter).count();
                    assert!(marked <= available, "{guess} vs {answer}: letter {}", r.letter);
                }
            }
        }
    }

    #[test]
    fn test_render() {
        assert_eq!(render(&evaluate("speed", "spade")), "SPEED  GGY.Y");
    }

    #[test]
    fn test_render_line_is_self_contained() {
        // The CLI prints this line alone for every guess.
        let line = render(&evaluate("crane", "spade"));
        assert_eq!(line.matches("CRANE").count(), 1);
        assert!(!line.contains("crane"));
    }
}
