//! Aggregate statistics over a user's completed sessions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::session::{CrosswordSession, MAX_ATTEMPTS, WordleSession};

/// Minimal view of a finished Wordle game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordleRecord {
    pub date: NaiveDate,
    pub won: bool,
    pub attempts_used: u32,
}

impl From<&WordleSession> for WordleRecord {
    fn from(s: &WordleSession) -> Self {
        Self {
            date: s.puzzle_date,
            won: s.won,
            attempts_used: s.attempts_used,
        }
    }
}

/// Minimal view of a finished crossword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrosswordRecord {
    pub date: NaiveDate,
    pub completion_time_seconds: Option<u32>,
    pub hints_used: u32,
    pub revealed_all: bool,
}

impl From<&CrosswordSession> for CrosswordRecord {
    fn from(s: &CrosswordSession) -> Self {
        Self {
            date: s.puzzle_date,
            completion_time_seconds: s.completion_time_seconds,
            hints_used: s.hints_used,
            revealed_all: s.revealed_all,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordleStats {
    pub total_games: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_percentage: f64,
    pub current_streak: usize,
    pub max_streak: usize,
    /// Wins by number of guesses, index 0 = solved in one.
    pub guess_distribution: [usize; MAX_ATTEMPTS as usize],
}

impl WordleStats {
    pub fn from_records(records: &[WordleRecord], today: NaiveDate) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let mut stats = Self {
            total_games: records.len(),
            ..Default::default()
        };

        for record in records {
            if record.won {
                stats.wins += 1;
                let attempts = record.attempts_used as usize;
                if (1..=stats.guess_distribution.len()).contains(&attempts) {
                    stats.guess_distribution[attempts - 1] += 1;
                }
            } else {
                stats.losses += 1;
            }
        }

        stats.win_percentage = round2(stats.wins as f64 / stats.total_games as f64 * 100.0);

        let days = daily_outcomes(records.iter().map(|r| (r.date, r.won)));
        stats.current_streak = current_streak(&days, today);
        stats.max_streak = max_streak(&days);

        stats
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrosswordStats {
    pub total_completed: usize,
    pub average_completion_time_seconds: Option<f64>,
    pub current_streak: usize,
    pub max_streak: usize,
    pub average_hints_used: Option<f64>,
    /// Puzzles where the player used reveal-all.
    pub puzzles_revealed: usize,
}

impl CrosswordStats {
    pub fn from_records(records: &[CrosswordRecord], today: NaiveDate) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let times: Vec<f64> = records
            .iter()
            .filter_map(|r| r.completion_time_seconds)
            .map(f64::from)
            .collect();
        let hints: Vec<f64> = records.iter().map(|r| f64::from(r.hints_used)).collect();

        // Every completed crossword counts as a solved day.
        let days = daily_outcomes(records.iter().map(|r| (r.date, true)));

        Self {
            total_completed: records.len(),
            average_completion_time_seconds: mean(&times),
            current_streak: current_streak(&days, today),
            max_streak: max_streak(&days),
            average_hints_used: mean(&hints),
            puzzles_revealed: records.iter().filter(|r| r.revealed_all).count(),
        }
    }
}

/// Collapse sessions to one outcome per puzzle date (won if any session that
/// day was won), in chronological order.
pub fn daily_outcomes(records: impl IntoIterator<Item = (NaiveDate, bool)>) -> Vec<(NaiveDate, bool)> {
    let mut days: BTreeMap<NaiveDate, bool> = BTreeMap::new();
    for (date, won) in records {
        *days.entry(date).or_insert(false) |= won;
    }
    days.into_iter().collect()
}

/// Consecutive won days ending today or yesterday. `days` must be sorted by
/// date; dates after `today` are ignored.
pub fn current_streak(days: &[(NaiveDate, bool)], today: NaiveDate) -> usize {
    let mut recent = days.iter().rev().filter(|(date, _)| *date <= today).peekable();

    let Some(&&(latest, _)) = recent.peek() else {
        return 0;
    };
    if (today - latest).num_days() > 1 {
        return 0;
    }

    let mut streak = 0;
    let mut expected = latest;
    for &(date, won) in recent {
        if date != expected || !won {
            break;
        }
        streak += 1;
        match expected.pred_opt() {
            Some(prev) => expected = prev,
            None => break,
        }
    }
    streak
}

/// Longest run of won days with no gap. `days` must be sorted by date.
pub fn max_streak(days: &[(NaiveDate, bool)]) -> usize {
    let mut best = 0;
    let mut running = 0;
    let mut last_win: Option<NaiveDate> = None;

    for &(date, won) in days {
        if won {
            let consecutive = last_win.and_then(|d| d.succ_opt()) == Some(date);
            running = if consecutive { running + 1 } else { 1 };
            best = best.max(running);
            last_win = Some(date);
        } else {
            running = 0;
            last_win = None;
        }
    }
    best
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
