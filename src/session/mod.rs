//! Per-user session state machines for both games.

pub mod crossword;
pub mod wordle;

pub use crossword::CrosswordSession;
pub use wordle::{GuessOutcome, MAX_ATTEMPTS, WordleSession};

/// Sessions only ever move from `Active` to `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Completed,
}
