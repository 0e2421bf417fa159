//! Error taxonomy shared by the game engines and the service layer.

/// Errors surfaced by puzzle and session operations.
///
/// Everything except `Storage` is a caller-facing condition that the
/// surrounding API layer translates into a user response.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Malformed guess, cell, letter, pagination or completion input.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Puzzle or session does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Mutation attempted on a session that already reached a terminal state.
    #[error("{0} is already completed")]
    AlreadyCompleted(String),

    /// The puzzle-content provider gave up.
    #[error("puzzle content unavailable: {0}")]
    ContentUnavailable(String),

    /// Session belongs to another user.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Concurrent writers kept winning the optimistic lock.
    #[error("concurrent modification of {0}")]
    Conflict(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl GameError {
    pub fn validation(message: impl ToString) -> Self {
        Self::Validation(message.to_string())
    }

    pub fn not_found(what: impl ToString) -> Self {
        Self::NotFound(what.to_string())
    }

    pub fn already_completed(what: impl ToString) -> Self {
        Self::AlreadyCompleted(what.to_string())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_already_completed(&self) -> bool {
        matches!(self, Self::AlreadyCompleted(_))
    }
}

pub type GameResult<T> = Result<T, GameError>;
