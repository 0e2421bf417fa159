//! Game operations as seen by a caller holding a user id.
//!
//! Each service owns its collaborators explicitly: a pool, a clock, and the
//! content needed for its game. Every session operation checks ownership
//! before touching core state, and every write goes through a versioned
//! update that is retried from a fresh read when another writer got there
//! first.

pub mod crossword;
pub mod wordle;

pub use crossword::CrosswordService;
pub use wordle::{WordleService, WordleSessionView};

use crate::error::GameError;

/// Optimistic write attempts before giving up with [`GameError::Conflict`].
pub const MAX_WRITE_ATTEMPTS: u32 = 5;

pub(crate) fn ensure_owner(owner: &str, requester: &str, what: &str) -> Result<(), GameError> {
    if owner == requester {
        Ok(())
    } else {
        tracing::warn!(owner, requester, what, "session access denied");
        Err(GameError::AccessDenied(format!("{what} belongs to another user")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_owner() {
        assert!(ensure_owner("alice", "alice", "session 1").is_ok());
        let err = ensure_owner("alice", "bob", "session 1").unwrap_err();
        assert!(matches!(err, GameError::AccessDenied(_)));
    }
}
