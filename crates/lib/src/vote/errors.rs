//! Error types for vote parsing and application.

use thiserror::Error;

/// Errors that can occur while parsing or applying a vote command.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum VoteError {
    /// The command text does not match
    /// `"<target name> <+2|+1|-1|-2>"`.
    #[error("Use a format like \"name +2\" or \"someone -1\"; only -2, -1, +1, +2 are allowed")]
    InvalidFormat {
        /// The rejected input, for diagnostics.
        input: String,
    },

    /// The actor's balance cannot cover the vote's cost.
    #[error("Not enough votes: you have {have}, need {need}")]
    InsufficientVotes { have: u64, need: u64 },
}

impl VoteError {
    /// Check if this error is a parse failure.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, VoteError::InvalidFormat { .. })
    }

    /// Check if this error is a funds failure.
    pub fn is_insufficient_votes(&self) -> bool {
        matches!(self, VoteError::InsufficientVotes { .. })
    }
}

impl From<VoteError> for crate::Error {
    fn from(err: VoteError) -> Self {
        crate::Error::Vote(err)
    }
}
