//! Error types for the ledger.

use thiserror::Error;

/// Errors that can occur during ledger operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No account exists for the given email.
    #[error("User not found: {email}")]
    UserNotFound {
        /// Lowercased email that did not resolve to an account.
        email: String,
    },

    /// A vote delta outside the accepted set was recorded.
    #[error("Invalid vote delta: {delta} (must be -2, -1, 1, or 2)")]
    InvalidVoteDelta { delta: i8 },
}

impl LedgerError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::UserNotFound { .. })
    }

    /// Check if this error is validation-related.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, LedgerError::InvalidVoteDelta { .. })
    }
}

impl From<LedgerError> for crate::Error {
    fn from(err: LedgerError) -> Self {
        crate::Error::Ledger(err)
    }
}
