//! Error types for session and registration transitions.

use thiserror::Error;

/// Errors that can occur during auth transitions.
///
/// All of these are local, recoverable, and meant to be surfaced to the user
/// verbatim; none terminate the process.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SessionError {
    /// Email, username, or password was empty.
    #[error("Please fill out email, username, and password")]
    MissingFields,

    /// An account with that email already exists.
    #[error("An account with email '{email}' already exists")]
    DuplicateEmail { email: String },

    /// Another account already uses that username (case-insensitively).
    #[error("Username '{username}' is already taken")]
    DuplicateUsername { username: String },

    /// Unknown email or wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The supplied username does not match the account for this email.
    #[error("Username does not match this email")]
    UsernameMismatch,

    /// `verify` was called with no registration awaiting a code.
    #[error("No registration is awaiting verification")]
    NoPendingRegistration,

    /// The verification window has closed; the pending record was removed.
    #[error("Verification code has expired, please register again")]
    VerificationExpired,

    /// The supplied code does not match the pending registration.
    #[error("Incorrect verification code")]
    IncorrectCode,

    /// The verification code could not be dispatched. The pending
    /// registration is kept.
    #[error("Could not send verification code: {reason}")]
    DeliveryFailed { reason: String },

    /// The operation requires an authenticated session.
    #[error("No user is logged in")]
    NotLoggedIn,
}

impl SessionError {
    /// Check if this error comes from registration-input validation.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            SessionError::MissingFields
                | SessionError::DuplicateEmail { .. }
                | SessionError::DuplicateUsername { .. }
        )
    }

    /// Check if this error is a credential failure.
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidCredentials | SessionError::UsernameMismatch
        )
    }

    /// Check if this error belongs to the code-verification flow.
    pub fn is_verification_error(&self) -> bool {
        matches!(
            self,
            SessionError::NoPendingRegistration
                | SessionError::VerificationExpired
                | SessionError::IncorrectCode
        )
    }

    /// Check if this error means code delivery failed.
    pub fn is_delivery_error(&self) -> bool {
        matches!(self, SessionError::DeliveryFailed { .. })
    }
}

impl From<SessionError> for crate::Error {
    fn from(err: SessionError) -> Self {
        crate::Error::Session(err)
    }
}
