//!
//! Podium: a vote-economy leaderboard engine.
//!
//! Users accrue spendable votes over time at a rate set by their current
//! leaderboard standing, and spend them to move names up or down a shared
//! board. This crate is the complete state machine behind that loop; DOM
//! rendering and the email relay are external collaborators.
//!
//! ## Core Concepts
//!
//! * **Economy (`economy`)**: the pure rate and power curves. Standing earns
//!   votes faster; a deeply negative score halves the weight of votes cast.
//! * **Ledger (`ledger::LedgerStore`)**: users, pending registrations, and
//!   leaderboard entries, persisted as one JSON document in a
//!   [`backend::KeyValueStore`] and rewritten atomically after every
//!   mutation.
//! * **Sessions (`session::SessionManager`)**: the application context.
//!   Tracks who is authenticated, runs register/verify/login/logout/resume
//!   transitions, and settles accrual on every transition into `LoggedIn`.
//! * **Votes (`vote`)**: command parsing and application, including funds
//!   checks and the accrual-clock reset on spend.
//! * **Views (`view`)**: read-only models for the presentation layer, with
//!   deterministic bar rendering hints.
//! * **Notification (`notify::NotificationSender`)**: fire-and-forget
//!   delivery of 6-digit verification codes with a boolean success contract.

pub mod backend;
pub mod clock;
pub mod economy;
pub mod ledger;
pub mod notify;
pub mod session;
pub mod view;
pub mod vote;

pub use clock::{Clock, FixedClock, SystemClock};
pub use session::{SessionManager, SessionState};

/// Result type used throughout the Podium library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Podium library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured storage errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Structured ledger errors from the ledger module
    #[error(transparent)]
    Ledger(ledger::LedgerError),

    /// Structured auth-transition errors from the session module
    #[error(transparent)]
    Session(session::SessionError),

    /// Structured vote errors from the vote module
    #[error(transparent)]
    Vote(vote::VoteError),

    /// Structured delivery errors from the notify module
    #[error(transparent)]
    Notify(notify::NotifyError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Backend(_) => "backend",
            Error::Ledger(_) => "ledger",
            Error::Session(_) => "session",
            Error::Vote(_) => "vote",
            Error::Notify(_) => "notify",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Ledger(ledger_err) => ledger_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is user-input validation (recoverable by
    /// retyping).
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Ledger(ledger_err) => ledger_err.is_validation_error(),
            Error::Session(session_err) => session_err.is_validation_error(),
            Error::Vote(vote_err) => vote_err.is_parse_error(),
            _ => false,
        }
    }

    /// Check if this error is a credential failure.
    pub fn is_credential_error(&self) -> bool {
        match self {
            Error::Session(session_err) => session_err.is_credential_error(),
            _ => false,
        }
    }

    /// Check if this error belongs to the code-verification flow.
    pub fn is_verification_error(&self) -> bool {
        match self {
            Error::Session(session_err) => session_err.is_verification_error(),
            _ => false,
        }
    }

    /// Check if this error means a verification code could not be sent.
    pub fn is_delivery_error(&self) -> bool {
        match self {
            Error::Session(session_err) => session_err.is_delivery_error(),
            Error::Notify(_) => true,
            _ => false,
        }
    }

    /// Check if this error is a vote parse or funds failure.
    pub fn is_vote_error(&self) -> bool {
        matches!(self, Error::Vote(_))
    }

    /// Check if this error means the actor could not afford a vote.
    pub fn is_insufficient_votes(&self) -> bool {
        match self {
            Error::Vote(vote_err) => vote_err.is_insufficient_votes(),
            _ => false,
        }
    }

    /// Check if this error is storage-backend related.
    pub fn is_backend_error(&self) -> bool {
        matches!(self, Error::Backend(_))
    }

    /// Check if this error is fatal to the process.
    ///
    /// Always false for domain errors: every failure in this core returns
    /// control to the caller with a classified reason.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}
