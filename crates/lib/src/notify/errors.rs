//! Error types for verification-code delivery.

use thiserror::Error;

/// Errors that can occur while dispatching a verification code.
///
/// Delivery failures are never fatal: the caller surfaces them to the user
/// and decides what to do with the pending registration.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The relay endpoint answered with a non-success status.
    #[error("Delivery endpoint returned status {status}: {detail}")]
    EndpointStatus {
        /// HTTP status code from the relay.
        status: u16,
        /// Response body, for the user-facing message.
        detail: String,
    },

    /// The relay answered 2xx but the body did not confirm delivery.
    #[error("Delivery endpoint did not confirm delivery")]
    NotConfirmed,

    /// The request never completed (DNS, connect, timeout, ...).
    #[error("Delivery transport failure: {reason}")]
    Transport { reason: String },
}

impl NotifyError {
    /// Check if this error is a transport-level failure.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, NotifyError::Transport { .. })
    }
}

impl From<NotifyError> for crate::Error {
    fn from(err: NotifyError) -> Self {
        crate::Error::Notify(err)
    }
}
