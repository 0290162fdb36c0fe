//! Error types for storage backends.

use thiserror::Error;

/// Errors that can occur in a key-value storage backend.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// File I/O failed while saving or loading backend state.
    #[error("Backend file I/O error")]
    FileIo {
        #[source]
        source: std::io::Error,
    },

    /// Backend state could not be serialized.
    #[error("Backend serialization failed")]
    SerializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// Backend state could not be deserialized.
    #[error("Backend deserialization failed")]
    DeserializationFailed {
        #[source]
        source: serde_json::Error,
    },
}

impl BackendError {
    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, BackendError::FileIo { .. })
    }

    /// Check if this error is related to serialization in either direction.
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            BackendError::SerializationFailed { .. } | BackendError::DeserializationFailed { .. }
        )
    }
}

impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
