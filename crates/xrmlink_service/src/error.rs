//! Error types for the organization service.

use thiserror::Error;

/// Result type for remote service calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors reported by the remote organization service.
///
/// `NotFound` and `Fault` carry the service's own message verbatim so it can
/// be shown to the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Network or transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the call can be retried.
        retryable: bool,
    },

    /// The service could not find the requested record or entity.
    #[error("{0}")]
    NotFound(String),

    /// The service rejected the request.
    #[error("{0}")]
    Fault(String),

    /// Authentication failed.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Not connected.
    #[error("not connected to the organization service")]
    NotConnected,

    /// A service fixture could not be loaded.
    #[error("invalid service fixture: {0}")]
    Fixture(String),
}

impl RemoteError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Creates a not-found error in the service's own wording.
    pub fn record_not_found(entity_name: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{entity_name} With Id = {id} Does Not Exist"))
    }

    /// Creates a fault for an entity the service does not know.
    pub fn unknown_entity(entity_name: &str) -> Self {
        Self::Fault(format!(
            "The entity with a name = '{entity_name}' was not found in the MetadataCache."
        ))
    }

    /// Returns true if this error can be retried.
    ///
    /// Nothing in xrmlink retries on its own; this is for hosts that do.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Transport { retryable, .. } => *retryable,
            RemoteError::NotConnected => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(RemoteError::transport_retryable("connection reset").is_retryable());
        assert!(!RemoteError::transport_fatal("bad certificate").is_retryable());
        assert!(RemoteError::NotConnected.is_retryable());
        assert!(!RemoteError::Fault("nope".into()).is_retryable());
    }

    #[test]
    fn service_messages_pass_through() {
        let err = RemoteError::record_not_found("contact", "0000");
        assert_eq!(err.to_string(), "contact With Id = 0000 Does Not Exist");

        let err = RemoteError::unknown_entity("widget");
        assert!(err.to_string().contains("'widget'"));
    }
}
