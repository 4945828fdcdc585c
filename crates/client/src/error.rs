//! Unified error taxonomy for client operations.
//!
//! Every remote call resolves to exactly one of these variants at the
//! operation boundary; nothing is left to bubble into a generic handler.

use thiserror::Error;

/// Errors surfaced by storefront client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport failed (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The bearer credential was rejected; the session must be rebuilt.
    #[error("session expired, please log in again")]
    SessionExpired,

    /// An authenticated call was attempted with no credential at all.
    #[error("not logged in")]
    NotAuthenticated,

    /// The backend could not find the referenced resource.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend rejected the request (`success: false` or 4xx).
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl ClientError {
    /// Whether this error is the authentication-invalid signal that must
    /// tear the session down.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// Whether the caller may safely repeat the same operation.
    ///
    /// Everything except an invalid session is retryable from the caller's
    /// point of view: local state is preserved on failure and all cart
    /// operations are safe to repeat.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::SessionExpired | Self::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ClientError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "not found: product 123");

        let err = ClientError::Rejected("quantity must be at least 1".to_string());
        assert_eq!(err.to_string(), "request rejected: quantity must be at least 1");
    }

    #[test]
    fn test_session_expired_classification() {
        assert!(ClientError::SessionExpired.is_session_expired());
        assert!(!ClientError::NotAuthenticated.is_session_expired());
        assert!(!ClientError::NotFound(String::new()).is_session_expired());
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(ClientError::NotFound(String::new()).is_recoverable());
        assert!(ClientError::Rejected(String::new()).is_recoverable());
        assert!(!ClientError::SessionExpired.is_recoverable());
    }
}
