//! Session credential management.
//!
//! Holds the opaque bearer token and supports a single, idempotent
//! invalidation: when several concurrent calls all come back with an
//! authentication-invalid signal, only the first teardown does any work.
//! There is no token refresh - expiry is a hard stop requiring a new login.

use std::sync::{Arc, Mutex};

use secrecy::SecretString;

/// Shared holder for the current bearer credential.
///
/// Cheap to clone; all clones observe the same credential.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    credential: Arc<Mutex<Option<SecretString>>>,
}

impl SessionManager {
    /// Create a session manager with no credential.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a credential after a successful login.
    pub fn set_credential(&self, token: SecretString) {
        *self.lock() = Some(token);
    }

    /// The current credential, if any.
    #[must_use]
    pub fn credential(&self) -> Option<SecretString> {
        self.lock().clone()
    }

    /// Whether a credential is currently held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().is_some()
    }

    /// Clear the credential.
    ///
    /// Returns `true` only for the call that actually cleared a live
    /// credential; later calls are no-ops. Callers use the return value to
    /// run the rest of the teardown exactly once.
    pub fn invalidate(&self) -> bool {
        self.lock().take().is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<SecretString>> {
        // A poisoned credential lock is unrecoverable state corruption.
        self.credential
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_starts_unauthenticated() {
        let session = SessionManager::new();
        assert!(!session.is_authenticated());
        assert!(session.credential().is_none());
    }

    #[test]
    fn test_set_and_read_credential() {
        let session = SessionManager::new();
        session.set_credential(SecretString::from("tok-123"));
        assert!(session.is_authenticated());
        let token = session.credential().expect("credential");
        assert_eq!(token.expose_secret(), "tok-123");
    }

    #[test]
    fn test_invalidate_is_idempotent() {
        let session = SessionManager::new();
        session.set_credential(SecretString::from("tok-123"));

        assert!(session.invalidate());
        // Repeats report that teardown already happened.
        assert!(!session.invalidate());
        assert!(!session.invalidate());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_clones_share_state() {
        let session = SessionManager::new();
        let other = session.clone();
        session.set_credential(SecretString::from("tok-123"));
        assert!(other.is_authenticated());
        assert!(other.invalidate());
        assert!(!session.is_authenticated());
    }
}
