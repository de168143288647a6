//! Customer identity as observed by the session cart.
//!
//! Identity is owned by the auth collaborator; the session cart only
//! watches transitions between "absent" and "present" and never refreshes
//! or validates tokens itself.

use rindhouse_core::CustomerId;
use secrecy::{ExposeSecret, SecretString};

/// A signed-in customer: id plus access token.
#[derive(Clone)]
pub struct Identity {
    pub id: CustomerId,
    pub token: SecretString,
}

impl Identity {
    /// Create a new identity.
    #[must_use]
    pub fn new(id: CustomerId, token: impl Into<String>) -> Self {
        Self {
            id,
            token: SecretString::from(token.into()),
        }
    }

    /// Whether this identity counts as authenticated: both the customer id
    /// and the token must be non-empty.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.id.is_empty() && !self.token.expose_secret().is_empty()
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
