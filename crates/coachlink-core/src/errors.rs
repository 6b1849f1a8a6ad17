//! Error types reported by the external collaborators.
//!
//! The store and the identity provider each get a small closed enum so the
//! coordinator can map failures onto its own taxonomy without string matching.

use serde::{Deserialize, Serialize};

/// Failures reported by an [`InvitationStore`](crate::effects::InvitationStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum StoreError {
    /// No invitation exists for the requested id
    #[error("Invitation not found: {invitation_id}")]
    NotFound {
        /// The id that was looked up
        invitation_id: String,
    },

    /// The invitation was already redeemed
    #[error("Invitation already accepted: {invitation_id}")]
    AlreadyAccepted {
        /// The id that was redeemed
        invitation_id: String,
    },

    /// The invitation is past its expiry
    #[error("Invitation expired: {invitation_id}")]
    Expired {
        /// The id that was redeemed
        invitation_id: String,
    },

    /// Transport or backend failure
    #[error("Network error: {message}")]
    Network {
        /// Error message describing the network issue
        message: String,
    },
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(invitation_id: impl Into<String>) -> Self {
        Self::NotFound {
            invitation_id: invitation_id.into(),
        }
    }

    /// Create an already accepted error
    pub fn already_accepted(invitation_id: impl Into<String>) -> Self {
        Self::AlreadyAccepted {
            invitation_id: invitation_id.into(),
        }
    }

    /// Create an expired error
    pub fn expired(invitation_id: impl Into<String>) -> Self {
        Self::Expired {
            invitation_id: invitation_id.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }
}

/// Failures reported by an [`IdentityProvider`](crate::effects::IdentityProvider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum IdentityError {
    /// A credential already exists for the email
    #[error("Account already exists for {email}")]
    AlreadyExists {
        /// The email that collided
        email: String,
    },

    /// Transport failure talking to the provider
    #[error("Network error: {message}")]
    Network {
        /// Error message describing the network issue
        message: String,
    },

    /// The provider rejected or aborted the sign-in
    #[error("Identity provider error: {message}")]
    Provider {
        /// Provider supplied reason
        message: String,
    },
}

impl IdentityError {
    /// Create an already exists error
    pub fn already_exists(email: impl Into<String>) -> Self {
        Self::AlreadyExists {
            email: email.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        assert_eq!(
            StoreError::not_found("xyz").to_string(),
            "Invitation not found: xyz"
        );
        assert_eq!(
            StoreError::network("timed out").to_string(),
            "Network error: timed out"
        );
    }

    #[test]
    fn test_identity_error_display() {
        assert_eq!(
            IdentityError::already_exists("sam@x.com").to_string(),
            "Account already exists for sam@x.com"
        );
    }
}
