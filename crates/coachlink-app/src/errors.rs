//! Categorized acceptance errors
//!
//! Two layers:
//! - [`AcceptanceErrorKind`]: the failure carried by `AcceptanceState::Failed`,
//!   surfaced to the user through the coordinator's message slot
//! - [`AcceptanceError`]: misuse of the coordinator API, returned from the call
//!   and never stored in state

use crate::acceptance::AcceptancePhase;
use coachlink_core::{IdentityError, InvitationId, StoreError};
use serde::{Deserialize, Serialize};

/// Why an acceptance attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum AcceptanceErrorKind {
    /// The invitation does not exist
    #[error("invitation not found")]
    NotFound,
    /// The invitation is past its expiry
    #[error("invitation expired")]
    Expired,
    /// The invitation was already redeemed
    #[error("invitation already accepted")]
    AlreadyAccepted,
    /// Transient transport failure
    #[error("network error")]
    Network,
    /// Sign-in or credential creation failed
    #[error("identity provider error")]
    AuthProviderError,
}

impl AcceptanceErrorKind {
    /// Map a failed invitation fetch.
    pub fn from_fetch(error: &StoreError) -> Self {
        match error {
            StoreError::NotFound { .. } => Self::NotFound,
            StoreError::Network { .. } => Self::Network,
            StoreError::Expired { .. } => Self::Expired,
            StoreError::AlreadyAccepted { .. } => Self::AlreadyAccepted,
        }
    }

    /// Map a failed redemption.
    ///
    /// A redemption `NotFound` means the invitation vanished after it was
    /// loaded; the user needs a new link either way.
    pub fn from_redeem(error: &StoreError) -> Self {
        match error {
            StoreError::AlreadyAccepted { .. } => Self::AlreadyAccepted,
            StoreError::Expired { .. } => Self::Expired,
            StoreError::Network { .. } => Self::Network,
            StoreError::NotFound { .. } => Self::NotFound,
        }
    }

    /// Map a failed sign-in or credential creation.
    pub fn from_identity(_error: &IdentityError) -> Self {
        Self::AuthProviderError
    }

    /// Whether the user can retry from the loaded invitation.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Network | Self::AuthProviderError)
    }

    /// Whether the attempt is over and the deep link state should go.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !self.is_retriable()
    }

    /// Whether the client record already exists despite the failure.
    ///
    /// Cached role/session info must be refreshed in that case so the user is
    /// not blocked on the invitation screen.
    #[must_use]
    pub fn is_success_adjacent(&self) -> bool {
        matches!(self, Self::AlreadyAccepted)
    }

    /// Short error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "INVITE_NOT_FOUND",
            Self::Expired => "INVITE_EXPIRED",
            Self::AlreadyAccepted => "INVITE_ACCEPTED",
            Self::Network => "NET_ERROR",
            Self::AuthProviderError => "AUTH_PROVIDER",
        }
    }

    /// Message shown in the coordinator's user-facing slot
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound => "This invitation link is invalid. Ask your trainer for a new one.",
            Self::Expired => "This invitation has expired. Ask your trainer for a new one.",
            Self::AlreadyAccepted => "This invitation was already accepted.",
            Self::Network => "Check your network connection and try again.",
            Self::AuthProviderError => "Sign-in did not complete. Please try again.",
        }
    }
}

/// Invalid use of the coordinator API
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcceptanceError {
    /// Operation not permitted in the current state
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        /// The rejected operation
        operation: &'static str,
        /// State at the time of the call
        state: AcceptancePhase,
    },

    /// A redemption abandoned by `cancel` has not completed yet
    #[error("a previous redemption of {invitation_id} is still in flight")]
    RedemptionInFlight {
        /// The invitation being redeemed
        invitation_id: InvitationId,
    },

    /// Coordinator configuration was rejected
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

impl AcceptanceError {
    pub(crate) fn invalid(operation: &'static str, state: AcceptancePhase) -> Self {
        Self::InvalidTransition { operation, state }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy() {
        assert!(AcceptanceErrorKind::Network.is_retriable());
        assert!(AcceptanceErrorKind::AuthProviderError.is_retriable());
        assert!(AcceptanceErrorKind::NotFound.is_terminal());
        assert!(AcceptanceErrorKind::Expired.is_terminal());
        assert!(AcceptanceErrorKind::AlreadyAccepted.is_terminal());
        assert!(AcceptanceErrorKind::AlreadyAccepted.is_success_adjacent());
        assert!(!AcceptanceErrorKind::Expired.is_success_adjacent());
    }

    #[test]
    fn test_store_error_mapping() {
        assert_eq!(
            AcceptanceErrorKind::from_fetch(&StoreError::not_found("xyz")),
            AcceptanceErrorKind::NotFound
        );
        assert_eq!(
            AcceptanceErrorKind::from_fetch(&StoreError::network("offline")),
            AcceptanceErrorKind::Network
        );
        assert_eq!(
            AcceptanceErrorKind::from_redeem(&StoreError::already_accepted("abc")),
            AcceptanceErrorKind::AlreadyAccepted
        );
        assert_eq!(
            AcceptanceErrorKind::from_identity(&IdentityError::already_exists("sam@x.com")),
            AcceptanceErrorKind::AuthProviderError
        );
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = AcceptanceError::invalid("start", AcceptancePhase::Loading);
        assert_eq!(err.to_string(), "cannot start while loading");
    }

    #[test]
    fn test_user_messages_are_present() {
        for kind in [
            AcceptanceErrorKind::NotFound,
            AcceptanceErrorKind::Expired,
            AcceptanceErrorKind::AlreadyAccepted,
            AcceptanceErrorKind::Network,
            AcceptanceErrorKind::AuthProviderError,
        ] {
            assert!(!kind.user_message().is_empty());
            assert!(!kind.code().is_empty());
        }
    }
}
