//! Acceptance state machine values.

use crate::errors::AcceptanceErrorKind;
use coachlink_core::{ClientRecord, InvitationRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Observable state of one acceptance flow
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AcceptanceState {
    /// Nothing started, or reset by `cancel`
    #[default]
    Idle,
    /// Fetching the invitation
    Loading,
    /// Invitation fetched and redeemable
    InvitationLoaded(InvitationRecord),
    /// Waiting for the identity provider to report a live session
    AwaitingIdentity,
    /// Redemption call issued
    Redeeming,
    /// Client record created
    Success(ClientRecord),
    /// Attempt failed
    Failed(AcceptanceErrorKind),
}

impl AcceptanceState {
    /// Variant without payload
    pub fn phase(&self) -> AcceptancePhase {
        match self {
            Self::Idle => AcceptancePhase::Idle,
            Self::Loading => AcceptancePhase::Loading,
            Self::InvitationLoaded(_) => AcceptancePhase::InvitationLoaded,
            Self::AwaitingIdentity => AcceptancePhase::AwaitingIdentity,
            Self::Redeeming => AcceptancePhase::Redeeming,
            Self::Success(_) => AcceptancePhase::Success,
            Self::Failed(_) => AcceptancePhase::Failed,
        }
    }

    /// `Success` or `Failed`
    pub fn is_outcome(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Failed(_))
    }

    /// Failure kind, if failed
    pub fn error(&self) -> Option<AcceptanceErrorKind> {
        match self {
            Self::Failed(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Payload-free view of [`AcceptanceState`], for logs and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcceptancePhase {
    /// See [`AcceptanceState::Idle`]
    Idle,
    /// See [`AcceptanceState::Loading`]
    Loading,
    /// See [`AcceptanceState::InvitationLoaded`]
    InvitationLoaded,
    /// See [`AcceptanceState::AwaitingIdentity`]
    AwaitingIdentity,
    /// See [`AcceptanceState::Redeeming`]
    Redeeming,
    /// See [`AcceptanceState::Success`]
    Success,
    /// See [`AcceptanceState::Failed`]
    Failed,
}

impl fmt::Display for AcceptancePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::InvitationLoaded => "invitation loaded",
            Self::AwaitingIdentity => "awaiting identity",
            Self::Redeeming => "redeeming",
            Self::Success => "accepted",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// How the coordinator learns that the identity is ready
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaitStrategy {
    /// Session was already live; sample the provider flags on a timer
    Poll,
    /// Session was absent; wait for a fresh `true` on the state stream
    Subscribe,
}

impl WaitStrategy {
    /// Pick the strategy from the `is_authenticated` sample taken at trigger time
    pub fn select(already_authenticated: bool) -> Self {
        if already_authenticated {
            Self::Poll
        } else {
            Self::Subscribe
        }
    }
}

/// Which identity path an attempt took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcceptancePath {
    /// Federated sign-in through the identity provider
    Federated,
    /// Email plus generated secret
    Manual,
}

impl fmt::Display for AcceptancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Federated => f.write_str("federated"),
            Self::Manual => f.write_str("manual"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_selection() {
        assert_eq!(WaitStrategy::select(true), WaitStrategy::Poll);
        assert_eq!(WaitStrategy::select(false), WaitStrategy::Subscribe);
    }

    #[test]
    fn test_outcomes() {
        assert!(AcceptanceState::Failed(AcceptanceErrorKind::Network).is_outcome());
        assert!(!AcceptanceState::Redeeming.is_outcome());
        assert_eq!(
            AcceptanceState::Failed(AcceptanceErrorKind::Expired).error(),
            Some(AcceptanceErrorKind::Expired)
        );
        assert_eq!(AcceptanceState::Idle.phase(), AcceptancePhase::Idle);
    }
}
