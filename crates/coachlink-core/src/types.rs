//! # Invitation Records
//!
//! Records exchanged with the invitation store and the identity provider.
//! Timestamps are milliseconds since the Unix epoch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier carried by an invitation deep link
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvitationId(String);

impl InvitationId {
    /// Wrap a raw invitation token
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw token
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvitationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InvitationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for InvitationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Invitation status as stored remotely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    /// Waiting for the client to accept
    #[default]
    Pending,
    /// Past its expiry, can no longer be redeemed
    Expired,
    /// Already redeemed into a client record
    Accepted,
}

/// An invitation issued by a trainer
///
/// Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationRecord {
    /// Invitation identifier (deep link token)
    pub id: InvitationId,
    /// Display name of the inviting trainer
    pub trainer_name: String,
    /// Email the invitation was addressed to
    pub client_email: String,
    /// Current status
    pub status: InvitationStatus,
    /// When the invitation was created (ms since epoch)
    pub created_at_ms: u64,
    /// When the invitation expires (ms since epoch)
    pub expires_at_ms: Option<u64>,
}

impl InvitationRecord {
    /// Whether the invitation can no longer be redeemed at `now_ms`.
    ///
    /// True when the stored status says so or the expiry has passed.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        self.status == InvitationStatus::Expired
            || self.expires_at_ms.is_some_and(|expires| expires <= now_ms)
    }

    /// Whether the invitation was already redeemed.
    pub fn is_accepted(&self) -> bool {
        self.status == InvitationStatus::Accepted
    }
}

/// Active client record created by redeeming an invitation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Client identifier
    pub id: String,
    /// Invitation this client was created from
    pub invitation_id: InvitationId,
    /// Trainer the client is now linked to
    pub trainer_name: String,
    /// Client email
    pub email: String,
    /// When the client record was created (ms since epoch)
    pub created_at_ms: u64,
}

/// An authenticated identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-assigned user id
    pub user_id: String,
    /// Email bound to the identity
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: InvitationStatus, expires_at_ms: Option<u64>) -> InvitationRecord {
        InvitationRecord {
            id: InvitationId::new("abc123"),
            trainer_name: "Alex".to_string(),
            client_email: "sam@x.com".to_string(),
            status,
            created_at_ms: 1_000,
            expires_at_ms,
        }
    }

    #[test]
    fn test_expiry_by_status_and_deadline() {
        assert!(!record(InvitationStatus::Pending, None).is_expired_at(5_000));
        assert!(!record(InvitationStatus::Pending, Some(6_000)).is_expired_at(5_000));
        assert!(record(InvitationStatus::Pending, Some(5_000)).is_expired_at(5_000));
        assert!(record(InvitationStatus::Expired, None).is_expired_at(0));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&InvitationStatus::Accepted).unwrap();
        assert_eq!(json, "\"accepted\"");
    }

    #[test]
    fn test_invitation_id_is_transparent() {
        let id: InvitationId = serde_json::from_str("\"abc123\"").unwrap();
        assert_eq!(id.as_str(), "abc123");
        assert_eq!(id.to_string(), "abc123");
    }
}
