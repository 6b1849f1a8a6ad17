//! Remote invitation store interface.

use crate::errors::StoreError;
use crate::types::{ClientRecord, InvitationId, InvitationRecord};
use async_trait::async_trait;
use std::sync::Arc;

/// Fetches and redeems invitations.
///
/// Implementations may tolerate repeated calls, but the acceptance coordinator
/// never relies on that: it calls [`redeem`](Self::redeem) at most once per
/// attempt.
#[async_trait]
pub trait InvitationStore: Send + Sync {
    /// Load an invitation.
    ///
    /// Fails with [`StoreError::NotFound`] or [`StoreError::Network`].
    async fn fetch(&self, invitation_id: &InvitationId) -> Result<InvitationRecord, StoreError>;

    /// Convert a pending invitation into an active client record.
    ///
    /// Fails with [`StoreError::AlreadyAccepted`], [`StoreError::Expired`] or
    /// [`StoreError::Network`].
    async fn redeem(&self, invitation_id: &InvitationId) -> Result<ClientRecord, StoreError>;
}

#[async_trait]
impl<T: InvitationStore + ?Sized> InvitationStore for Arc<T> {
    async fn fetch(&self, invitation_id: &InvitationId) -> Result<InvitationRecord, StoreError> {
        (**self).fetch(invitation_id).await
    }

    async fn redeem(&self, invitation_id: &InvitationId) -> Result<ClientRecord, StoreError> {
        (**self).redeem(invitation_id).await
    }
}
