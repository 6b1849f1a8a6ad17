//! In-memory invitation store
//!
//! Holds invitations and the client records created from them. Redemption
//! flips the invitation to `Accepted` and is rejected on any later call, which
//! is the behavior the remote document store exhibits.

use async_trait::async_trait;
use coachlink_core::effects::{InvitationStore, PhysicalTimeEffects};
use coachlink_core::{ClientRecord, InvitationId, InvitationRecord, InvitationStatus, StoreError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::time::RealTimeHandler;

#[derive(Debug, Default)]
struct StoreState {
    invitations: HashMap<InvitationId, InvitationRecord>,
    clients: HashMap<InvitationId, ClientRecord>,
}

/// In-memory [`InvitationStore`]
#[derive(Clone)]
pub struct MemoryInvitationStore {
    state: Arc<RwLock<StoreState>>,
    time: Arc<dyn PhysicalTimeEffects>,
}

impl MemoryInvitationStore {
    /// Create an empty store using the system clock
    pub fn new() -> Self {
        Self::with_time(Arc::new(RealTimeHandler::new()))
    }

    /// Create an empty store using the given clock for expiry checks
    pub fn with_time(time: Arc<dyn PhysicalTimeEffects>) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            time,
        }
    }

    /// Insert or replace an invitation
    pub fn insert(&self, record: InvitationRecord) {
        self.state
            .write()
            .invitations
            .insert(record.id.clone(), record);
    }

    /// Client record created from the given invitation, if redeemed
    pub fn client_for(&self, invitation_id: &InvitationId) -> Option<ClientRecord> {
        self.state.read().clients.get(invitation_id).cloned()
    }

    /// Number of client records created so far
    pub fn client_count(&self) -> usize {
        self.state.read().clients.len()
    }
}

impl Default for MemoryInvitationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InvitationStore for MemoryInvitationStore {
    async fn fetch(&self, invitation_id: &InvitationId) -> Result<InvitationRecord, StoreError> {
        self.state
            .read()
            .invitations
            .get(invitation_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(invitation_id.as_str()))
    }

    async fn redeem(&self, invitation_id: &InvitationId) -> Result<ClientRecord, StoreError> {
        let now_ms = self.time.now_ms().await;
        let mut guard = self.state.write();
        let state = &mut *guard;

        let record = state
            .invitations
            .get_mut(invitation_id)
            .ok_or_else(|| StoreError::not_found(invitation_id.as_str()))?;

        if record.is_accepted() {
            return Err(StoreError::already_accepted(invitation_id.as_str()));
        }
        if record.is_expired_at(now_ms) {
            record.status = InvitationStatus::Expired;
            return Err(StoreError::expired(invitation_id.as_str()));
        }

        record.status = InvitationStatus::Accepted;
        let client = ClientRecord {
            id: Uuid::new_v4().to_string(),
            invitation_id: invitation_id.clone(),
            trainer_name: record.trainer_name.clone(),
            email: record.client_email.clone(),
            created_at_ms: now_ms,
        };
        state.clients.insert(invitation_id.clone(), client.clone());
        debug!(invitation_id = %invitation_id, client_id = %client.id, "Invitation redeemed");
        Ok(client)
    }
}
