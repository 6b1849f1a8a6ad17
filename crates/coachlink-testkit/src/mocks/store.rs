use async_trait::async_trait;
use coachlink_core::effects::InvitationStore;
use coachlink_core::{ClientRecord, InvitationId, InvitationRecord, StoreError};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::fixtures::sample_client;

#[derive(Debug, Default)]
struct StoreState {
    invitations: Mutex<HashMap<InvitationId, InvitationRecord>>,
    fetch_error: Mutex<Option<StoreError>>,
    redeem_results: Mutex<VecDeque<Result<ClientRecord, StoreError>>>,
    fetch_latency_ms: AtomicU64,
    redeem_latency_ms: AtomicU64,
    fetch_calls: AtomicUsize,
    redeem_calls: AtomicUsize,
    redeems_in_flight: AtomicUsize,
    max_redeems_in_flight: AtomicUsize,
}

/// Scripted [`InvitationStore`]
///
/// `fetch` returns the seeded invitation or `NotFound`. `redeem` pops the
/// next scripted result; once the script is exhausted it succeeds with
/// [`sample_client`] for seeded invitations and fails with `NotFound`
/// otherwise. Unlike the in-memory store it never flips invitation status,
/// so repeated redemptions are visible through [`redeem_calls`](Self::redeem_calls).
#[derive(Debug, Clone, Default)]
pub struct MockInvitationStore {
    state: Arc<StoreState>,
}

impl MockInvitationStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an invitation
    pub fn with_invitation(self, record: InvitationRecord) -> Self {
        self.state
            .invitations
            .lock()
            .insert(record.id.clone(), record);
        self
    }

    /// Fail every `fetch` with `error`
    pub fn with_fetch_error(self, error: StoreError) -> Self {
        *self.state.fetch_error.lock() = Some(error);
        self
    }

    /// Queue a `redeem` result
    pub fn with_redeem_result(self, result: Result<ClientRecord, StoreError>) -> Self {
        self.push_redeem_result(result);
        self
    }

    /// Delay every `fetch`
    pub fn with_fetch_latency_ms(self, ms: u64) -> Self {
        self.state.fetch_latency_ms.store(ms, Ordering::SeqCst);
        self
    }

    /// Delay every `redeem`
    pub fn with_redeem_latency_ms(self, ms: u64) -> Self {
        self.state.redeem_latency_ms.store(ms, Ordering::SeqCst);
        self
    }

    /// Queue a `redeem` result on a shared handle
    pub fn push_redeem_result(&self, result: Result<ClientRecord, StoreError>) {
        self.state.redeem_results.lock().push_back(result);
    }

    /// Number of `fetch` calls
    pub fn fetch_calls(&self) -> usize {
        self.state.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of `redeem` calls
    pub fn redeem_calls(&self) -> usize {
        self.state.redeem_calls.load(Ordering::SeqCst)
    }

    /// Highest number of `redeem` calls observed running at once
    pub fn max_concurrent_redeems(&self) -> usize {
        self.state.max_redeems_in_flight.load(Ordering::SeqCst)
    }

    async fn delay(ms: u64) {
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait]
impl InvitationStore for MockInvitationStore {
    async fn fetch(&self, invitation_id: &InvitationId) -> Result<InvitationRecord, StoreError> {
        self.state.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Self::delay(self.state.fetch_latency_ms.load(Ordering::SeqCst)).await;

        if let Some(error) = self.state.fetch_error.lock().clone() {
            return Err(error);
        }
        self.state
            .invitations
            .lock()
            .get(invitation_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(invitation_id.as_str()))
    }

    async fn redeem(&self, invitation_id: &InvitationId) -> Result<ClientRecord, StoreError> {
        self.state.redeem_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.state.redeems_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state
            .max_redeems_in_flight
            .fetch_max(running, Ordering::SeqCst);

        Self::delay(self.state.redeem_latency_ms.load(Ordering::SeqCst)).await;

        let scripted = self.state.redeem_results.lock().pop_front();
        let result = scripted.unwrap_or_else(|| {
            self.state
                .invitations
                .lock()
                .get(invitation_id)
                .map(sample_client)
                .ok_or_else(|| StoreError::not_found(invitation_id.as_str()))
        });
        self.state.redeems_in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_invitation;

    #[tokio::test]
    async fn test_scripted_then_default_redeem() {
        let invitation = sample_invitation("abc123", "Alex", "sam@x.com");
        let store = MockInvitationStore::new()
            .with_invitation(invitation.clone())
            .with_redeem_result(Err(StoreError::network("offline")));

        let first = store.redeem(&invitation.id).await;
        assert_eq!(first, Err(StoreError::network("offline")));
        let second = store.redeem(&invitation.id).await.unwrap();
        assert_eq!(second, sample_client(&invitation));
        assert_eq!(store.redeem_calls(), 2);
        assert_eq!(store.max_concurrent_redeems(), 1);
    }

    #[tokio::test]
    async fn test_missing_invitation() {
        let store = MockInvitationStore::new();
        let id = InvitationId::new("xyz");
        assert_eq!(store.fetch(&id).await, Err(StoreError::not_found("xyz")));
        assert_eq!(store.fetch_calls(), 1);
    }
}
